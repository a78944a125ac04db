//! In-process simulated device.
//!
//! [`SimulatedDevice`] is a [`Transport`] whose far end is a [`Responder`].
//! Every `send()` is handed to the responder as one request frame and the
//! reply is queued for `receive()`. It lets the client run end to end with
//! no serial hardware, e.g. for the CLI's `--mock` mode.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use rtulink_core::error::{Error, Result};
use rtulink_core::transport::Transport;

use crate::responder::{RegisterBank, RegisterMap, Responder};

/// A [`Transport`] answered by an in-memory [`Responder`].
pub struct SimulatedDevice<B = RegisterMap> {
    responder: Responder<B>,
    pending: VecDeque<u8>,
    connected: bool,
}

impl SimulatedDevice<RegisterMap> {
    /// A device with an empty [`RegisterMap`].
    pub fn new() -> Self {
        Self::with_responder(Responder::new(RegisterMap::new()))
    }
}

impl Default for SimulatedDevice<RegisterMap> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: RegisterBank> SimulatedDevice<B> {
    /// A device answered by `responder`.
    pub fn with_responder(responder: Responder<B>) -> Self {
        SimulatedDevice {
            responder,
            pending: VecDeque::new(),
            connected: true,
        }
    }

    /// The device's responder, e.g. to inspect its register bank.
    pub fn responder(&self) -> &Responder<B> {
        &self.responder
    }
}

#[async_trait]
impl<B: RegisterBank + Send + Sync> Transport for SimulatedDevice<B> {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        tracing::trace!(data = ?data, "simulated device received request");
        self.pending.clear();
        if let Some(reply) = self.responder.handle(data) {
            self.pending.extend(reply);
        }
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if self.pending.is_empty() {
            return Err(Error::Timeout);
        }

        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
