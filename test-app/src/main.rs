// rtulink test application -- CLI tool for exercising an RTU device over a
// serial port, or against the built-in simulated device.
//
// Usage:
//   rtulink-test-app --port /dev/ttyACM0 write 0 0x1234
//   rtulink-test-app --port /dev/ttyACM0 read 0 --count 4
//   rtulink-test-app --port /dev/ttyACM0 verify
//   rtulink-test-app --mock stress --count 500
//   rtulink-test-app crc 01 03 12 34 00 04

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use tracing_subscriber::EnvFilter;

use rtulink_core::RegisterCount;
use rtulink_rtu::crc::crc16;
use rtulink_rtu::{RtuClient, RtuClientBuilder, SimulatedDevice};
use rtulink_transport::DEFAULT_BAUD_RATE;

/// Values the `verify` command writes to registers 0..=3.
const VERIFY_PATTERN: [u16; 4] = [0x1234, 0x5678, 0x1020, 0x3040];

/// rtulink test application -- reads and writes holding registers.
#[derive(Parser)]
#[command(name = "rtulink-test-app", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyACM0, COM3). Required unless --mock is used.
    #[arg(long)]
    port: Option<String>,

    /// Baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Time allowed for each response, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Wait this long after opening the port for the device to boot, in
    /// milliseconds.
    #[arg(long, default_value_t = 2000)]
    settle_ms: u64,

    /// Talk to an in-process simulated device instead of a serial port.
    #[arg(long)]
    mock: bool,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write one holding register.
    Write {
        /// Register address (decimal or 0x hex).
        #[arg(value_parser = parse_u16)]
        address: u16,
        /// Value to write (decimal or 0x hex).
        #[arg(value_parser = parse_u16)]
        value: u16,
    },

    /// Read a block of holding registers.
    Read {
        /// First register address (decimal or 0x hex).
        #[arg(value_parser = parse_u16)]
        address: u16,
        /// Number of registers, 1 to 127.
        #[arg(long, default_value_t = 1)]
        count: u16,
    },

    /// Write a known pattern to registers 0..=3 and read it back.
    Verify,

    /// Random write/read-back cycles.
    Stress {
        /// Number of cycles.
        #[arg(long, default_value_t = 100)]
        count: u32,
        /// Highest register address to use.
        #[arg(long, default_value_t = 3, value_parser = parse_u16)]
        max_address: u16,
    },

    /// Print the checksum of the given bytes. Needs no device.
    Crc {
        /// Bytes in hex, e.g. `01 03 12 34 00 04`.
        #[arg(required = true, value_parser = parse_hex_u8)]
        bytes: Vec<u8>,
    },
}

/// Parse a decimal or `0x`-prefixed hex string into a u16.
fn parse_u16(s: &str) -> std::result::Result<u16, String> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).map_err(|e| format!("invalid hex value: {e}")),
        None => s.parse().map_err(|e| format!("invalid value: {e}")),
    }
}

/// Parse a hex string like "0xBF" or "bf" into a u8.
fn parse_hex_u8(s: &str) -> std::result::Result<u8, String> {
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(s, 16).map_err(|e| format!("invalid hex byte: {e}"))
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // `crc` does not require a device.
    if let Command::Crc { bytes } = &cli.command {
        return cmd_crc(bytes);
    }

    let mut client = create_client(&cli).await?;

    let result = match &cli.command {
        Command::Write { address, value } => cmd_write(&mut client, *address, *value).await,
        Command::Read { address, count } => cmd_read(&mut client, *address, *count).await,
        Command::Verify => cmd_verify(&mut client).await,
        Command::Stress { count, max_address } => {
            cmd_stress(&mut client, *count, *max_address).await
        }
        Command::Crc { .. } => unreachable!("crc handled above"),
    };

    client.close().await.ok();
    result
}

async fn create_client(cli: &Cli) -> Result<RtuClient> {
    let builder = RtuClientBuilder::new()
        .baud_rate(cli.baud)
        .response_timeout(Duration::from_millis(cli.timeout_ms));

    if cli.mock {
        if cli.port.is_some() {
            bail!("--port and --mock cannot be used together");
        }
        let client = builder
            .build_with_transport(Box::new(SimulatedDevice::new()))
            .context("failed to build client with simulated device")?;
        println!("Connected (simulated device)");
        return Ok(client);
    }

    let port = cli
        .port
        .as_deref()
        .context("--port is required when not using --mock")?;

    tracing::debug!(port, baud = cli.baud, settle_ms = cli.settle_ms, "opening device");
    println!("Opening {port} at {} baud", cli.baud);
    if cli.settle_ms > 0 {
        println!("Waiting {} ms for device to boot", cli.settle_ms);
    }

    builder
        .serial_port(port)
        .settle_delay(Duration::from_millis(cli.settle_ms))
        .build()
        .await
        .with_context(|| format!("failed to open serial port {port} at {} baud", cli.baud))
}

fn cmd_crc(bytes: &[u8]) -> Result<()> {
    let crc = crc16(bytes);
    println!("CRC-16: 0x{crc:04X}");
    println!("Trailer: {:02X} {:02X}", crc & 0xFF, crc >> 8);
    Ok(())
}

async fn cmd_write(client: &mut RtuClient, address: u16, value: u16) -> Result<()> {
    let ack = client
        .write_register(address, value)
        .await
        .with_context(|| format!("write of 0x{value:04X} to register {address} failed"))?;
    println!("Register {} set to 0x{:04X}", ack.address, ack.value);
    Ok(())
}

async fn cmd_read(client: &mut RtuClient, address: u16, count: u16) -> Result<()> {
    let count = RegisterCount::new(count).context("invalid --count")?;
    let values = client
        .read_holding_registers(address, count.get())
        .await
        .with_context(|| format!("read of {count} registers at {address} failed"))?;

    for (offset, value) in values.iter().enumerate() {
        let reg = address as usize + offset;
        println!("  [{reg:5}] 0x{value:04X}  {value:6}");
    }
    Ok(())
}

async fn cmd_verify(client: &mut RtuClient) -> Result<()> {
    for (address, &value) in VERIFY_PATTERN.iter().enumerate() {
        cmd_write(client, address as u16, value).await?;
    }

    let readback = client
        .read_holding_registers(0, VERIFY_PATTERN.len() as u16)
        .await
        .context("read-back failed")?;

    if readback == VERIFY_PATTERN {
        println!("Data matches");
        Ok(())
    } else {
        println!("Expected: {}", format_registers(&VERIFY_PATTERN));
        println!("Received: {}", format_registers(&readback));
        bail!("read-back does not match written values");
    }
}

async fn cmd_stress(client: &mut RtuClient, count: u32, max_address: u16) -> Result<()> {
    println!("Stress test: {count} cycles on registers 0..={max_address}");

    let mut rng = rand::thread_rng();
    let mut success = 0u32;
    let mut failures = 0u32;
    let start = Instant::now();

    for i in 1..=count {
        let address = rng.gen_range(0..=max_address);
        let value: u16 = rng.gen();

        if let Err(e) = client.write_register(address, value).await {
            eprintln!("[{i}/{count}] write failed: {e}");
            failures += 1;
            continue;
        }

        match client.read_holding_registers(address, 1).await {
            Ok(readback) if readback == [value] => success += 1,
            Ok(readback) => {
                eprintln!(
                    "[{i}/{count}] mismatch at {address}: wrote 0x{value:04X}, read {}",
                    format_registers(&readback)
                );
                failures += 1;
            }
            Err(e) => {
                eprintln!("[{i}/{count}] read failed: {e}");
                failures += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    let rate = if elapsed.as_secs_f64() > 0.0 {
        count as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    println!();
    println!("Results:");
    println!("  Total cycles:   {count}");
    println!("  Successes:      {success}");
    println!("  Failures:       {failures}");
    println!("  Elapsed:        {:.3} s", elapsed.as_secs_f64());
    println!("  Rate:           {rate:.1} cycles/sec");

    if failures > 0 {
        bail!("{failures} of {count} cycles failed");
    }
    Ok(())
}

fn format_registers(values: &[u16]) -> String {
    values
        .iter()
        .map(|v| format!("0x{v:04X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
