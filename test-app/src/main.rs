// mks937b-cli -- command-line tool for exercising an MKS 937B vacuum gauge
// controller over a serial port or a TCP serial device server.
//
// Usage:
//   mks937b-cli --port /dev/ttyUSB0 pressures
//   mks937b-cli --tcp 192.168.1.50:4001 --address 2 pressure 3
//   mks937b-cli --port /dev/ttyUSB0 unit set MBAR
//   mks937b-cli --port /dev/ttyUSB0 target set 1 1.0e-3
//   mks937b-cli --port /dev/ttyUSB0 monitor --interval-ms 500 --duration 60
//   mks937b-cli --port /dev/ttyUSB0 raw query PRZ
//
// Set RUST_LOG=mks937b=trace to see every frame on the wire.

use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mks937b::{
    BaudRate, ControlMode, GasType, Mks937b, Mks937bBuilder, Parity, PressureUnit, Reading,
};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// mks937b-cli -- talks to an MKS 937B controller from the command line.
#[derive(Parser)]
#[command(name = "mks937b-cli", version, about)]
struct Cli {
    /// Controller address (1-254).
    #[arg(long, default_value_t = 1)]
    address: u32,

    /// Serial port path (e.g. /dev/ttyUSB0, COM3).
    #[arg(long, conflicts_with = "tcp")]
    port: Option<String>,

    /// Serial baud rate; must match the controller's setting.
    #[arg(long, default_value = "9600")]
    baud: BaudRate,

    /// Serial parity; must match the controller's setting.
    #[arg(long, default_value = "NONE")]
    parity: Parity,

    /// TCP serial device server as host:port.
    #[arg(long)]
    tcp: Option<String>,

    /// Reply timeout in milliseconds.
    #[arg(long, default_value_t = 500)]
    timeout_ms: u64,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read the pressure on one channel (1-6).
    Pressure { channel: u8 },

    /// Read the pressures on all six channels.
    Pressures,

    /// Read a combination pressure (1-2).
    Combination { channel: u8 },

    /// Poll all channels and print each sample.
    Monitor {
        /// Time between polls in milliseconds.
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,

        /// Duration in seconds (0 = run until Ctrl-C).
        #[arg(long, default_value_t = 0)]
        duration: u64,
    },

    /// Stress test: rapid-fire all-channel reads.
    Stress {
        /// Number of reads.
        #[arg(long, default_value_t = 100)]
        count: u32,
    },

    /// Controller address.
    Address {
        #[command(subcommand)]
        action: ValueAction,
    },

    /// Serial baud rate. The link must be reopened after a change.
    Baud {
        #[command(subcommand)]
        action: ValueAction,
    },

    /// Serial parity. The link must be reopened after a change.
    Parity {
        #[command(subcommand)]
        action: ValueAction,
    },

    /// Pressure unit (Torr, MBAR, PASCAL, Micron).
    Unit {
        #[command(subcommand)]
        action: ValueAction,
    },

    /// Control set point of a channel (1, 3, 5).
    Target {
        #[command(subcommand)]
        action: ChannelAction,
    },

    /// Control set point hysteresis of a channel (1, 3, 5).
    Hysteresis {
        #[command(subcommand)]
        action: ChannelAction,
    },

    /// Protection set point of a channel (1, 3, 5); 0 disables.
    Protection {
        #[command(subcommand)]
        action: ChannelAction,
    },

    /// Control mode of a channel (AUTO, SAFE, OFF).
    ControlMode {
        #[command(subcommand)]
        action: ChannelAction,
    },

    /// Calibration gas of a channel (NITROGEN, ARGON, HELIUM).
    Gas {
        #[command(subcommand)]
        action: ChannelAction,
    },

    /// Sensor power of a channel (1, 3, 5).
    Power {
        #[command(subcommand)]
        action: SwitchAction,
    },

    /// Hot cathode degas of a channel (1, 3, 5).
    Degas {
        #[command(subcommand)]
        action: SwitchAction,
    },

    /// Send an arbitrary mnemonic.
    Raw {
        #[command(subcommand)]
        action: RawAction,
    },
}

#[derive(Subcommand)]
enum ValueAction {
    /// Read the current value.
    Get,
    /// Write a new value.
    Set { value: String },
}

#[derive(Subcommand)]
enum ChannelAction {
    /// Read the current value.
    Get { channel: u8 },
    /// Write a new value.
    Set { channel: u8, value: String },
}

#[derive(Subcommand)]
enum SwitchAction {
    /// Read the current state.
    Get { channel: u8 },
    /// Switch on.
    On { channel: u8 },
    /// Switch off.
    Off { channel: u8 },
}

#[derive(Subcommand)]
enum RawAction {
    /// Send a query and print the reply value.
    Query { mnemonic: String },
    /// Send a set and check the echoed parameter.
    Set { mnemonic: String, parameter: String },
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn connect(cli: &Cli) -> Result<Mks937b> {
    let mut builder = Mks937bBuilder::new(cli.address)
        .read_timeout(Duration::from_millis(cli.timeout_ms))
        .baud_rate(cli.baud)
        .parity(cli.parity);

    let link = match (&cli.port, &cli.tcp) {
        (Some(port), None) => {
            builder = builder.serial_port(port);
            port.clone()
        }
        (None, Some(addr)) => {
            builder = builder.tcp(addr);
            addr.clone()
        }
        _ => bail!("exactly one of --port or --tcp is required"),
    };

    let gauge = builder
        .build()
        .await
        .with_context(|| format!("failed to connect to controller {} on {link}", cli.address))?;
    debug!(address = cli.address, %link, "connected");
    Ok(gauge)
}

fn parse_pressure(value: &str) -> Result<f64> {
    value
        .parse()
        .with_context(|| format!("{value:?} is not a number"))
}

fn print_readings(readings: &[Reading]) {
    for (i, reading) in readings.iter().enumerate() {
        println!("  PR{}: {reading}", i + 1);
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_monitor(gauge: &Mks937b, interval_ms: u64, duration_secs: u64) -> Result<()> {
    let deadline = (duration_secs > 0).then(|| Instant::now() + Duration::from_secs(duration_secs));
    let mut interval = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    let start = Instant::now();

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted.");
                break;
            }
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            println!("Monitor duration elapsed.");
            break;
        }

        let elapsed = start.elapsed().as_secs_f64();
        match gauge.get_pressures().await {
            Ok(readings) => {
                let line = readings
                    .iter()
                    .map(|r| match r.pressure() {
                        Some(p) => format!("{p:.2E}"),
                        None => format!("{:?}", r.status),
                    })
                    .collect::<Vec<_>>()
                    .join("  ");
                println!("[{elapsed:8.1}s] {line}");
            }
            Err(e) => eprintln!("[{elapsed:8.1}s] read failed: {e}"),
        }
    }

    Ok(())
}

async fn cmd_stress(gauge: &Mks937b, count: u32) -> Result<()> {
    println!("Stress test: {count} all-channel reads");

    let mut success = 0u32;
    let mut failures = 0u32;
    let start = Instant::now();

    for i in 1..=count {
        match gauge.get_pressures().await {
            Ok(_) => success += 1,
            Err(e) => {
                eprintln!("[{i}/{count}] get_pressures failed: {e}");
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
    println!("  Total reads:    {count}");
    println!("  Successes:      {success}");
    println!("  Failures:       {failures}");
    println!("  Elapsed:        {:.3} s", elapsed.as_secs_f64());
    println!("  Rate:           {rate:.1} reads/sec");

    if failures > 0 {
        bail!("{failures} out of {count} reads failed");
    }
    Ok(())
}

async fn run(gauge: &Mks937b, command: &Command) -> Result<()> {
    match command {
        Command::Pressure { channel } => {
            let reading = gauge.get_pressure(*channel).await?;
            println!("PR{channel}: {reading}");
        }
        Command::Pressures => print_readings(&gauge.get_pressures().await?),
        Command::Combination { channel } => {
            let reading = gauge.get_pressure_combination(*channel).await?;
            println!("PC{channel}: {reading}");
        }
        Command::Monitor {
            interval_ms,
            duration,
        } => cmd_monitor(gauge, *interval_ms, *duration).await?,
        Command::Stress { count } => cmd_stress(gauge, *count).await?,
        Command::Address { action } => match action {
            ValueAction::Get => println!("Address: {:03}", gauge.get_address().await?),
            ValueAction::Set { value } => {
                let value: u32 = value.parse().context("address must be an integer")?;
                gauge.set_address(value).await?;
                println!("Address set to {value:03}; use --address {value} from now on.");
            }
        },
        Command::Baud { action } => match action {
            ValueAction::Get => println!("Baud rate: {}", gauge.get_baud_rate().await?),
            ValueAction::Set { value } => {
                let value: BaudRate = value.parse()?;
                gauge.set_baud_rate(value).await?;
                println!("Baud rate set to {value}.");
            }
        },
        Command::Parity { action } => match action {
            ValueAction::Get => println!("Parity: {}", gauge.get_parity().await?),
            ValueAction::Set { value } => {
                let value: Parity = value.parse()?;
                gauge.set_parity(value).await?;
                println!("Parity set to {value}.");
            }
        },
        Command::Unit { action } => match action {
            ValueAction::Get => println!("Unit: {}", gauge.get_pressure_unit().await?),
            ValueAction::Set { value } => {
                let value: PressureUnit = value.parse()?;
                gauge.set_pressure_unit(value).await?;
                println!("Unit set to {value}.");
            }
        },
        Command::Target { action } => match action {
            ChannelAction::Get { channel } => {
                println!("CSP{channel}: {:.2E}", gauge.get_target(*channel).await?)
            }
            ChannelAction::Set { channel, value } => {
                let value = parse_pressure(value)?;
                gauge.set_target(*channel, value).await?;
                println!("CSP{channel} set to {value:.2E}.");
            }
        },
        Command::Hysteresis { action } => match action {
            ChannelAction::Get { channel } => println!(
                "CHP{channel}: {:.2E}",
                gauge.get_hysteresis_target(*channel).await?
            ),
            ChannelAction::Set { channel, value } => {
                let value = parse_pressure(value)?;
                gauge.set_hysteresis_target(*channel, value).await?;
                println!("CHP{channel} set to {value:.2E}.");
            }
        },
        Command::Protection { action } => match action {
            ChannelAction::Get { channel } => println!(
                "PRO{channel}: {:.2E}",
                gauge.get_protection_target(*channel).await?
            ),
            ChannelAction::Set { channel, value } => {
                let value = parse_pressure(value)?;
                gauge.set_protection_target(*channel, value).await?;
                println!("PRO{channel} set to {value:.2E}.");
            }
        },
        Command::ControlMode { action } => match action {
            ChannelAction::Get { channel } => {
                println!("CTL{channel}: {}", gauge.get_control_mode(*channel).await?)
            }
            ChannelAction::Set { channel, value } => {
                let value: ControlMode = value.parse()?;
                gauge.set_control_mode(*channel, value).await?;
                println!("CTL{channel} set to {value}.");
            }
        },
        Command::Gas { action } => match action {
            ChannelAction::Get { channel } => {
                println!("GT{channel}: {}", gauge.get_gas_type(*channel).await?)
            }
            ChannelAction::Set { channel, value } => {
                let value: GasType = value.parse()?;
                gauge.set_gas_type(*channel, value).await?;
                println!("GT{channel} set to {value}.");
            }
        },
        Command::Power { action } => match action {
            SwitchAction::Get { channel } => {
                let on = gauge.get_power_status(*channel).await?;
                println!("CP{channel}: {}", if on { "ON" } else { "OFF" });
            }
            SwitchAction::On { channel } => gauge.set_power_status(*channel, true).await?,
            SwitchAction::Off { channel } => gauge.set_power_status(*channel, false).await?,
        },
        Command::Degas { action } => match action {
            SwitchAction::Get { channel } => {
                let on = gauge.get_degas_status(*channel).await?;
                println!("DG{channel}: {}", if on { "ON" } else { "OFF" });
            }
            SwitchAction::On { channel } => gauge.set_degas_status(*channel, true).await?,
            SwitchAction::Off { channel } => gauge.set_degas_status(*channel, false).await?,
        },
        Command::Raw { action } => match action {
            RawAction::Query { mnemonic } => println!("{}", gauge.query(mnemonic).await?),
            RawAction::Set {
                mnemonic,
                parameter,
            } => {
                gauge.set(mnemonic, parameter).await?;
                println!("{mnemonic} set to {parameter}.");
            }
        },
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let gauge = connect(&cli).await?;
    let result = run(&gauge, &cli.command).await;
    gauge.disconnect().await.ok();
    result
}
