use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use taxelview::config::Config;
use taxelview::serial;
use taxelview::viewer::{self, ViewerOptions};

/// taxelview: live terminal heatmap for resistive taxel arrays
#[derive(Parser)]
#[command(name = "taxelview")]
#[command(version, about = "Live terminal heatmap for resistive taxel arrays")]
#[command(long_about = "Reads a taxel scanner's CFG/F line protocol from a serial \
    port and renders each frame as a truecolor heatmap in the terminal. \
    Running with no arguments uses the scanner's standard port and baud rate.")]
#[command(after_help = "EXAMPLES:
    # View the scanner on the default port (/dev/ttyACM0 @ 921600)
    taxelview

    # A different port, and a 12-bit sensor
    taxelview --port /dev/ttyUSB0 --ceiling 4095

    # List available serial ports
    taxelview list-ports

The wire format is plain text: one `CFG,<rows>,<cols>` line, then
`F,<timestamp_us>,<v0>,...` lines with rows*cols samples each.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Serial port device path
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Display ceiling: sample value rendered at full heat
    #[arg(long)]
    ceiling: Option<i32>,

    /// Path to config file (default: ~/.config/taxelview/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available serial ports
    ListPorts,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(Commands::ListPorts) = cli.command {
        let ports = serial::list_ports()?;
        serial::print_ports(&ports);
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    let opts = resolve_options(&cli, &config);
    viewer::run(&opts)?;
    Ok(())
}

/// Merge CLI flags over config file values over built-in defaults.
fn resolve_options(cli: &Cli, config: &Config) -> ViewerOptions {
    let defaults = ViewerOptions::default();
    ViewerOptions {
        port: cli
            .port
            .clone()
            .or_else(|| config.serial.port.clone())
            .unwrap_or(defaults.port),
        baud: cli.baud.or(config.serial.baud).unwrap_or(defaults.baud),
        timeout: config
            .serial
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.timeout),
        ceiling: cli
            .ceiling
            .or(config.display.ceiling)
            .unwrap_or(defaults.ceiling),
    }
}
