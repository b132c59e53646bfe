use std::time::Duration;

use clap::{Args, Subcommand};
use ldpclink_session::SessionConfig;
use ldpclink_transport::{Pacing, SerialConfig, SerialTransport, Transport, DEFAULT_BAUD};
use ldpclink_wire::{SessionParameters, SimulatedEncoder, SimulatorConfig};

use crate::exit::{transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod encode;
pub mod menu;
pub mod ports;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one message and print the result.
    Encode(EncodeArgs),
    /// Interactive menu over one device connection.
    Menu(MenuArgs),
    /// List serial ports.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Menu(args) => menu::run(args),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Serial device the encoder is attached to.
    #[arg(
        long,
        value_name = "PATH",
        required_unless_present = "simulate",
        conflicts_with = "simulate"
    )]
    pub port: Option<String>,
    /// Serial symbol rate.
    #[arg(long, default_value_t = DEFAULT_BAUD)]
    pub baud: u32,
    /// Use an in-process simulated encoder instead of hardware.
    #[arg(long)]
    pub simulate: bool,
    /// Information bits per block announced by the simulated encoder.
    #[arg(long, value_name = "K", default_value_t = 64)]
    pub sim_k: u16,
    /// Codeword bits per block announced by the simulated encoder.
    #[arg(long, value_name = "N", default_value_t = 128)]
    pub sim_n: u16,
    /// Simulated encoder never sends its sync tag.
    #[arg(long)]
    pub sim_silent: bool,
}

#[derive(Args, Debug)]
pub struct TimingArgs {
    /// How long to wait for the sync tag (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub sync_timeout: String,
    /// How long to wait for K and N.
    #[arg(long, default_value = "3s")]
    pub param_timeout: String,
    /// How long to wait for each block's encoded bytes.
    #[arg(long, default_value = "3s")]
    pub block_timeout: String,
    /// Delay after every byte written to the device; 0 disables pacing.
    #[arg(long, default_value = "10ms")]
    pub pacing: String,
    /// Do not re-test a mismatching byte as the start of the sync tag.
    #[arg(long)]
    pub legacy_sync: bool,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    #[command(flatten)]
    pub timing: TimingArgs,
    /// Text message; its bytes are sent as is.
    #[arg(long, conflicts_with = "hex", required_unless_present = "hex")]
    pub text: Option<String>,
    /// Hex message, e.g. "AB CD EF 12".
    #[arg(long)]
    pub hex: Option<String>,
    /// Bit count to announce and plan blocks from instead of the message's.
    #[arg(long, value_name = "N", requires = "hex")]
    pub bits: Option<u16>,
}

#[derive(Args, Debug)]
pub struct MenuArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    #[command(flatten)]
    pub timing: TimingArgs,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open the hardware port or build the simulator described by `args`.
pub fn open_device(args: &DeviceArgs) -> CliResult<Box<dyn Transport>> {
    if args.simulate {
        let sim = SimulatedEncoder::new(SimulatorConfig {
            params: SessionParameters::new(args.sim_k, args.sim_n),
            respond_to_sync: !args.sim_silent,
            ..SimulatorConfig::default()
        });
        return Ok(Box::new(sim));
    }

    let path = args
        .port
        .as_deref()
        .ok_or_else(|| CliError::new(USAGE, "--port or --simulate is required"))?;
    let port = SerialTransport::open(&SerialConfig::new(path, args.baud))
        .map_err(|err| transport_error("open failed", err))?;
    Ok(Box::new(port))
}

pub fn session_config(args: &TimingArgs) -> CliResult<SessionConfig> {
    Ok(SessionConfig {
        sync_timeout: parse_duration(&args.sync_timeout)?,
        parameter_timeout: parse_duration(&args.param_timeout)?,
        block_timeout: parse_duration(&args.block_timeout)?,
        pacing: Pacing::new(parse_delay(&args.pacing)?),
        sync_rescan: !args.legacy_sync,
        ..SessionConfig::default()
    })
}

/// Positive duration such as `5s`, `150ms` or `3` (seconds).
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let value = parse_delay(input)?;
    if value.is_zero() {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }
    Ok(value)
}

/// Like [`parse_duration`] but zero is allowed.
pub fn parse_delay(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> TimingArgs {
        TimingArgs {
            sync_timeout: "5s".to_string(),
            param_timeout: "3s".to_string(),
            block_timeout: "3s".to_string(),
            pacing: "10ms".to_string(),
            legacy_sync: false,
        }
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn pacing_may_be_zero() {
        assert_eq!(parse_delay("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_delay("0ms").unwrap(), Duration::ZERO);
    }

    #[test]
    fn default_timing_matches_library_defaults() {
        let config = session_config(&timing()).unwrap();
        let defaults = SessionConfig::default();
        assert_eq!(config.sync_timeout, defaults.sync_timeout);
        assert_eq!(config.parameter_timeout, defaults.parameter_timeout);
        assert_eq!(config.block_timeout, defaults.block_timeout);
        assert_eq!(config.pacing, defaults.pacing);
        assert!(config.sync_rescan);
    }

    #[test]
    fn legacy_sync_disables_rescan() {
        let args = TimingArgs {
            legacy_sync: true,
            ..timing()
        };
        assert!(!session_config(&args).unwrap().sync_rescan);
    }
}
