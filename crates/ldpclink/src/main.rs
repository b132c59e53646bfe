mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "ldpclink", version, about = "LDPC encoder device client")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "LDPCLINK_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encode_against_simulator() {
        let cli = Cli::try_parse_from([
            "ldpclink",
            "encode",
            "--simulate",
            "--sim-k",
            "16",
            "--text",
            "hello",
        ])
        .expect("encode args should parse");

        match cli.command {
            Command::Encode(args) => {
                assert!(args.device.simulate);
                assert_eq!(args.device.sim_k, 16);
                assert_eq!(args.text.as_deref(), Some("hello"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_text_and_hex_together() {
        let err = Cli::try_parse_from([
            "ldpclink",
            "encode",
            "--simulate",
            "--text",
            "a",
            "--hex",
            "61",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_port_with_simulator() {
        let err = Cli::try_parse_from([
            "ldpclink",
            "menu",
            "--simulate",
            "--port",
            "/dev/ttyUSB0",
        ])
        .expect_err("port and simulator are exclusive");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn requires_a_device() {
        let err = Cli::try_parse_from(["ldpclink", "encode", "--text", "a"])
            .expect_err("a device is required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
