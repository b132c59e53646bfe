use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ldpclink::input::{ascii_render, hex_dump, hex_string};
use ldpclink_session::{InputMode, Session, SessionStatus};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct SessionOutput {
    mode: InputMode,
    k: u16,
    n: u16,
    message_bits: u16,
    calculation_bits: u16,
    blocks: usize,
    message: String,
    encoded_bytes: usize,
    encoded: String,
    elapsed_ms: u128,
}

impl From<&Session> for SessionOutput {
    fn from(session: &Session) -> Self {
        Self {
            mode: session.mode,
            k: session.params.k,
            n: session.params.n,
            message_bits: session.message.bits(),
            calculation_bits: session.calculation_bits,
            blocks: session.blocks,
            message: hex_string(session.message.as_bytes()),
            encoded_bytes: session.encoded.len(),
            encoded: hex_string(&session.encoded),
            elapsed_ms: session.elapsed.as_millis(),
        }
    }
}

pub fn print_session(session: &Session, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&SessionOutput::from(session))
                    .unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec!["K".to_string(), session.params.k.to_string()])
                .add_row(vec!["N".to_string(), session.params.n.to_string()])
                .add_row(vec![
                    "MESSAGE BITS".to_string(),
                    session.message.bits().to_string(),
                ])
                .add_row(vec![
                    "CALCULATION BITS".to_string(),
                    session.calculation_bits.to_string(),
                ])
                .add_row(vec!["BLOCKS".to_string(), session.blocks.to_string()])
                .add_row(vec!["MESSAGE".to_string(), render_message(session)])
                .add_row(vec!["ENCODED".to_string(), hex_dump(&session.encoded)]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            print!("{}", render_pretty(session));
        }
        OutputFormat::Raw => {
            print_raw(&session.encoded);
        }
    }
}

/// Human-readable report of a completed session.
pub fn render_pretty(session: &Session) -> String {
    format!(
        "Original message ({} bits, {} bits used for calculation):\n{}\n\
         Encoded data ({} bits per block, {} blocks):\n{}\n",
        session.message.bits(),
        session.calculation_bits,
        render_message(session),
        session.params.n,
        session.blocks,
        hex_dump(&session.encoded),
    )
}

/// Text input reads back as ASCII, hex input as a hex dump.
fn render_message(session: &Session) -> String {
    if session.mode.displays_as_hex() {
        hex_dump(session.message.as_bytes())
    } else {
        ascii_render(session.message.as_bytes())
    }
}

/// Human-readable controller status.
pub fn render_status(status: &SessionStatus) -> String {
    let mut out = format!("Current state: {}\n", status.state);
    match status.last_parameters {
        Some(params) => out.push_str(&format!("Last K: {}, Last N: {}\n", params.k, params.n)),
        None => out.push_str("Last K: -, Last N: -\n"),
    }
    match status.last_message_bits {
        Some(bits) => out.push_str(&format!("Last message bits: {bits}\n")),
        None => out.push_str("Last message bits: -\n"),
    }
    out.push_str(&format!("Sessions run: {}\n", status.sessions_run));
    if let Some(failure) = &status.last_failure {
        out.push_str(&format!(
            "Last failure ({}): {}\n",
            failure.phase, failure.message
        ));
    }
    out
}

#[derive(Serialize)]
struct PortOutput<'a> {
    path: &'a str,
    kind: &'a str,
}

pub fn print_ports(ports: &[(String, &'static str)], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<PortOutput<'_>> = ports
                .iter()
                .map(|(path, kind)| PortOutput { path, kind })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "KIND"]);
            for (path, kind) in ports {
                table.add_row(vec![path.clone(), kind.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (path, kind) in ports {
                println!("{path} ({kind})");
            }
        }
        OutputFormat::Raw => {
            for (path, _) in ports {
                println!("{path}");
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}
