use std::io::{self, BufRead, Write};

use ldpclink::input::{hex_to_message, parse_bit_count, text_to_message};
use ldpclink_session::{InputMode, SessionController, SessionRequest};
use ldpclink_transport::Transport;

use crate::cmd::{open_device, session_config, MenuArgs};
use crate::exit::{io_error, CliResult, SUCCESS};
use crate::output::{render_pretty, render_status};

const MENU: &str = "\
LDPC Encoder Client Menu:
1 - Encode text message
2 - Encode hex message
3 - Encode hex message with manual bit length
4 - Check system status
5 - Show last encoding results
q - Quit
Enter your choice: ";

pub fn run(args: MenuArgs) -> CliResult<i32> {
    let config = session_config(&args.timing)?;
    let transport = open_device(&args.device)?;
    let mut controller = SessionController::with_config(transport, config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    drive(&mut controller, stdin.lock(), stdout.lock())
        .map_err(|err| io_error("menu I/O failed", err))?;
    Ok(SUCCESS)
}

/// Serve menu choices from `input` until it is exhausted or the user quits.
pub fn drive<T, R, W>(
    controller: &mut SessionController<T>,
    mut input: R,
    mut out: W,
) -> io::Result<()>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    loop {
        write!(out, "{MENU}")?;
        out.flush()?;
        let Some(choice) = read_line(&mut input)? else {
            writeln!(out)?;
            return Ok(());
        };

        match choice.as_str() {
            "1" => encode(controller, &mut input, &mut out, InputMode::Text)?,
            "2" => encode(controller, &mut input, &mut out, InputMode::Hex)?,
            "3" => encode(controller, &mut input, &mut out, InputMode::HexManualLength)?,
            "4" => {
                writeln!(out, "System Status:")?;
                write!(out, "{}", render_status(&controller.status()))?;
            }
            "5" => match controller.last_session() {
                Some(session) => {
                    writeln!(out, "Last encoding results:")?;
                    write!(out, "{}", render_pretty(session))?;
                }
                None => writeln!(out, "No encoding results available yet.")?,
            },
            "q" | "Q" => return Ok(()),
            "" => {}
            _ => writeln!(out, "Invalid choice!")?,
        }
        writeln!(out)?;
    }
}

fn encode<T, R, W>(
    controller: &mut SessionController<T>,
    input: &mut R,
    out: &mut W,
    mode: InputMode,
) -> io::Result<()>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    let mut calculation_bits = None;
    if mode == InputMode::HexManualLength {
        write!(out, "Enter message length in bits: ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(());
        };
        match parse_bit_count(&line) {
            Some(bits) => {
                writeln!(out, "Manual message length set to: {bits} bits")?;
                calculation_bits = Some(bits);
            }
            None => {
                writeln!(out, "Message length must not exceed {} bits", u16::MAX)?;
                return Ok(());
            }
        }
    }

    writeln!(out, "Enter your message:")?;
    if mode == InputMode::Text {
        writeln!(out, "(Type your text message and press Enter)")?;
    } else {
        writeln!(out, "(Enter hex bytes, e.g. 'AB CD EF 12', and press Enter)")?;
    }
    out.flush()?;

    let Some(line) = read_line(input)? else {
        return Ok(());
    };
    if line.is_empty() {
        writeln!(out, "No message entered!")?;
        return Ok(());
    }

    let message = match mode {
        InputMode::Text => text_to_message(&line),
        InputMode::Hex | InputMode::HexManualLength => hex_to_message(&line),
    };
    let message = match message {
        Ok(message) => message,
        Err(err) => {
            writeln!(out, "Invalid message: {err}")?;
            return Ok(());
        }
    };
    writeln!(
        out,
        "Message converted to {} bits ({} bytes)",
        message.bits(),
        message.byte_len()
    )?;

    let mut request = SessionRequest::new(message, mode);
    request.calculation_bits = calculation_bits;

    writeln!(out, "Starting LDPC encoding process...")?;
    out.flush()?;
    match controller.run_session(request) {
        Ok(session) => {
            writeln!(out, "Encoding completed successfully!")?;
            write!(out, "{}", render_pretty(&session))?;
        }
        Err(err) => writeln!(out, "Encoding failed: {err}")?,
    }
    Ok(())
}

/// Next line without surrounding whitespace, `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
