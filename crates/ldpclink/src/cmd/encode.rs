use ldpclink::input::{hex_to_message, text_to_message};
use ldpclink_session::{InputMode, SessionController, SessionRequest};
use tracing::info;

use crate::cmd::{open_device, session_config, EncodeArgs};
use crate::exit::{session_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_session, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let request = build_request(&args)?;
    let config = session_config(&args.timing)?;
    let transport = open_device(&args.device)?;

    info!(
        bits = request.message.bits(),
        bytes = request.message.byte_len(),
        mode = ?request.mode,
        "message ready"
    );

    let mut controller = SessionController::with_config(transport, config);
    let session = controller
        .run_session(request)
        .map_err(|err| session_error("encoding failed", err))?;

    print_session(&session, format);
    Ok(SUCCESS)
}

fn build_request(args: &EncodeArgs) -> CliResult<SessionRequest> {
    let (message, mode) = match (&args.text, &args.hex) {
        (Some(text), _) => (text_to_message(text), InputMode::Text),
        (None, Some(hex)) if args.bits.is_some() => {
            (hex_to_message(hex), InputMode::HexManualLength)
        }
        (None, Some(hex)) => (hex_to_message(hex), InputMode::Hex),
        (None, None) => return Err(CliError::new(USAGE, "--text or --hex is required")),
    };
    let message = message.map_err(|err| session_error("invalid message", err))?;
    if message.is_empty() {
        return Err(CliError::new(USAGE, "no message entered"));
    }

    let mut request = SessionRequest::new(message, mode);
    request.calculation_bits = args.bits;
    Ok(request)
}
