use std::fmt;
use std::io;

use ldpclink_session::SessionError;
use ldpclink_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        TransportError::Open { ref source, .. } => {
            let code = match source.kind {
                serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => PERMISSION_DENIED,
                serialport::ErrorKind::InvalidInput => USAGE,
                _ => TRANSPORT_ERROR,
            };
            CliError::new(code, format!("{context}: {err}"))
        }
        TransportError::Timeout { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        TransportError::Closed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::LengthSendFailure(source) | SessionError::Transport { source, .. } => {
            transport_error(context, source)
        }
        SessionError::SyncTimeout { .. }
        | SessionError::ParameterTimeout { .. }
        | SessionError::BlockTimeout { .. } => {
            CliError::new(TIMEOUT, format!("{context}: {err}"))
        }
        SessionError::InvalidParameters(_) | SessionError::EncodedTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        SessionError::MessageTooLarge { .. } | SessionError::BitCountExceedsData { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ldpclink_session::SessionPhase;
    use ldpclink_wire::WireError;

    use super::*;

    #[test]
    fn timeouts_map_to_timeout_code() {
        let err = session_error(
            "encode",
            SessionError::BlockTimeout {
                block: 0,
                blocks: 2,
                received: 1,
                expected: 4,
            },
        );
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("encode: "));

        let err = session_error(
            "encode",
            SessionError::SyncTimeout {
                waited: Duration::from_secs(5),
            },
        );
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn device_faults_map_to_transport_and_data_codes() {
        let err = session_error(
            "encode",
            SessionError::transport(SessionPhase::Transfer, TransportError::Closed),
        );
        assert_eq!(err.code, FAILURE);

        let err = session_error(
            "encode",
            SessionError::InvalidParameters(WireError::InvalidParameters { k: 0, n: 8 }),
        );
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn oversized_input_is_a_usage_error() {
        let err = session_error(
            "encode",
            SessionError::MessageTooLarge {
                size: 2000,
                max: 1024,
            },
        );
        assert_eq!(err.code, USAGE);
    }
}
