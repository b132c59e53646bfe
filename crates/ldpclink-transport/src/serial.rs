use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Symbol rate the encoder device's UART runs at.
pub const DEFAULT_BAUD: u32 = 115_200;

/// Serial link settings. Framing is always 8N1 without flow control.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub path: String,
    /// Symbol rate.
    pub baud: u32,
    /// Driver-level timeout for a single read or write call.
    pub io_timeout: Duration,
}

impl SerialConfig {
    pub fn new(path: impl Into<String>, baud: u32) -> Self {
        Self {
            path: path.into(),
            baud,
            ..Self::default()
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            baud: DEFAULT_BAUD,
            io_timeout: Duration::from_millis(10),
        }
    }
}

/// Hardware serial port transport.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialTransport {
    /// Open the port described by `config` and discard anything already queued.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(&config.path, config.baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.io_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                path: config.path.clone(),
                source,
            })?;

        port.clear(ClearBuffer::All)
            .map_err(|source| TransportError::Open {
                path: config.path.clone(),
                source,
            })?;

        info!(path = %config.path, baud = config.baud, "serial port opened");
        Ok(Self {
            port,
            path: config.path.clone(),
        })
    }

    /// Device path this transport was opened on.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Transport for SerialTransport {
    fn bytes_available(&mut self) -> Result<usize> {
        let queued = self.port.bytes_to_read().map_err(std::io::Error::from)?;
        Ok(queued as usize)
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.bytes_available()? == 0 {
            return Ok(None);
        }

        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(0) => Err(TransportError::Closed),
            Ok(_) => Ok(Some(byte[0])),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(TransportError::Io(err)),
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        loop {
            match self.port.write(&[byte]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(_) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        loop {
            match self.port.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("path", &self.path)
            .field("baud", &self.port.baud_rate().ok())
            .finish()
    }
}

/// Serial devices currently visible to the host, as `(path, kind)` pairs.
pub fn available_ports() -> Result<Vec<(String, &'static str)>> {
    let ports = serialport::available_ports().map_err(std::io::Error::from)?;
    debug!(count = ports.len(), "enumerated serial ports");
    Ok(ports
        .into_iter()
        .map(|info| {
            let kind = match info.port_type {
                serialport::SerialPortType::UsbPort(_) => "usb",
                serialport::SerialPortType::PciPort => "pci",
                serialport::SerialPortType::BluetoothPort => "bluetooth",
                serialport::SerialPortType::Unknown => "unknown",
            };
            (info.port_name, kind)
        })
        .collect())
}
