//! Serial port handling: open, enumerate, and split the byte stream into lines.

use std::io::Read;
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};

/// Default device node for the scanner (CDC-ACM on Linux).
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";
/// Default line rate; the scanner streams at full USB CDC speed.
pub const DEFAULT_BAUD: u32 = 921_600;
/// Default read timeout. A timed-out read just means no complete line yet.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Errors that can occur while talking to the serial port.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    #[error("failed to open serial port '{port}': {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[from] serialport::Error),
    #[error("serial read failed: {0}")]
    Read(#[from] std::io::Error),
}

/// Open the scanner's serial port with a short blocking read timeout.
pub fn open_port(
    port: &str,
    baud: u32,
    timeout: Duration,
) -> Result<Box<dyn SerialPort>, SerialError> {
    serialport::new(port, baud)
        .timeout(timeout)
        .open()
        .map_err(|source| SerialError::Open {
            port: port.to_string(),
            source,
        })
}

/// Longest line the reader will buffer. The biggest legal frame
/// ([`crate::protocol::MAX_TAXELS`] samples at up to 12 bytes each) fits
/// comfortably; anything longer is noise, typically a wrong baud rate.
const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Accumulates raw bytes from a reader and yields newline-terminated lines.
///
/// Bytes are decoded as UTF-8 with invalid sequences replaced, and trailing
/// `\r`/whitespace trimmed, matching how the scanner's firmware terminates
/// lines. A read timeout is not an error; it surfaces as "no line yet".
/// A line that outgrows [`MAX_LINE_BYTES`] without a terminator is thrown
/// away and the reader resynchronizes at the next newline.
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
    eof: bool,
    discarding: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            eof: false,
            discarding: false,
        }
    }

    /// Whether the underlying reader has reached end of input.
    ///
    /// A real serial port never does; an in-memory reader in tests will.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Read until one full line is available or the read times out.
    ///
    /// Returns `Ok(None)` on timeout or end of input, `Ok(Some(line))` with
    /// the terminator stripped otherwise.
    pub fn next_line(&mut self) -> Result<Option<String>, SerialError> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = self.buf.drain(..=pos).collect();
                if self.discarding {
                    // Tail end of an oversized line; resync here.
                    self.discarding = false;
                    continue;
                }
                let line = String::from_utf8_lossy(&raw).trim().to_string();
                return Ok(Some(line));
            }
            if self.buf.len() > MAX_LINE_BYTES {
                self.buf.clear();
                self.discarding = true;
            }
            if self.eof {
                return Ok(None);
            }

            let mut chunk = [0u8; 512];
            match self.inner.read(&mut chunk) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(None);
                }
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e)
                    if e.kind() == std::io::ErrorKind::TimedOut
                        || e.kind() == std::io::ErrorKind::WouldBlock =>
                {
                    return Ok(None);
                }
                Err(e) => return Err(SerialError::Read(e)),
            }
        }
    }
}

/// A discovered serial port.
#[derive(Debug, Clone)]
pub struct PortInfo {
    pub name: String,
    /// "usb", "pci", "bluetooth", or "unknown".
    pub kind: &'static str,
    /// USB product string, when the OS reports one.
    pub product: Option<String>,
}

/// Enumerate serial ports available on this machine.
pub fn list_ports() -> Result<Vec<PortInfo>, SerialError> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|p| {
            let (kind, product) = match p.port_type {
                SerialPortType::UsbPort(usb) => ("usb", usb.product),
                SerialPortType::PciPort => ("pci", None),
                SerialPortType::BluetoothPort => ("bluetooth", None),
                SerialPortType::Unknown => ("unknown", None),
            };
            PortInfo {
                name: p.port_name,
                kind,
                product,
            }
        })
        .collect())
}

/// Print the port list to stdout.
pub fn print_ports(ports: &[PortInfo]) {
    if ports.is_empty() {
        println!("No serial ports found.");
        return;
    }
    println!("Serial ports:");
    for port in ports {
        match &port.product {
            Some(product) => println!("  {} ({}, {})", port.name, port.kind, product),
            None => println!("  {} ({})", port.name, port.kind),
        }
    }
}
