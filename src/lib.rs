//! hcisnoop - Convert ArduinoBLE HCI debug traces into Btsnoop captures
//!
//! This library holds the format core shared by the two command-line
//! frontends: the byte-exact Btsnoop encoder and the trace-line parsers.
//! The frontends own all I/O (serial port, files, stdout); the core only
//! sees text lines in and bytes out.

pub mod btsnoop;
pub mod error;
pub mod parser;

// Re-export commonly used types
pub use error::{Error, Result};
pub use parser::TracePacket;
