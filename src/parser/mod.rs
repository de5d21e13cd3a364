//! Trace line parsers.
//!
//! Two grammars are accepted, one per input mode:
//! [`live`] for lines streamed from a serial port, [`dump`] for lines in a
//! recorded debug log. Both produce [`TracePacket`]s for the Btsnoop
//! encoder. The two grammars compute the packet-type flag bit differently
//! (ACLDATA-based in live mode, COMMAND/EVENT-based in dump mode); both
//! conventions are kept per pipeline.

pub mod dump;
pub mod live;

use crate::error::{Error, Result};

/// One classified HCI trace line: decoded payload plus Btsnoop record flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracePacket {
    /// Raw HCI message bytes
    pub payload: Vec<u8>,
    /// Btsnoop record flags (direction bit 0, type-class bit 1)
    pub flags: u32,
}

/// Decode a hex string into raw bytes.
///
/// Odd-length input and non-hex digits are format errors; these abort the
/// conversion rather than producing a partial record. The empty string
/// decodes to an empty payload.
pub fn decode_hex(hex: &str) -> Result<Vec<u8>> {
    if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(Error::Format {
            payload: hex.to_string(),
            reason: format!("invalid hex digit {bad:?}"),
        });
    }
    if hex.len() % 2 != 0 {
        return Err(Error::Format {
            payload: hex.to_string(),
            reason: format!("odd number of hex digits ({})", hex.len()),
        });
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| Error::Format {
                payload: hex.to_string(),
                reason: format!("invalid hex digits {:?}", &hex[i..i + 2]),
            })
        })
        .collect()
}
