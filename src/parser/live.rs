//! Classifier for lines streamed live from the firmware's serial trace.
//!
//! Trace lines look like `HCI COMMAND TX -> 01030c00`; anything without an
//! `RX` or `TX` marker is ordinary debug output and is skipped (the caller
//! still echoes it to stderr so the operator sees the full stream).

use crate::btsnoop::{FLAG_DIRECTION_RECEIVED, FLAG_TYPE_CLASS};
use crate::error::{Error, Result};

use super::{decode_hex, TracePacket};

/// Classify one serial trace line.
///
/// Returns `Ok(None)` for diagnostic lines, `Ok(Some(packet))` for HCI
/// trace lines, and a format error when the payload field of an accepted
/// line is not valid hex (fatal for the capture; the live pipeline has no
/// per-line recovery).
pub fn classify(line: &str) -> Result<Option<TracePacket>> {
    if !line.contains("RX") && !line.contains("TX") {
        return Ok(None);
    }

    // The hex payload is always the final whitespace-separated field.
    let Some(hex_field) = line.split_whitespace().next_back() else {
        return Err(Error::Structure {
            line: line.to_string(),
            reason: "accepted trace line has no tokens".to_string(),
        });
    };
    let payload = decode_hex(hex_field)?;

    let mut flags = 0;
    if line.contains("RX") {
        flags |= FLAG_DIRECTION_RECEIVED;
    }
    // Commands and events get the type-class bit; ACL data does not.
    if !line.contains("ACLDATA") {
        flags |= FLAG_TYPE_CLASS;
    }

    Ok(Some(TracePacket { payload, flags }))
}
