// hcisnoop - GPL-3.0-or-later
// This file is part of hcisnoop.
//
// hcisnoop is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// hcisnoop is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with hcisnoop.  If not, see <https://www.gnu.org/licenses/>.

//! Btsnoop file header and record encoding.
//!
//! Format reference:
//! <https://www.fte.com/WebHelpII/Sodera/Content/Technical_Information/BT_Snoop_File_Format.htm>
//!
//! All multi-byte fields are big-endian. The output must stay byte-exact:
//! it is consumed by Wireshark and hcidump.

/// File identifier, first 8 bytes of every capture
pub const BTSNOOP_MAGIC: &[u8; 8] = b"btsnoop\0";

/// Format version written in the file header
pub const BTSNOOP_VERSION: u32 = 1;

/// Datalink type for un-encapsulated HCI H4 (no pseudo-header)
pub const DATALINK_HCI_H4: u32 = 1002;

/// File header length in bytes
pub const FILE_HEADER_LEN: usize = 16;

/// Fixed record prefix length in bytes (before the payload)
pub const RECORD_HEADER_LEN: usize = 24;

/// Record flags bit 0: packet was received by the host (clear = sent)
pub const FLAG_DIRECTION_RECEIVED: u32 = 0x01;

/// Record flags bit 1: packet-type class bit. The live and file pipelines
/// compute this bit with different predicates; see the parser modules.
pub const FLAG_TYPE_CLASS: u32 = 0x02;

/// Btsnoop timestamps count microseconds since midnight, January 1st, 0 AD.
/// This constant is that epoch's offset at 2000-01-01T00:00:00 UTC.
pub const BTSNOOP_EPOCH_Y2K: u64 = 0x00E0_3AB4_4A67_6000;

/// 2000-01-01T00:00:00 UTC expressed in Unix microseconds
const UNIX_MICROS_AT_Y2K: i64 = 946_684_800_000_000;

/// Encode the 16-byte file header, written exactly once per capture.
///
/// The datalink type is a construction-time choice of the pipeline, not a
/// per-record value. For [`DATALINK_HCI_H4`] the result is the literal
/// `62 74 73 6e 6f 6f 70 00 00 00 00 01 00 00 03 ea`.
pub fn encode_header(datalink: u32) -> [u8; FILE_HEADER_LEN] {
    let mut header = [0u8; FILE_HEADER_LEN];
    header[..8].copy_from_slice(BTSNOOP_MAGIC);
    header[8..12].copy_from_slice(&BTSNOOP_VERSION.to_be_bytes());
    header[12..16].copy_from_slice(&datalink.to_be_bytes());
    header
}

/// Encode one capture record: 24-byte prefix followed by the raw payload,
/// no padding or alignment.
///
/// Original and included length are always equal (truncation is not
/// supported) and cumulative drops are always zero. A zero-length payload
/// is legal and produces a 24-byte record with zero length fields.
pub fn encode_record(payload: &[u8], flags: u32, timestamp_micros: u64) -> Vec<u8> {
    let length = payload.len() as u32;
    let mut record = Vec::with_capacity(RECORD_HEADER_LEN + payload.len());
    record.extend_from_slice(&length.to_be_bytes()); // original length
    record.extend_from_slice(&length.to_be_bytes()); // included length
    record.extend_from_slice(&flags.to_be_bytes());
    record.extend_from_slice(&0u32.to_be_bytes()); // cumulative drops
    record.extend_from_slice(&timestamp_micros.to_be_bytes());
    record.extend_from_slice(payload);
    record
}

/// Current wall-clock time as a Btsnoop timestamp (µs since 0 AD).
///
/// Wall-clock based; successive calls are not guaranteed monotonic.
pub fn capture_timestamp_micros() -> u64 {
    let since_y2k = chrono::Utc::now().timestamp_micros() - UNIX_MICROS_AT_Y2K;
    BTSNOOP_EPOCH_Y2K + since_y2k.max(0) as u64
}
