//! Two-pass converter for recorded debug logs.
//!
//! ArduinoBLE debug output interleaves HCI trace lines with ordinary
//! diagnostics. Pass 1 filters the trace lines into an intermediate file;
//! pass 2 locates the `HCI` token on each kept line and encodes the fields
//! around it into Btsnoop records. Recorded logs carry no usable wall
//! clock, so every record gets a zero timestamp.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::btsnoop;
use crate::error::{Error, Result};

use super::{decode_hex, TracePacket};

/// Pass 1 predicate: does this log line carry an HCI trace?
///
/// Two token shapes are accepted: `<ts> -> HCI <type> <dir> <arrow> <hex>`
/// (at least 7 tokens, arrow then `HCI` up front) and lines that start with
/// the `HCI` token followed by a direction arrow at token 3.
pub fn is_hci_trace_line(line: &str) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() >= 7 && tokens[1] == "->" && tokens[2] == "HCI" {
        return true;
    }
    tokens.len() >= 4 && tokens[0] == "HCI" && (tokens[3] == "<-" || tokens[3] == "->")
}

/// Pass 2: extract the packet from a filtered line.
///
/// The `HCI` token's position varies between the accepted shapes, so it is
/// located by search and the type/direction/payload fields are read
/// relative to it. Every relative access is bounds-checked; a kept line
/// that lacks one of them is a structural error, fatal for the run.
pub fn extract(line: &str) -> Result<TracePacket> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let base = tokens
        .iter()
        .position(|token| *token == "HCI")
        .ok_or_else(|| Error::Structure {
            line: line.to_string(),
            reason: "no HCI token on a filtered line".to_string(),
        })?;

    let field = |offset: usize, name: &str| -> Result<&str> {
        tokens
            .get(base + offset)
            .copied()
            .ok_or_else(|| Error::Structure {
                line: line.to_string(),
                reason: format!("missing {name} token at HCI+{offset}"),
            })
    };
    let hci_type = field(1, "type")?;
    let hci_direction = field(2, "direction")?;
    let hci_message = field(4, "message")?;

    let direction_flag = u32::from(hci_direction != "TX");
    let type_flag = u32::from(hci_type == "COMMAND" || hci_type == "EVENT");

    Ok(TracePacket {
        payload: decode_hex(hci_message)?,
        flags: (type_flag << 1) | direction_flag,
    })
}

/// Convert a recorded debug log into a Btsnoop capture file.
///
/// The filtered intermediate lives in a named temp file that is removed on
/// every exit path, success and error alike. Returns the number of records
/// written. On error, output already flushed stays on disk (no rollback).
pub fn convert_log_file(input: &Path, output: &Path) -> Result<usize> {
    // Pass 1: filter the HCI trace lines, preserving order.
    let mut filtered = tempfile::Builder::new()
        .prefix("hcisnoop-filtered-")
        .suffix(".txt")
        .tempfile()?;
    let mut kept = 0usize;
    for line in BufReader::new(File::open(input)?).lines() {
        let line = line?;
        if is_hci_trace_line(&line) {
            writeln!(filtered, "{line}")?;
            kept += 1;
        }
    }
    filtered.flush()?;
    log::info!("pass 1: kept {kept} HCI trace lines from {}", input.display());

    // Pass 2: encode the filtered lines.
    let mut writer = BufWriter::new(File::create(output)?);
    writer.write_all(&btsnoop::encode_header(btsnoop::DATALINK_HCI_H4))?;
    let mut records = 0usize;
    for line in BufReader::new(filtered.reopen()?).lines() {
        let line = line?;
        let packet = extract(&line)?;
        writer.write_all(&btsnoop::encode_record(&packet.payload, packet.flags, 0))?;
        records += 1;
    }
    writer.flush()?;
    log::info!("pass 2: wrote {records} records to {}", output.display());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btsnoop::{FILE_HEADER_LEN, RECORD_HEADER_LEN};
    use std::io::Read;

    #[test]
    fn pass1_keeps_arrow_shape() {
        assert!(is_hci_trace_line("foo -> HCI bar baz qux x"));
        assert!(is_hci_trace_line("41675 -> HCI COMMAND TX -> 01030c00"));
    }

    #[test]
    fn pass1_keeps_hci_first_shape() {
        assert!(is_hci_trace_line("HCI EVENT RX <- 0e0401030c00"));
        assert!(is_hci_trace_line("HCI COMMAND TX -> 01030c00"));
    }

    #[test]
    fn pass1_drops_everything_else() {
        assert!(!is_hci_trace_line("a b c"));
        assert!(!is_hci_trace_line("Attribute table initialized"));
        assert!(!is_hci_trace_line(""));
        // Arrow shape needs all seven tokens.
        assert!(!is_hci_trace_line("foo -> HCI bar baz qux"));
    }

    #[test]
    fn extract_reads_fields_relative_to_hci_token() {
        let packet = extract("t0 -> HCI COMMAND TX -> 0011").expect("valid line");
        assert_eq!(packet.payload, vec![0x00, 0x11]);
        assert_eq!(packet.flags, 2); // COMMAND => type 1, TX => direction 0
    }

    #[test]
    fn extract_flag_combinations() {
        let event_rx = extract("HCI EVENT RX <- 0e04").expect("valid line");
        assert_eq!(event_rx.flags, 3);

        let acl_tx = extract("t1 -> HCI ACLDATA TX -> 0102").expect("valid line");
        assert_eq!(acl_tx.flags, 0);

        let acl_rx = extract("t1 -> HCI ACLDATA RX <- 0102").expect("valid line");
        assert_eq!(acl_rx.flags, 1);
    }

    #[test]
    fn extract_missing_hci_token_is_structural() {
        assert!(matches!(
            extract("no trace content here"),
            Err(Error::Structure { .. })
        ));
    }

    #[test]
    fn extract_missing_relative_tokens_are_structural() {
        assert!(matches!(extract("t0 -> HCI"), Err(Error::Structure { .. })));
        assert!(matches!(
            extract("t0 -> HCI COMMAND TX"),
            Err(Error::Structure { .. })
        ));
    }

    #[test]
    fn extract_malformed_hex_is_format_error() {
        assert!(matches!(
            extract("t0 -> HCI COMMAND TX -> abc"),
            Err(Error::Format { .. })
        ));
    }

    #[test]
    fn convert_end_to_end() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("debug.log");
        let output = dir.path().join("capture.btsnoop");
        std::fs::write(
            &input,
            "Scanning for peripherals\n\
             41675 -> HCI COMMAND TX -> 01030c00\n\
             noise line\n\
             HCI EVENT RX <- 0e0401030c00\n",
        )
        .expect("write input");

        let records = convert_log_file(&input, &output).expect("conversion succeeds");
        assert_eq!(records, 2);

        let mut bytes = Vec::new();
        File::open(&output)
            .expect("open output")
            .read_to_end(&mut bytes)
            .expect("read output");

        assert_eq!(&bytes[..FILE_HEADER_LEN], &btsnoop::encode_header(btsnoop::DATALINK_HCI_H4));

        // First record: 4-byte COMMAND TX payload, flags 2, zero timestamp.
        let first = &bytes[FILE_HEADER_LEN..FILE_HEADER_LEN + RECORD_HEADER_LEN + 4];
        assert_eq!(&first[0..4], &4u32.to_be_bytes());
        assert_eq!(&first[4..8], &4u32.to_be_bytes());
        assert_eq!(&first[8..12], &2u32.to_be_bytes());
        assert_eq!(&first[16..24], &[0u8; 8]);
        assert_eq!(&first[24..28], &[0x01, 0x03, 0x0c, 0x00]);

        // Second record: 6-byte EVENT RX payload, flags 3.
        let second = &bytes[FILE_HEADER_LEN + RECORD_HEADER_LEN + 4..];
        assert_eq!(&second[0..4], &6u32.to_be_bytes());
        assert_eq!(&second[8..12], &3u32.to_be_bytes());
        assert_eq!(second.len(), RECORD_HEADER_LEN + 6);
    }

    #[test]
    fn convert_aborts_on_malformed_hex() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("debug.log");
        let output = dir.path().join("capture.btsnoop");
        std::fs::write(&input, "t0 -> HCI COMMAND TX -> nothex\n").expect("write input");

        assert!(matches!(
            convert_log_file(&input, &output),
            Err(Error::Format { .. })
        ));
    }
}
