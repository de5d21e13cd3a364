/// `hcisnoop-live` - Stream a live serial HCI trace as Btsnoop to stdout
///
/// Usage: `hcisnoop-live <PORT> <BAUD> > mycapture.btsnoop`
///
/// Every line read from the port is echoed to stderr so the operator sees
/// the full debug stream; lines carrying an HCI trace are additionally
/// encoded as Btsnoop records on stdout. Runs until killed.
use anyhow::Context;
use clap::Parser;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::time::Duration;

use hcisnoop::btsnoop;
use hcisnoop::parser::live;

#[derive(Parser, Debug)]
#[command(name = "hcisnoop-live")]
#[command(version)]
#[command(
    about = "Capture HCI trace lines from a serial port and write a Btsnoop stream to stdout",
    long_about = None
)]
struct Args {
    /// Serial port path (e.g., /dev/ttyACM0)
    #[arg(value_name = "PORT")]
    port: String,

    /// Baud rate (e.g., 115200)
    #[arg(value_name = "BAUD")]
    baud: u32,
}

/// Adapts the serial port's timeout-based reads into indefinite blocking.
///
/// The capture has no read deadline; the operator terminates the process.
/// Short port timeouts are converted into another wait.
struct BlockingPort(Box<dyn SerialPort>);

impl Read for BlockingPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.0.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
                other => return other,
            }
        }
    }
}

/// Read one trace line, retrying a transient failure exactly once.
///
/// A second failure propagates and terminates the pipeline. `Ok(None)`
/// means the stream ended (the port went away).
fn read_line_with_retry<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = String::new();
    match reader.read_line(&mut buf) {
        Ok(0) => return Ok(None),
        Ok(_) => {}
        Err(first) => {
            log::warn!("serial read failed ({first}), retrying once");
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
        }
    }
    Ok(Some(buf.trim_end().to_string()))
}

fn main() -> anyhow::Result<()> {
    // Initialize logger; set RUST_LOG to override (e.g., RUST_LOG=debug)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let port = serialport::new(&args.port, args.baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(Duration::from_millis(100))
        .open()
        .with_context(|| format!("failed to open serial port {}", args.port))?;
    log::info!("Opened serial port: {} at {} baud", args.port, args.baud);

    let stdout = io::stdout();
    let mut sink = stdout.lock();
    sink.write_all(&btsnoop::encode_header(btsnoop::DATALINK_HCI_H4))?;
    sink.flush()?;

    let mut reader = BufReader::new(BlockingPort(port));
    loop {
        let Some(line) =
            read_line_with_retry(&mut reader).context("serial read failed twice")?
        else {
            log::info!("serial stream ended");
            return Ok(());
        };

        // Echo everything for operator visibility, trace line or not.
        eprintln!("{line}");

        if let Some(packet) = live::classify(&line)? {
            let record = btsnoop::encode_record(
                &packet.payload,
                packet.flags,
                btsnoop::capture_timestamp_micros(),
            );
            sink.write_all(&record)?;
            // Flush per record so downstream tools see packets promptly.
            sink.flush()?;
        }
    }
}
