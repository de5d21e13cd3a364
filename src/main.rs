/// `hcisnoop` - Convert a recorded ArduinoBLE debug log into a Btsnoop file
///
/// This program is free software: you can redistribute it and/or modify
/// it under the terms of the GNU General Public License as published by
/// the Free Software Foundation, either version 3 of the License, or
/// (at your option) any later version.
///
/// This program is distributed in the hope that it will be useful,
/// but WITHOUT ANY WARRANTY; without even the implied warranty of
/// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
/// GNU General Public License for more details.
///
/// You should have received a copy of the GNU General Public License
/// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use hcisnoop::parser::dump;

#[derive(Parser, Debug)]
#[command(name = "hcisnoop")]
#[command(version)]
#[command(
    about = "Convert an ArduinoBLE debug log into a Btsnoop capture readable by Wireshark or hcidump",
    long_about = None
)]
struct Args {
    /// Input file containing the debug log
    #[arg(short = 'i', value_name = "FILE")]
    input: PathBuf,

    /// Result file that will contain the Btsnoop-encoded capture
    #[arg(short = 'o', value_name = "FILE")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    // Initialize logger; set RUST_LOG to override (e.g., RUST_LOG=debug)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    log::info!(
        "hcisnoop {} converting {} -> {}",
        env!("CARGO_PKG_VERSION"),
        args.input.display(),
        args.output.display()
    );

    let records = dump::convert_log_file(&args.input, &args.output)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;

    log::info!("done: {records} HCI records");
    Ok(())
}
