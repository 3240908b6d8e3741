/// Implementation of `yxdb dump`.
///
/// Prints one line per record: its index, length and bytes as hex. With
/// `--json` each line is a JSON object instead.
///
/// ```text
/// #0 len=5 64000000 00
/// #1 len=5 65000000 00
/// ```
///
/// ```text
/// {"hex":"6400000000","index":0,"len":5,"long":false}
/// ```
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result, anyhow};
use serde_json::json;
use yxdb_reader::{ReaderConfig, YxdbReader};

use crate::DumpArgs;

/// Bytes per space-separated hex group in text output.
const GROUP: usize = 4;

/// Run the `yxdb dump` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, stdout cannot be
/// written, or the record stream fails.
pub fn run(args: &DumpArgs, config: ReaderConfig) -> Result<()> {
    let mut reader = YxdbReader::open_with_config(&args.file, config)
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut printed: u64 = 0;

    while !args.limit.is_some_and(|limit| printed >= limit) && reader.advance() {
        let index = reader.position() - 1;
        if index < args.offset {
            continue;
        }
        write_record(&mut out, index, reader.record(), reader.is_long_record(), args.json)?;
        printed += 1;
    }
    out.flush()?;

    if let Some(e) = reader.last_error() {
        return Err(anyhow!("record {}: {e}", reader.position()));
    }
    reader.close().context("failed to close reader")?;
    Ok(())
}

fn write_record(
    out: &mut impl Write,
    index: u64,
    record: &[u8],
    long: bool,
    as_json: bool,
) -> io::Result<()> {
    if as_json {
        let line = json!({
            "index": index,
            "len": record.len(),
            "long": long,
            "hex": hex::encode(record),
        });
        return writeln!(out, "{line}");
    }

    write!(out, "#{index} len={}", record.len())?;
    for group in record.chunks(GROUP) {
        write!(out, " {}", hex::encode(group))?;
    }
    writeln!(out)
}
