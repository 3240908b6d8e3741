/// Implementation of `yxdb validate`.
///
/// Streams every record and reports either a series of success marks
/// (`✓`) or a diagnostic failure line (`✗`). The command exits with code
/// 0 on a valid file and code 1 on any error.
///
/// # Success output
///
/// ```text
/// ✓ Header: 512 bytes, 8716 records declared
/// ✓ Schema: 9 fields, 81 fixed bytes, variable data
/// ✓ Records: 8716 read (0 long, largest 214 bytes)
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error: record 12: back-reference distance 40 reaches before start of output at 3
/// ✗ Error: 4000 of 8716 declared records present
/// ```
use anyhow::{Context, Result, anyhow};
use yxdb_reader::{ReaderConfig, YxdbReader};

use crate::FileArgs;

/// Counts gathered while streaming.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RecordStats {
    pub records: u64,
    pub long_records: u64,
    pub largest: usize,
}

/// Walk every record of `reader`.
pub fn scan(reader: &mut YxdbReader) -> RecordStats {
    let mut stats = RecordStats::default();
    while reader.advance() {
        stats.records += 1;
        if reader.is_long_record() {
            stats.long_records += 1;
        }
        stats.largest = stats.largest.max(reader.record().len());
    }
    stats
}

/// Run the `yxdb validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, a block fails to read
/// or decompress, or fewer records are present than the header declares.
pub fn run(args: &FileArgs, config: ReaderConfig) -> Result<()> {
    let mut reader = YxdbReader::open_with_config(&args.file, config)
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    let declared = reader.record_count();
    let layout = reader.layout();
    println!("✓ Header: 512 bytes, {declared} records declared");
    println!(
        "✓ Schema: {} fields, {} fixed bytes, {}",
        reader.schema().len(),
        layout.fixed_size,
        if layout.has_variable_field {
            "variable data"
        } else {
            "no variable data"
        }
    );

    let stats = scan(&mut reader);

    if let Some(e) = reader.last_error() {
        println!("✗ Error: record {}: {e}", stats.records);
        return Err(anyhow!("validation failed"));
    }
    if stats.records != declared {
        println!("✗ Error: {} of {declared} declared records present", stats.records);
        return Err(anyhow!("validation failed"));
    }

    println!(
        "✓ Records: {} read ({} long, largest {} bytes)",
        stats.records, stats.long_records, stats.largest
    );
    reader.close().context("failed to close reader")?;
    Ok(())
}
