/// Implementation of `yxdb inspect`.
///
/// Opens the file (reading only the header and metadata) and prints a
/// summary followed by one line per field.
///
/// # Output format
///
/// ```text
/// Description:  TutorialData
/// File id:      0x00440049
/// Created:      1700000000
/// Records:      8716
/// Compression:  v1
/// Metadata:     1123 UTF-16 units
/// Data offset:  2758
/// Block index:  1876112
/// Layout:       81 fixed bytes + 4-byte variable length
/// Fields (9):
///    #  Name                      Type         Size  Bytes
///    0  UserID                    Int32           0      5
///    1  First                     V_WString      12      4
/// ```
use anyhow::{Context, Result};
use yxdb_reader::{ReaderConfig, YxdbReader};

use crate::FileArgs;

/// Run the `yxdb inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or its header or
/// metadata is invalid.
pub fn run(args: &FileArgs, config: ReaderConfig) -> Result<()> {
    let reader = YxdbReader::open_with_config(&args.file, config)
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    let header = reader.header();
    let layout = reader.layout();
    println!("Description:  {}", header.description);
    println!("File id:      0x{:08X}", header.file_id);
    println!("Created:      {}", header.created_at);
    println!("Records:      {}", header.record_count);
    println!("Compression:  v{}", header.compression_version);
    println!("Metadata:     {} UTF-16 units", header.metadata_len);
    println!("Data offset:  {}", header.data_offset());
    println!("Block index:  {}", header.record_block_index_offset);
    if layout.has_variable_field {
        println!(
            "Layout:       {} fixed bytes + {}-byte variable length",
            layout.fixed_size,
            layout.var_len_prefix()
        );
    } else {
        println!("Layout:       {} fixed bytes", layout.fixed_size);
    }

    let schema = reader.schema();
    println!("Fields ({}):", schema.len());
    println!("   #  {:<24}  {:<11}  {:>4}  {:>5}", "Name", "Type", "Size", "Bytes");
    for (idx, field) in schema.iter().enumerate() {
        println!(
            "{idx:>4}  {:<24}  {:<11}  {:>4}  {:>5}",
            field.name,
            field.field_type.name(),
            field.size,
            field.fixed_footprint()
        );
    }

    reader.close().context("failed to close reader")?;
    Ok(())
}
