/// Implementation of `yxdb schema`: print the metadata XML.
///
/// The text is printed as the reader parsed it, so files stored without
/// a `MetaInfo` root show the wrapper that was added.
use anyhow::{Context, Result};
use yxdb_reader::{ReaderConfig, YxdbReader};

use crate::FileArgs;

/// Run the `yxdb schema` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn run(args: &FileArgs, config: ReaderConfig) -> Result<()> {
    let reader = YxdbReader::open_with_config(&args.file, config)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    println!("{}", reader.schema_text());
    reader.close().context("failed to close reader")?;
    Ok(())
}
