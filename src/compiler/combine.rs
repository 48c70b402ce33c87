//! Bundle concatenation.

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

/// Written after every input, including the last one.
pub const SEPARATOR: &[u8] = b"\n";

/// Concatenate `inputs` in order into `output`.
///
/// Creates the parent directory of `output` when missing and overwrites an
/// existing file. Contents are copied byte-for-byte, each followed by
/// [`SEPARATOR`]. An unreadable input aborts the bundle; whatever was written
/// up to that point stays on disk.
pub fn combine_files<P: AsRef<Path>>(inputs: &[P], output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let file = File::create(output)
        .with_context(|| format!("Failed to create bundle {}", output.display()))?;
    let mut writer = BufWriter::new(file);

    for input in inputs {
        let input = input.as_ref();
        let mut reader =
            File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
        io::copy(&mut reader, &mut writer)
            .with_context(|| format!("Failed to append {}", input.display()))?;
        writer.write_all(SEPARATOR)?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write bundle {}", output.display()))?;
    Ok(())
}
