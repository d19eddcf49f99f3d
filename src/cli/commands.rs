// CLI command implementations
use crate::cli::output::{OutputFormatter, TagReport};
use crate::cli::{CliError, CliResult};
use oxid3::{
    find_tag_start, get_spec_options, FrameOptionsTable, Id3v2Tag, Id3v2Version, ParseOptions,
};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Read the whole input, from `file` or stdin
pub fn read_input(file: Option<&Path>) -> CliResult<Vec<u8>> {
    match file {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::FileNotFound(path.display().to_string()));
            }
            Ok(std::fs::read(path)?)
        }
        None => {
            let mut data = Vec::new();
            io::stdin().lock().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}

/// Print the structure of the first tag in the input
pub fn command_inspect(
    file: Option<PathBuf>,
    raw: bool,
    max_frames: Option<usize>,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    let data = read_input(file.as_deref())?;

    let mut options = ParseOptions::new().unsynchronisation(!raw);
    if let Some(max) = max_frames {
        options = options.max_frames(max);
    }

    let tag = Id3v2Tag::parse(&data, options)?;
    formatter.output_tag(&TagReport::from(&tag), &mut io::stdout().lock())?;
    Ok(())
}

/// Print the offset of the first valid tag header
pub fn command_locate(file: Option<PathBuf>, formatter: &OutputFormatter) -> CliResult<()> {
    let data = read_input(file.as_deref())?;
    let offset = find_tag_start(&data);

    let mut stdout = io::stdout().lock();
    match offset {
        Some(offset) => {
            formatter.output_value(&serde_json::json!({ "offset": offset }), &mut stdout)?
        }
        None => {
            formatter.print_info("No valid ID3v2 header found");
            formatter.output_value(&serde_json::json!({ "offset": null }), &mut stdout)?;
        }
    }
    stdout.flush()?;
    Ok(())
}

/// Look up a frame field in a frame options table
pub fn command_options(
    table: PathBuf,
    name: String,
    major: u8,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    let version = Id3v2Version::from_byte(major)
        .ok_or_else(|| CliError::Other(format!("Unsupported ID3v2 version: {major}")))?;

    let json = String::from_utf8(read_input(Some(table.as_path()))?)
        .map_err(|e| CliError::Other(format!("{}: {}", table.display(), e)))?;
    let table = FrameOptionsTable::from_json(&json)?;

    let options = get_spec_options(&table, &name, version);
    formatter.output_value(&*options, &mut io::stdout().lock())?;
    Ok(())
}
