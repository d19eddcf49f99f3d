// Output formatting for CLI

use crate::cli::config::OutputFormat;
use crate::cli::CliResult;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use oxid3::{FrameHeader, Id3v2Tag, TagFlags};
use serde::Serialize;
use std::io::Write;

/// Bytes of a non-text payload shown in a report
const PREVIEW_BYTES: usize = 24;

/// Structure of a parsed tag, as reported by `inspect`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagReport {
    pub offset: usize,
    pub version: u8,
    pub revision: u8,
    pub flags: Option<TagFlags>,
    pub size: u32,
    pub total_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_header_size: Option<usize>,
    pub frames: Vec<FrameReport>,
}

#[derive(Debug, Serialize)]
pub struct FrameReport {
    #[serde(flatten)]
    pub header: FrameHeader,
    /// Decoded value for text frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64 of the start of any other payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

impl From<&Id3v2Tag> for TagReport {
    fn from(tag: &Id3v2Tag) -> Self {
        let frames = tag
            .frames
            .iter()
            .map(|frame| {
                let text = frame.text();
                let preview = text.is_none().then(|| {
                    let end = frame.data.len().min(PREVIEW_BYTES);
                    STANDARD.encode(&frame.data[..end])
                });
                FrameReport {
                    header: frame.header.clone(),
                    text,
                    preview,
                }
            })
            .collect();

        TagReport {
            offset: tag.offset,
            version: tag.header.version.as_byte(),
            revision: tag.header.revision,
            flags: tag.header.flags(),
            size: tag.header.size,
            total_size: tag.header.total_size(),
            extended_header_size: tag.extended_header.as_ref().map(Vec::len),
            frames,
        }
    }
}

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Output a tag report
    pub fn output_tag(&self, report: &TagReport, writer: &mut impl Write) -> CliResult<()> {
        match self.format {
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string_pretty(report)?)?;
            }
            OutputFormat::Pretty => self.output_tag_pretty(report, writer)?,
        }
        Ok(())
    }

    fn output_tag_pretty(&self, report: &TagReport, writer: &mut impl Write) -> CliResult<()> {
        writeln!(
            writer,
            "ID3v2.{}.{} at offset {}",
            report.version, report.revision, report.offset
        )?;
        writeln!(writer, "  size: {} bytes ({} on disk)", report.size, report.total_size)?;
        if let Some(flags) = &report.flags {
            writeln!(writer, "  flags: {}", self.format_flags(flags))?;
        }
        if let Some(size) = report.extended_header_size {
            writeln!(writer, "  extended header: {size} bytes")?;
        }

        let width = report.frames.iter().map(|f| f.header.id.len()).max().unwrap_or(4);
        writeln!(writer, "{}", "=".repeat(width + 30))?;
        for frame in &report.frames {
            let value = match (&frame.text, &frame.preview) {
                (Some(text), _) => format!("{text:?}"),
                (None, Some(preview)) => format!("<{preview}>"),
                (None, None) => String::new(),
            };
            writeln!(
                writer,
                "{:<width$} {:>8}  {}",
                frame.header.id,
                frame.header.size,
                value,
                width = width
            )?;
        }
        writeln!(writer, "{}", "=".repeat(width + 30))?;
        Ok(())
    }

    fn format_flags(&self, flags: &TagFlags) -> String {
        let set: Vec<&str> = [
            ("unsynchronisation", flags.unsynchronisation),
            ("extended-header", flags.extended_header),
            ("experimental", flags.experimental_indicator),
            ("footer", flags.footer_present == Some(true)),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect();

        if set.is_empty() {
            "(none)".to_string()
        } else {
            set.join(", ")
        }
    }

    /// Output any serializable value
    pub fn output_value<T: Serialize>(&self, value: &T, writer: &mut impl Write) -> CliResult<()> {
        match self.format {
            OutputFormat::Json => writeln!(writer, "{}", serde_json::to_string(value)?)?,
            OutputFormat::Pretty => writeln!(writer, "{}", serde_json::to_string_pretty(value)?)?,
        }
        Ok(())
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }
}
