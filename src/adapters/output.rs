use crate::domain::{DigestReport, VerifyEntry, VerifyOutcome};
use crate::ports::OutputPort;
use anyhow::Result;
use console::style;
use std::fs;
use std::path::{Path, PathBuf};

struct OutputWriter {
    output_file: Option<PathBuf>,
}

impl OutputWriter {
    fn new() -> Self {
        Self { output_file: None }
    }

    fn with_file(path: &Path) -> Self {
        Self {
            output_file: Some(path.to_path_buf()),
        }
    }

    fn write_content(&self, content: &str) -> Result<()> {
        match &self.output_file {
            Some(path) => fs::write(path, content)?,
            None => print!("{}", content),
        }
        Ok(())
    }
}

/// `md5sum`-style lines: `<digest>  <size>  <path>`.
pub struct ConsoleOutputAdapter {
    writer: OutputWriter,
    summary_only: bool,
}

impl ConsoleOutputAdapter {
    pub fn new() -> Self {
        Self {
            writer: OutputWriter::new(),
            summary_only: false,
        }
    }

    pub fn with_file(path: &Path) -> Self {
        Self {
            writer: OutputWriter::with_file(path),
            summary_only: false,
        }
    }

    pub fn with_summary_only(mut self, summary_only: bool) -> Self {
        self.summary_only = summary_only;
        self
    }

    fn format_report(&self, report: &DigestReport) -> String {
        let mut output = String::new();
        if !self.summary_only {
            for file in &report.files {
                output.push_str(&format!("{}  {}  {}\n", file.digest, file.size, file.path.display()));
            }
        }
        if self.summary_only || !report.is_complete() {
            output.push_str(&format!(
                "{} files, {:.2} MB hashed, {} failed\n",
                report.files.len(),
                report.total_size as f64 / 1_048_576.0,
                report.failures.len()
            ));
        }
        output
    }

    fn format_verification(&self, entries: &[VerifyEntry]) -> String {
        let mut output = String::new();
        let mut failed = 0;
        for entry in entries {
            let label = entry.outcome.label();
            if entry.outcome.is_ok() {
                if !self.summary_only {
                    output.push_str(&format!("{}: {}\n", entry.path.display(), style(label).green()));
                }
                continue;
            }

            failed += 1;
            let detail = match &entry.outcome {
                VerifyOutcome::Mismatch { expected, actual } => {
                    format!(" (expected {}, got {})", expected, actual)
                }
                VerifyOutcome::SizeMismatch { expected, actual } => {
                    format!(" (expected {} bytes, got {})", expected, actual)
                }
                VerifyOutcome::Unreadable { error } => format!(" ({})", error),
                VerifyOutcome::Match | VerifyOutcome::Missing => String::new(),
            };
            output.push_str(&format!("{}: {}{}\n", entry.path.display(), style(label).red().bold(), detail));
        }
        output.push_str(&format!("{} checked, {} failed\n", entries.len(), failed));
        output
    }
}

impl Default for ConsoleOutputAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPort for ConsoleOutputAdapter {
    fn write_report(&self, report: &DigestReport) -> Result<()> {
        for failure in &report.failures {
            eprintln!("{}: {}", failure.path.display(), style(&failure.error).red());
        }
        self.writer.write_content(&self.format_report(report))
    }

    fn write_verification(&self, entries: &[VerifyEntry]) -> Result<()> {
        self.writer.write_content(&self.format_verification(entries))
    }
}

pub struct JsonOutputAdapter {
    writer: OutputWriter,
}

impl JsonOutputAdapter {
    pub fn with_file(path: &Path) -> Self {
        Self {
            writer: OutputWriter::with_file(path),
        }
    }

    pub fn with_stdout() -> Self {
        Self {
            writer: OutputWriter::new(),
        }
    }
}

impl OutputPort for JsonOutputAdapter {
    fn write_report(&self, report: &DigestReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_content(&format!("{}\n", json))
    }

    fn write_verification(&self, entries: &[VerifyEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        self.writer.write_content(&format!("{}\n", json))
    }
}

pub struct CsvOutputAdapter {
    writer: OutputWriter,
}

impl CsvOutputAdapter {
    pub fn with_file(path: &Path) -> Self {
        Self {
            writer: OutputWriter::with_file(path),
        }
    }

    pub fn with_stdout() -> Self {
        Self {
            writer: OutputWriter::new(),
        }
    }

    fn format_report(&self, report: &DigestReport) -> String {
        let mut output = String::from("file_path,algorithm,digest,file_size\n");
        for file in &report.files {
            output.push_str(&format!(
                "{},{},{},{}\n",
                csv_field(&file.path.display().to_string()),
                file.algorithm,
                file.digest,
                file.size
            ));
        }
        output
    }

    fn format_verification(&self, entries: &[VerifyEntry]) -> String {
        let mut output = String::from("file_path,status\n");
        for entry in entries {
            output.push_str(&format!(
                "{},{}\n",
                csv_field(&entry.path.display().to_string()),
                entry.outcome.label()
            ));
        }
        output
    }
}

impl OutputPort for CsvOutputAdapter {
    fn write_report(&self, report: &DigestReport) -> Result<()> {
        self.writer.write_content(&self.format_report(report))
    }

    fn write_verification(&self, entries: &[VerifyEntry]) -> Result<()> {
        self.writer.write_content(&self.format_verification(entries))
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
