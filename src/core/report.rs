//! Match report: a one-column CSV with header `Common Names`.

use log::info;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::core::error::{ScanError, ScanResult};

pub const REPORT_HEADER: &str = "Common Names";
pub const REPORT_FILE_NAME: &str = "common_names.csv";
pub const EXTRACTED_NAMES_FILE_NAME: &str = "extracted_names.txt";

const LINE_END: &str = "\r\n";

pub struct ReportWriter;

impl ReportWriter {
    /// Unique names in ascending byte order.
    pub fn rows<'a, I>(names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn render<'a, I>(names: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        render_rows(&Self::rows(names))
    }

    /// Creates or overwrites `path`. Returns the number of data rows.
    pub fn write<'a, I>(path: &Path, names: I) -> ScanResult<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let rows = Self::rows(names);
        fs::write(path, render_rows(&rows)).map_err(ScanError::fs(path))?;
        info!("📝 Wrote {} report rows to {:?}", rows.len(), path);
        Ok(rows.len())
    }

    /// Raw extracted names, one per line, in extraction order.
    pub fn write_extracted_names(path: &Path, names: &[String]) -> ScanResult<()> {
        let mut out = String::new();
        for name in names {
            out.push_str(name);
            out.push('\n');
        }
        fs::write(path, out).map_err(ScanError::fs(path))
    }
}

fn render_rows(rows: &[String]) -> String {
    let mut out = String::new();
    out.push_str(REPORT_HEADER);
    out.push_str(LINE_END);
    for row in rows {
        out.push_str(&escape_field(row));
        out.push_str(LINE_END);
    }
    out
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_and_sort() {
        let rendered = ReportWriter::render(["Jane Doe", "Jane Doe"]);
        assert_eq!(rendered, "Common Names\r\nJane Doe\r\n");

        let rendered = ReportWriter::render(["Zoe Ray", "Amy Lee"]);
        assert_eq!(rendered, "Common Names\r\nAmy Lee\r\nZoe Ray\r\n");
    }

    #[test]
    fn test_case_sensitive_ordering() {
        let rows = ReportWriter::rows(["amy lee", "Zoe Ray", "Amy Lee"]);
        assert_eq!(rows, vec!["Amy Lee", "Zoe Ray", "amy lee"]);
    }

    #[test]
    fn test_empty_is_header_only() {
        assert_eq!(ReportWriter::render(std::iter::empty()), "Common Names\r\n");
    }

    #[test]
    fn test_quoting() {
        assert_eq!(escape_field("Jane Doe"), "Jane Doe");
        assert_eq!(escape_field("Doe, Jane"), "\"Doe, Jane\"");
        assert_eq!(escape_field("Jane \"JD\" Doe"), "\"Jane \"\"JD\"\" Doe\"");
    }

    #[test]
    fn test_write_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(REPORT_FILE_NAME);
        let names = vec!["John Smith".to_string(), "Amy Lee".to_string(), "Amy Lee".to_string()];

        let rows = ReportWriter::write(&path, names.iter().map(String::as_str)).unwrap();
        let first = fs::read(&path).unwrap();
        ReportWriter::write(&path, names.iter().map(String::as_str)).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(rows, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_to_missing_dir_is_filesystem_error() {
        let err = ReportWriter::write(Path::new("/nonexistent/dir/out.csv"), ["A B"]).unwrap_err();
        assert!(matches!(err, ScanError::Filesystem { .. }));
    }

    #[test]
    fn test_extracted_names_dump() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(EXTRACTED_NAMES_FILE_NAME);
        let names = vec!["Jane Doe".to_string(), "Jane Doe".to_string()];
        ReportWriter::write_extracted_names(&path, &names).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Jane Doe\nJane Doe\n");
    }
}
