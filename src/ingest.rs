use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::models::{Record, FIELD_COUNT};

/// Read a pipe-delimited license file (no header row) into memory.
///
/// Every field stays text; an empty field becomes `None`. Blank lines are
/// skipped. A line with any other field count than [`FIELD_COUNT`] rejects the
/// whole file.
pub fn read_batch(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(|e| PipelineError::Read {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    read_batch_from(file, path)
}

/// Same as [`read_batch`] for an in-memory source; `path` is only used in errors.
pub fn read_batch_from<R: Read>(source: R, path: &Path) -> Result<Vec<Record>> {
    parse(builder().from_reader(source), path)
}

fn builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.delimiter(b'|').has_headers(false).flexible(true);
    builder
}

fn parse<R: Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<Vec<Record>> {
    let mut batch = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let row = result.map_err(|e| PipelineError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);

        if row.len() == 1 && row[0].trim().is_empty() {
            continue;
        }
        if row.len() != FIELD_COUNT {
            return Err(PipelineError::MalformedRecord {
                line,
                expected: FIELD_COUNT,
                found: row.len(),
            });
        }

        let fields = row
            .iter()
            .map(|f| (!f.is_empty()).then(|| f.to_string()))
            .collect();
        batch.push(Record::new(line, fields));
    }

    if batch.is_empty() {
        return Err(PipelineError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    tracing::info!(path = %path.display(), records = batch.len(), "read batch");
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(company: &str, postal: &str) -> String {
        let mut fields = vec![String::new(); FIELD_COUNT];
        fields[4] = "retail".to_string();
        fields[9] = company.to_string();
        fields[16] = postal.to_string();
        fields.join("|")
    }

    fn parse_str(input: &str) -> Result<Vec<Record>> {
        read_batch_from(input.as_bytes(), Path::new("input.txt"))
    }

    #[test]
    fn test_reads_records_as_text() {
        let input = format!(
            "{}\n{}\n",
            line("Shop Alpha (00123)", "01000"),
            line("Shop Beta", "")
        );
        let batch = parse_str(&input).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].line, 1);
        assert_eq!(batch[0].company_name(), Some("Shop Alpha (00123)"));
        assert_eq!(batch[0].fields[16].as_deref(), Some("01000"));
        assert_eq!(batch[1].line, 2);
        assert_eq!(batch[1].fields[16], None);
        assert_eq!(batch[1].fields[0], None);
    }

    #[test]
    fn test_skips_blank_lines() {
        let input = format!("{}\n\n{}\n", line("A", "1"), line("B", "2"));
        let batch = parse_str(&input).unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_wrong_field_count_is_rejected() {
        let input = format!("{}\na|b|c\n", line("A", "1"));
        let err = parse_str(&input).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MalformedRecord {
                line: 2,
                expected: 18,
                found: 3
            }
        ));
    }

    #[test]
    fn test_extra_field_is_rejected() {
        let input = format!("{}|extra\n", line("A", "1"));
        assert!(matches!(
            parse_str(&input),
            Err(PipelineError::MalformedRecord { found: 19, .. })
        ));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(
            parse_str(""),
            Err(PipelineError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_read_batch_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("licenses.txt");
        std::fs::write(&path, format!("{}\n", line("ร้านค้า (00001)", "10110"))).unwrap();

        let batch = read_batch(&path).unwrap();
        assert_eq!(batch[0].company_name(), Some("ร้านค้า (00001)"));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_batch(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, PipelineError::Read { .. }));
    }
}
