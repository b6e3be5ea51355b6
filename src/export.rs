//! Serialize a [`Partition`] to its two pipe-delimited blobs and write them out,
//! either as loose files or bundled into a ZIP archive.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{PipelineError, Result};
use crate::models::{Partition, Record};

pub const WITH_ID_FILE: &str = "output_with_id.txt";
pub const WITHOUT_ID_FILE: &str = "output_without_id.txt";
pub const DEFAULT_ARCHIVE: &str = "processed_files.zip";

/// Both serialized record sets, rendered before anything touches the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blobs {
    pub with_id: String,
    pub without_id: String,
}

impl Blobs {
    pub fn render(partition: &Partition) -> std::io::Result<Self> {
        Ok(Self {
            with_id: serialize(&partition.with_id)?,
            without_id: serialize(&partition.without_id)?,
        })
    }

    fn entries(&self) -> [(&'static str, &str); 2] {
        [
            (WITH_ID_FILE, self.with_id.as_str()),
            (WITHOUT_ID_FILE, self.without_id.as_str()),
        ]
    }
}

/// One record per `\n`-terminated line, fields in schema order, no header.
/// Absent fields are written empty; a field is quoted only when it contains
/// `|`, `"` or a line break.
pub fn serialize(records: &[Record]) -> std::io::Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for record in records {
        writer.write_record(record.fields.iter().map(|f| f.as_deref().unwrap_or("")))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write both blobs into `dir`, creating it if needed.
///
/// Each blob is staged in a temp file next to its target and renamed into
/// place only once both are on disk. If the second rename fails the first
/// output is removed again.
pub fn write_files(blobs: &Blobs, dir: &Path) -> Result<Vec<PathBuf>> {
    let write_err = |path: &Path, e: std::io::Error| PipelineError::Write {
        path: path.to_path_buf(),
        source: e,
    };

    std::fs::create_dir_all(dir).map_err(|e| write_err(dir, e))?;

    let mut staged = Vec::new();
    for (name, content) in blobs.entries() {
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_err(dir, e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| write_err(tmp.path(), e))?;
        staged.push((dir.join(name), tmp, content.len()));
    }

    let mut written: Vec<PathBuf> = Vec::new();
    for (path, tmp, bytes) in staged {
        if let Err(e) = tmp.persist(&path) {
            for done in &written {
                if let Err(cleanup) = std::fs::remove_file(done) {
                    tracing::warn!(
                        path = %done.display(),
                        error = %cleanup,
                        "failed to remove partial output"
                    );
                }
            }
            return Err(write_err(path.as_path(), e.error));
        }
        tracing::info!(path = %path.display(), bytes, "wrote output");
        written.push(path);
    }
    Ok(written)
}

/// Bundle both blobs into a single ZIP archive at `path`.
///
/// The archive is built in a temp file beside `path`; nothing appears at
/// `path` unless the archive was finished.
pub fn write_archive(blobs: &Blobs, path: &Path) -> Result<PathBuf> {
    let write_err = |e: std::io::Error| PipelineError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    let archive_err = |e: zip::result::ZipError| PipelineError::Archive {
        path: path.to_path_buf(),
        source: e,
    };

    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent).map_err(write_err)?;
            parent
        }
        None => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(parent).map_err(write_err)?;
    let mut zip = ZipWriter::new(tmp);

    for (name, content) in blobs.entries() {
        zip.start_file(name, SimpleFileOptions::default())
            .map_err(archive_err)?;
        zip.write_all(content.as_bytes()).map_err(write_err)?;
    }
    let tmp = zip.finish().map_err(archive_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    tracing::info!(path = %path.display(), "wrote archive");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Read;

    use super::*;
    use crate::models::FIELD_COUNT;

    fn record(line: u64, company: &str) -> Record {
        let mut fields = vec![None; FIELD_COUNT];
        fields[9] = Some(company.to_string());
        fields[16] = Some("01000".to_string());
        Record::new(line, fields)
    }

    fn partition() -> Partition {
        Partition {
            with_id: vec![record(1, "Shop Alpha (00123)")],
            without_id: vec![record(2, "Shop Beta"), record(3, "Shop Gamma")],
        }
    }

    #[test]
    fn test_serialize_keeps_field_count_and_order() {
        let out = serialize(&[record(1, "Shop Alpha (00123)")]).unwrap();
        assert_eq!(out, "|||||||||Shop Alpha (00123)|||||||01000|\n");
        assert_eq!(out.trim_end().split('|').count(), FIELD_COUNT);
    }

    #[test]
    fn test_serialize_quotes_embedded_delimiter() {
        let out = serialize(&[record(1, "A|B")]).unwrap();
        assert!(out.contains("|\"A|B\"|"));
    }

    #[test]
    fn test_serialize_empty_set() {
        assert_eq!(serialize(&[]).unwrap(), "");
    }

    #[test]
    fn test_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let blobs = Blobs::render(&partition()).unwrap();

        let written = write_files(&blobs, &out_dir).unwrap();
        assert_eq!(written.len(), 2);

        let with_id = std::fs::read_to_string(out_dir.join(WITH_ID_FILE)).unwrap();
        let without_id = std::fs::read_to_string(out_dir.join(WITHOUT_ID_FILE)).unwrap();
        assert_eq!(with_id.lines().count(), 1);
        assert_eq!(without_id.lines().count(), 2);
        assert!(without_id.starts_with("|||||||||Shop Beta|"));
    }

    #[test]
    fn test_write_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_ARCHIVE);
        let blobs = Blobs::render(&partition()).unwrap();

        write_archive(&blobs, &path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name(WITH_ID_FILE)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, blobs.with_id);

        content.clear();
        archive
            .by_name(WITHOUT_ID_FILE)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, blobs.without_id);
    }

    #[test]
    fn test_failed_second_write_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way of the second file makes its rename fail
        std::fs::create_dir(dir.path().join(WITHOUT_ID_FILE)).unwrap();
        let blobs = Blobs::render(&partition()).unwrap();

        let err = write_files(&blobs, dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Write { .. }));
        assert!(!dir.path().join(WITH_ID_FILE).exists());

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from(WITHOUT_ID_FILE)]);
    }

    #[test]
    fn test_failed_archive_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_ARCHIVE);
        std::fs::create_dir(&path).unwrap();
        let blobs = Blobs::render(&partition()).unwrap();

        let err = write_archive(&blobs, &path).unwrap_err();
        assert!(matches!(err, PipelineError::Write { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert!(path.is_dir());
    }
}
