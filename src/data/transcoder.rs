//! CSV to JSON row transcoding
//!
//! Every CSV row becomes an object keyed by fixed positional labels:
//! field 0 is `t`, fields 1..=8 are `y1`..`y8`. Short rows only carry the
//! labels they have values for; fields past the ninth are dropped.

use csv::{ReaderBuilder, StringRecord};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{CsvSyntaxError, DataError};

/// Positional labels, in output order
pub const LABELS: [&str; 9] = ["t", "y1", "y2", "y3", "y4", "y5", "y6", "y7", "y8"];

/// One CSV row keyed by [`LABELS`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowRecord {
    fields: Vec<(&'static str, String)>,
}

impl RowRecord {
    /// Pair labels with fields positionally, truncating to the shorter side
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let fields = LABELS
            .iter()
            .zip(fields)
            .map(|(label, value)| (*label, value.to_string()))
            .collect();
        Self { fields }
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (label, value) in &self.fields {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
impl RowRecord {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(l, _)| *l)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// `{"data": [...]}` in file row order
#[derive(Debug, Default, serde::Serialize, PartialEq, Eq)]
pub struct DataEnvelope {
    pub data: Vec<RowRecord>,
}

/// Transcode `filename` from the data directory.
///
/// Fails without partial output if the name is rejected, the file is missing
/// or unreadable, or any row fails to parse.
pub async fn transcode(dir: &Path, filename: &str) -> Result<DataEnvelope, DataError> {
    let path = resolve_data_file(dir, filename).await?;
    let content = fs::read(&path)
        .await
        .map_err(|e| DataError::from_io(path.clone(), filename, e))?;
    transcode_bytes(filename, &content)
}

/// Transcode in-memory CSV content. `name` is only used in errors.
///
/// A blank line becomes an empty record.
pub fn transcode_bytes(name: &str, content: &[u8]) -> Result<DataEnvelope, DataError> {
    let parse_error = |source| DataError::Parse {
        name: name.to_string(),
        source,
    };

    let mut builder = ReaderBuilder::new();
    builder.has_headers(false).flexible(true);

    let mut data = Vec::new();
    let mut record = StringRecord::new();
    for (line, raw) in split_records(content).map_err(parse_error)? {
        if raw.is_empty() {
            data.push(RowRecord::default());
            continue;
        }
        record.clear();
        builder
            .from_reader(raw)
            .read_record(&mut record)
            .map_err(|source| parse_error(CsvSyntaxError::Record { line, source }))?;
        data.push(RowRecord::from_fields(record.iter()));
    }

    Ok(DataEnvelope { data })
}

#[derive(Clone, Copy)]
enum ScanState {
    FieldStart,
    Unquoted,
    Quoted,
    /// Just saw a `"` inside a quoted field: either the close or half of `""`
    QuoteInQuoted,
}

/// Split `content` into raw records tagged with their starting line.
///
/// `\n`, `\r` and `\r\n` end a record unless inside a quoted field. A quote
/// only opens quoting at the start of a field. The trailing terminator does
/// not produce an extra record.
fn split_records(content: &[u8]) -> Result<Vec<(u64, &[u8])>, CsvSyntaxError> {
    let mut records = Vec::new();
    let mut state = ScanState::FieldStart;
    let mut start = 0;
    let mut line = 1;
    let mut record_line = 1;
    let mut quote_line = 1;

    let mut i = 0;
    while i < content.len() {
        let byte = content[i];
        if matches!(byte, b'\r' | b'\n') {
            let width = if byte == b'\r' && content.get(i + 1) == Some(&b'\n') {
                2
            } else {
                1
            };
            line += 1;
            if !matches!(state, ScanState::Quoted) {
                records.push((record_line, &content[start..i]));
                start = i + width;
                record_line = line;
                state = ScanState::FieldStart;
            }
            i += width;
            continue;
        }

        state = match (state, byte) {
            (ScanState::Quoted, b'"') => ScanState::QuoteInQuoted,
            (ScanState::Quoted, _) | (ScanState::QuoteInQuoted, b'"') => ScanState::Quoted,
            (ScanState::FieldStart, b'"') => {
                quote_line = line;
                ScanState::Quoted
            }
            (_, b',') => ScanState::FieldStart,
            _ => ScanState::Unquoted,
        };
        i += 1;
    }

    if matches!(state, ScanState::Quoted) {
        return Err(CsvSyntaxError::UnterminatedQuote { line: quote_line });
    }
    if start < content.len() {
        records.push((record_line, &content[start..]));
    }
    Ok(records)
}

/// Reject names that could leave the data directory
pub fn validate_filename(filename: &str) -> Result<(), DataError> {
    let invalid = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0']);
    if invalid {
        return Err(DataError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

/// Join `filename` onto `dir` and make sure the result stays inside `dir`
/// after symlinks are resolved.
async fn resolve_data_file(dir: &Path, filename: &str) -> Result<PathBuf, DataError> {
    validate_filename(filename)?;

    let path = dir.join(filename);
    let canonical_file = fs::canonicalize(&path)
        .await
        .map_err(|e| DataError::from_io(path.clone(), filename, e))?;
    let canonical_dir = fs::canonicalize(dir)
        .await
        .map_err(|source| DataError::Filesystem {
            path: dir.to_path_buf(),
            source,
        })?;

    if !canonical_file.starts_with(&canonical_dir) {
        tracing::warn!(
            file = %canonical_file.display(),
            "path traversal attempt blocked: {filename}"
        );
        return Err(DataError::InvalidFilename(filename.to_string()));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::WriteDataFile;

    fn rows(envelope: &DataEnvelope) -> String {
        serde_json::to_string(envelope).unwrap()
    }

    #[test]
    fn test_short_row_only_has_present_labels() {
        let envelope = transcode_bytes("a.csv", b"1,2,3\n").unwrap();
        assert_eq!(rows(&envelope), r#"{"data":[{"t":"1","y1":"2","y2":"3"}]}"#);
    }

    #[test]
    fn test_extra_fields_are_dropped() {
        let envelope = transcode_bytes("a.csv", b"0,1,2,3,4,5,6,7,8,9\n").unwrap();
        let record = &envelope.data[0];
        assert_eq!(record.len(), 9);
        assert_eq!(record.labels().collect::<Vec<_>>(), LABELS.to_vec());
        assert_eq!(record.get("y8"), Some("8"));
        assert!(!rows(&envelope).contains("\"9\""));
    }

    #[test]
    fn test_rows_keep_file_order() {
        let envelope = transcode_bytes("a.csv", b"0,10\n1,20\n").unwrap();
        assert_eq!(
            rows(&envelope),
            r#"{"data":[{"t":"0","y1":"10"},{"t":"1","y1":"20"}]}"#
        );
    }

    #[test]
    fn test_empty_content_yields_empty_data() {
        let envelope = transcode_bytes("empty.csv", b"").unwrap();
        assert!(envelope.data.is_empty());
        assert_eq!(rows(&envelope), r#"{"data":[]}"#);
    }

    #[test]
    fn test_first_row_is_data_not_header() {
        let envelope = transcode_bytes("a.csv", b"time,value\n0,1\n").unwrap();
        assert_eq!(envelope.data.len(), 2);
        assert_eq!(envelope.data[0].get("t"), Some("time"));
    }

    #[test]
    fn test_quoted_fields_and_whitespace_are_preserved() {
        let envelope = transcode_bytes("a.csv", b"\"1,5\", 2 \n").unwrap();
        let record = &envelope.data[0];
        assert_eq!(record.get("t"), Some("1,5"));
        assert_eq!(record.get("y1"), Some(" 2 "));
    }

    #[test]
    fn test_blank_lines_yield_empty_records() {
        let envelope = transcode_bytes("a.csv", b"0,1\n\n1,2\n").unwrap();
        assert_eq!(envelope.data.len(), 3);
        assert_eq!(envelope.data[1], RowRecord::default());
        assert_eq!(
            rows(&envelope),
            r#"{"data":[{"t":"0","y1":"1"},{},{"t":"1","y1":"2"}]}"#
        );
    }

    #[test]
    fn test_trailing_blank_line_is_a_record() {
        let envelope = transcode_bytes("a.csv", b"0,1\r\n\r\n").unwrap();
        assert_eq!(rows(&envelope), r#"{"data":[{"t":"0","y1":"1"},{}]}"#);
    }

    #[test]
    fn test_unterminated_quote_is_parse_error() {
        let err = transcode_bytes("bad.csv", b"0,\"unterminated\n1,2\n").unwrap_err();
        assert!(matches!(
            err,
            DataError::Parse {
                ref name,
                source: CsvSyntaxError::UnterminatedQuote { line: 1 },
            } if name == "bad.csv"
        ));
    }

    #[test]
    fn test_quoted_newline_and_escaped_quote() {
        let envelope = transcode_bytes("a.csv", b"0,\"say \"\"hi\"\"\nthere\"\n1,2\n").unwrap();
        assert_eq!(envelope.data.len(), 2);
        assert_eq!(envelope.data[0].get("y1"), Some("say \"hi\"\nthere"));
        assert_eq!(envelope.data[1].get("t"), Some("1"));
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        let envelope = transcode_bytes("a.csv", b"0,5\"\n1,2\n").unwrap();
        assert_eq!(envelope.data.len(), 2);
        assert_eq!(envelope.data[0].get("y1"), Some("5\""));
    }

    #[test]
    fn test_leading_bom_is_stripped() {
        let envelope = transcode_bytes("a.csv", b"\xef\xbb\xbf0,1\n").unwrap();
        assert_eq!(envelope.data[0].get("t"), Some("0"));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let err = transcode_bytes("bad.csv", b"0,1\n\xff\xfe,2\n").unwrap_err();
        assert!(matches!(
            err,
            DataError::Parse {
                ref name,
                source: CsvSyntaxError::Record { line: 2, .. },
            } if name == "bad.csv"
        ));
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("series.csv").is_ok());
        assert!(validate_filename("..hidden").is_ok());
        for bad in ["", ".", "..", "../secret.csv", "a/b.csv", "a\\b.csv", "a\0b"] {
            assert!(
                matches!(validate_filename(bad), Err(DataError::InvalidFilename(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_transcode_file() {
        let dir = tempfile::tempdir().unwrap();
        dir.write("series.csv", "0,10\n1,20\n");

        let envelope = transcode(dir.path(), "series.csv").await.unwrap();
        assert_eq!(envelope.data.len(), 2);
        assert_eq!(envelope.data[1].get("y1"), Some("20"));
    }

    #[tokio::test]
    async fn test_transcode_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = transcode(dir.path(), "missing.csv").await.unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_transcode_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let err = transcode(dir.path(), "../secret.csv").await.unwrap_err();
        assert!(matches!(err, DataError::InvalidFilename(_)));
    }

    #[tokio::test]
    async fn test_transcode_directory_is_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let err = transcode(dir.path(), "nested").await.unwrap_err();
        assert!(matches!(err, DataError::Filesystem { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_transcode_rejects_symlink_out_of_dir() {
        let outside = tempfile::tempdir().unwrap();
        let target = outside.write("secret.csv", "1,2\n");
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("link.csv")).unwrap();

        let err = transcode(dir.path(), "link.csv").await.unwrap_err();
        assert!(matches!(err, DataError::InvalidFilename(_)));
    }
}
