//! CSV rows keyed by header name

use csv::StringRecord;
use std::collections::HashMap;

use super::ImportError;

/// One CSV record zipped with the header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// 1-based line the record starts on
    pub line: u64,
    fields: HashMap<String, String>,
}

impl ImportRow {
    /// Zip `record` with `headers`. A record whose field count differs from
    /// the header is rejected.
    pub fn from_record(
        headers: &StringRecord,
        record: &StringRecord,
        line: u64,
    ) -> Result<Self, ImportError> {
        if record.len() != headers.len() {
            return Err(ImportError::MalformedRow {
                line,
                expected: headers.len(),
                found: record.len(),
            });
        }

        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.trim().to_string(), value.to_string()))
            .collect();

        Ok(Self { line, fields })
    }

    /// The `title` column, empty if blank
    pub fn title(&self) -> &str {
        self.fields.get("title").map(String::as_str).unwrap_or("")
    }

    /// Value of `column` if the column exists and the value is non-empty
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> StringRecord {
        StringRecord::from(vec!["title", "slug", "body"])
    }

    #[test]
    fn test_zip_with_header() {
        let record = StringRecord::from(vec!["Hello", "hello-world", ""]);
        let row = ImportRow::from_record(&headers(), &record, 2).unwrap();

        assert_eq!(row.title(), "Hello");
        assert_eq!(row.get("slug"), Some("hello-world"));
        assert_eq!(row.get("body"), None);
        assert_eq!(row.get("author"), None);
    }

    #[test]
    fn test_empty_title_is_kept() {
        let record = StringRecord::from(vec!["", "x", "y"]);
        let row = ImportRow::from_record(&headers(), &record, 2).unwrap();
        assert_eq!(row.title(), "");
    }

    #[test]
    fn test_header_names_are_trimmed() {
        let headers = StringRecord::from(vec!["title", " slug "]);
        let record = StringRecord::from(vec!["Hello", "hello"]);
        let row = ImportRow::from_record(&headers, &record, 2).unwrap();
        assert_eq!(row.get("slug"), Some("hello"));
    }

    #[test]
    fn test_short_record_is_malformed() {
        let record = StringRecord::from(vec!["Hello"]);
        let err = ImportRow::from_record(&headers(), &record, 5).unwrap_err();

        match err {
            ImportError::MalformedRow {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 5);
                assert_eq!(expected, 3);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_long_record_is_malformed() {
        let record = StringRecord::from(vec!["a", "b", "c", "d"]);
        assert!(ImportRow::from_record(&headers(), &record, 2).is_err());
    }
}
