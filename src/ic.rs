//! The information content table of GO terms
//!
//! Information content (IC) is a precomputed specificity score per GO
//! term: the higher the value, the more specific and informative the
//! term. The table is loaded once from a tab-separated file and shared
//! read-only by every scoring task.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::term::GoTermId;
use crate::{OrthoError, OrthoResult};

/// Mapping from [`GoTermId`] to its information content
///
/// Immutable once loaded. Terms missing from the table have an information
/// content of 0 and therefore never pass the IC threshold filter.
#[derive(Debug, Default, Clone)]
pub struct InformationContent {
    inner: HashMap<GoTermId, f64>,
}

impl InformationContent {
    /// Loads the table from a tab-separated file
    ///
    /// The header row must contain columns named `t` (term id) and `ic`
    /// (information content); any other columns, such as a term frequency,
    /// are ignored. Files ending in `.gz` are decompressed on the fly.
    ///
    /// # Errors
    ///
    /// - [`OrthoError::CannotOpenFile`]: the file is not present or unreadable
    /// - [`OrthoError::DataFormat`]: required columns are missing or a row
    ///   contains an unparseable or negative value
    pub fn from_file<P: AsRef<Path>>(path: P) -> OrthoResult<Self> {
        let filename = path.as_ref().display().to_string();
        let file =
            File::open(path.as_ref()).map_err(|_| OrthoError::CannotOpenFile(filename))?;
        if path.as_ref().extension().is_some_and(|ext| ext == "gz") {
            Self::from_reader(BufReader::new(GzDecoder::new(file)))
        } else {
            Self::from_reader(BufReader::new(file))
        }
    }

    /// Loads the table from any buffered reader of tab-separated rows
    ///
    /// # Errors
    ///
    /// See [`InformationContent::from_file`]
    pub fn from_reader<R: BufRead>(reader: R) -> OrthoResult<Self> {
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line.map_err(|e| OrthoError::DataFormat(e.to_string()))?,
            None => {
                return Err(OrthoError::DataFormat(
                    "information content table is empty".to_string(),
                ))
            }
        };
        let (term_col, ic_col) = header_columns(&header)?;

        let mut inner = HashMap::new();
        for line in lines {
            let line = line.map_err(|e| OrthoError::DataFormat(e.to_string()))?;
            if line.is_empty() {
                continue;
            }
            let cols: Vec<&str> = line.split('\t').collect();
            let term = column(&cols, term_col, &line)?;
            let value = column(&cols, ic_col, &line)?;

            let term = GoTermId::try_from(term)
                .map_err(|_| OrthoError::DataFormat(format!("invalid term id in: {line}")))?;
            let value: f64 = value
                .parse()
                .map_err(|_| OrthoError::DataFormat(format!("invalid ic value in: {line}")))?;
            if value < 0.0 || !value.is_finite() {
                return Err(OrthoError::DataFormat(format!(
                    "information content must be a non-negative number: {line}"
                )));
            }
            inner.insert(term, value);
        }
        Ok(Self { inner })
    }

    /// The information content of a term, 0.0 when the term is unknown
    pub fn get(&self, term: GoTermId) -> f64 {
        self.inner.get(&term).copied().unwrap_or(0.0)
    }

    /// Returns `true` if the term has an entry in the table
    pub fn contains(&self, term: GoTermId) -> bool {
        self.inner.contains_key(&term)
    }

    /// The number of terms in the table
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates all (term, ic) entries in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (GoTermId, f64)> + '_ {
        self.inner.iter().map(|(term, ic)| (*term, *ic))
    }
}

impl FromIterator<(GoTermId, f64)> for InformationContent {
    fn from_iter<I: IntoIterator<Item = (GoTermId, f64)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

/// Locates the `t` and `ic` columns in the header row
fn header_columns(header: &str) -> OrthoResult<(usize, usize)> {
    let mut term_col = None;
    let mut ic_col = None;
    for (idx, name) in header.trim_end().split('\t').enumerate() {
        match name {
            "t" => term_col = Some(idx),
            "ic" => ic_col = Some(idx),
            _ => {}
        }
    }
    match (term_col, ic_col) {
        (Some(t), Some(ic)) => Ok((t, ic)),
        _ => Err(OrthoError::DataFormat(
            "information content table requires 't' and 'ic' columns".to_string(),
        )),
    }
}

fn column<'a>(cols: &[&'a str], idx: usize, line: &str) -> OrthoResult<&'a str> {
    cols.get(idx)
        .copied()
        .ok_or_else(|| OrthoError::DataFormat(format!("row has too few columns: {line}")))
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn parse_simple_table() {
        let data = "t\tic\n8150\t1.5\n16265\t7.25\n";
        let ic = InformationContent::from_reader(data.as_bytes()).unwrap();
        assert_eq!(ic.len(), 2);
        assert!((ic.get(8150u32.into()) - 1.5).abs() < f64::EPSILON);
        assert!((ic.get(16265u32.into()) - 7.25).abs() < f64::EPSILON);
    }

    #[test]
    fn absent_terms_default_to_zero() {
        let data = "t\tic\n8150\t1.5\n";
        let ic = InformationContent::from_reader(data.as_bytes()).unwrap();
        assert!(!ic.contains(9999u32.into()));
        assert!(ic.get(9999u32.into()).abs() < f64::EPSILON);
    }

    #[test]
    fn frequency_column_is_ignored() {
        let data = "t\tfreq\tic\n8150\t123\t1.5\n";
        let ic = InformationContent::from_reader(data.as_bytes()).unwrap();
        assert_eq!(ic.len(), 1);
        assert!((ic.get(8150u32.into()) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn column_order_comes_from_header() {
        let data = "ic\tt\n1.5\t8150\n";
        let ic = InformationContent::from_reader(data.as_bytes()).unwrap();
        assert!((ic.get(8150u32.into()) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_columns_fail() {
        let data = "term\tvalue\n8150\t1.5\n";
        let err = InformationContent::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, OrthoError::DataFormat(_)));
    }

    #[test]
    fn empty_input_fails() {
        let err = InformationContent::from_reader("".as_bytes()).unwrap_err();
        assert!(matches!(err, OrthoError::DataFormat(_)));
    }

    #[test]
    fn negative_ic_fails() {
        let data = "t\tic\n8150\t-1.0\n";
        assert!(InformationContent::from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn invalid_value_fails() {
        let data = "t\tic\n8150\tabc\n";
        assert!(InformationContent::from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn gzipped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ic.tsv.gz");
        let file = File::create(&path).unwrap();
        let mut encoder =
            flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(b"t\tic\n8150\t1.5\n").unwrap();
        encoder.finish().unwrap();

        let ic = InformationContent::from_file(&path).unwrap();
        assert!((ic.get(8150u32.into()) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_fails() {
        let err = InformationContent::from_file("does/not/exist.tsv").unwrap_err();
        assert!(matches!(err, OrthoError::CannotOpenFile(_)));
    }
}
