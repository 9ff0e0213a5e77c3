//! OpenCV-style matrix documents in YAML.
//!
//! OpenCV's `FileStorage` writes a matrix as a mapping tagged
//! `!!opencv-matrix` with `rows`, `cols`, `dt` and a flat row-major `data`
//! sequence, behind a `%YAML:1.0` line that is not a valid YAML directive.
//! [`YamlDialect`] carries the header and tag explicitly so nothing is
//! registered globally on the YAML library.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use serde_yaml::value::TaggedValue;

use crate::format::error::FormatError;

/// Header line written by OpenCV's `FileStorage`.
pub const OPENCV_HEADER: &str = "%YAML:1.0";

/// Tag OpenCV puts on matrix mappings (written as `!!opencv-matrix`).
pub const OPENCV_MATRIX_TAG: &str = "opencv-matrix";

/// Element type code for 32-bit floats.
pub const DTYPE_F32: &str = "f";

/// Element type codes accepted on import.
const SUPPORTED_DTYPES: &[&str] = &[DTYPE_F32, "d"];

/// Keys every matrix mapping must carry.
const MATRIX_KEYS: &[&str] = &["rows", "cols", "dt", "data"];

/// Serialization settings for the matrix YAML dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlDialect {
    /// Line written before the document, followed by a blank line.
    pub header: Option<String>,
    /// Secondary tag put on the matrix mapping, without the `!!` prefix.
    pub matrix_tag: Option<String>,
}

impl YamlDialect {
    /// The layout OpenCV writes: `%YAML:1.0` header and `!!opencv-matrix` tag.
    pub fn opencv() -> Self {
        Self {
            header: Some(OPENCV_HEADER.to_string()),
            matrix_tag: Some(OPENCV_MATRIX_TAG.to_string()),
        }
    }

    /// Plain YAML without header or tag.
    pub fn plain() -> Self {
        Self {
            header: None,
            matrix_tag: None,
        }
    }

    /// Set the header line.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Set the matrix tag.
    pub fn with_matrix_tag(mut self, tag: impl Into<String>) -> Self {
        self.matrix_tag = Some(tag.into());
        self
    }
}

impl Default for YamlDialect {
    fn default() -> Self {
        Self::opencv()
    }
}

/// A dense 2D matrix stored flat in row-major order.
///
/// Values are held as f64 whatever `dt` says, so frame numbers above 2^24
/// and `d` matrices survive a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixBody {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Element type code (`f` for f32).
    pub dt: String,
    /// Row-major values, `rows * cols` long.
    pub data: Vec<f64>,
}

impl MatrixBody {
    /// Build an `f` matrix and check that its metadata matches the buffer.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, FormatError> {
        let body = Self {
            rows,
            cols,
            dt: DTYPE_F32.to_string(),
            data,
        };
        body.validate()?;
        Ok(body)
    }

    /// Check the marker layout and buffer length.
    ///
    /// Column 0 is the frame index and every marker takes two columns, so
    /// `cols` has to be odd.
    pub fn validate(&self) -> Result<(), FormatError> {
        if !SUPPORTED_DTYPES.contains(&self.dt.as_str()) {
            return Err(FormatError::invalid_format(format!(
                "unsupported matrix element type '{}'",
                self.dt
            )));
        }

        if self.cols % 2 == 0 {
            return Err(FormatError::invalid_format(format!(
                "expected an odd column count (frame + x/y per marker), got {}",
                self.cols
            )));
        }

        let expected = self.rows.checked_mul(self.cols).ok_or_else(|| {
            FormatError::invalid_format(format!(
                "matrix size {}x{} overflows",
                self.rows, self.cols
            ))
        })?;

        if self.data.len() != expected {
            return Err(FormatError::invalid_format(format!(
                "matrix declares {}x{} = {} values but data holds {}",
                self.rows,
                self.cols,
                expected,
                self.data.len()
            )));
        }

        Ok(())
    }

    /// Number of markers (column pairs after the frame column).
    pub fn marker_count(&self) -> usize {
        self.cols.saturating_sub(1) / 2
    }

    /// Reshape the flat buffer into a `rows x cols` array.
    pub fn to_array(&self) -> Result<Array2<f64>, FormatError> {
        self.validate()?;
        Ok(Array2::from_shape_vec(
            (self.rows, self.cols),
            self.data.clone(),
        )?)
    }
}

/// Top-level document: a single matrix under the key `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixDocument {
    /// The matrix.
    pub data: MatrixBody,
}

impl MatrixDocument {
    /// Wrap a matrix.
    pub fn new(data: MatrixBody) -> Self {
        Self { data }
    }

    /// Serialize using the given dialect.
    pub fn to_yaml(&self, dialect: &YamlDialect) -> Result<String, FormatError> {
        self.data.validate()?;

        let body = serde_yaml::to_string(&self.data)?;
        let mut out = String::with_capacity(body.len() + 64);

        if let Some(header) = &dialect.header {
            out.push_str(header);
            out.push_str("\n\n");
        }

        match &dialect.matrix_tag {
            Some(tag) => out.push_str(&format!("data: !!{}\n", tag)),
            None => out.push_str("data:\n"),
        }

        for line in body.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }

        Ok(out)
    }

    /// Parse and validate a matrix document.
    ///
    /// A first line starting with `%` is skipped. The matrix mapping is
    /// accepted with or without a tag; a tag other than the dialect's is
    /// logged and otherwise ignored.
    pub fn from_yaml(text: &str, dialect: &YamlDialect) -> Result<Self, FormatError> {
        let text = strip_header(text);
        let root: Value = serde_yaml::from_str(text)?;

        let matrix = root
            .get("data")
            .cloned()
            .ok_or_else(|| FormatError::missing_field("data"))?;

        let matrix = match matrix {
            Value::Tagged(tagged) => {
                let TaggedValue { tag, value } = *tagged;
                let tag = tag.to_string();
                match &dialect.matrix_tag {
                    Some(expected) if !tag.ends_with(expected.as_str()) => {
                        log::warn!(
                            "Matrix tagged {} instead of !!{}, reading it anyway",
                            tag,
                            expected
                        );
                    }
                    _ => log::debug!("Matrix tag: {}", tag),
                }
                value
            }
            other => other,
        };

        let Value::Mapping(mapping) = &matrix else {
            return Err(FormatError::invalid_format(
                "'data' must be a mapping with rows, cols, dt and data",
            ));
        };

        for key in MATRIX_KEYS {
            if !mapping.contains_key(*key) {
                return Err(FormatError::missing_field(format!("data.{}", key)));
            }
        }

        let body: MatrixBody = serde_yaml::from_value(matrix)?;
        body.validate()?;

        log::debug!(
            "Parsed {}x{} matrix (dt={}, {} markers)",
            body.rows,
            body.cols,
            body.dt,
            body.marker_count()
        );

        Ok(Self { data: body })
    }
}

/// Drop a leading `%...` line, which YAML parsers reject.
fn strip_header(text: &str) -> &str {
    if !text.starts_with('%') {
        return text;
    }
    match text.find('\n') {
        Some(idx) => &text[idx + 1..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatrixBody {
        MatrixBody::new(2, 3, vec![0.0, 1.0, 2.0, 5.0, -1.0, -1.0]).unwrap()
    }

    #[test]
    fn test_opencv_layout() {
        let yaml = MatrixDocument::new(sample())
            .to_yaml(&YamlDialect::opencv())
            .unwrap();

        assert!(yaml.starts_with("%YAML:1.0\n\ndata: !!opencv-matrix\n"));
        assert!(yaml.contains("  rows: 2\n"));
        assert!(yaml.contains("  cols: 3\n"));
    }

    #[test]
    fn test_plain_layout_has_no_header_or_tag() {
        let yaml = MatrixDocument::new(sample())
            .to_yaml(&YamlDialect::plain())
            .unwrap();

        assert!(yaml.starts_with("data:\n"));
        assert!(!yaml.contains('%'));
        assert!(!yaml.contains("!!"));
    }

    #[test]
    fn test_parse_tagged_and_untagged() {
        let dialect = YamlDialect::opencv();
        let tagged = MatrixDocument::new(sample()).to_yaml(&dialect).unwrap();
        let plain = MatrixDocument::new(sample())
            .to_yaml(&YamlDialect::plain())
            .unwrap();

        let a = MatrixDocument::from_yaml(&tagged, &dialect).unwrap();
        let b = MatrixDocument::from_yaml(&plain, &dialect).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.data, sample());
    }

    #[test]
    fn test_parse_opencv_written_file() {
        let text = "%YAML:1.0\n---\ndata: !!opencv-matrix\n   rows: 1\n   cols: 3\n   dt: f\n   data: [ 0.0, 1.5, 2.5 ]\n";
        let doc = MatrixDocument::from_yaml(text, &YamlDialect::opencv()).unwrap();

        assert_eq!(doc.data.rows, 1);
        assert_eq!(doc.data.data, vec![0.0, 1.5, 2.5]);
    }

    #[test]
    fn test_integer_values_accepted() {
        let text = "data:\n  rows: 1\n  cols: 3\n  dt: f\n  data: [0, 10, 20]\n";
        let doc = MatrixDocument::from_yaml(text, &YamlDialect::plain()).unwrap();
        assert_eq!(doc.data.data, vec![0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_double_values_keep_precision() {
        let text = "data:\n  rows: 1\n  cols: 3\n  dt: d\n  data: [16777217, 0.1, 2.5]\n";
        let doc = MatrixDocument::from_yaml(text, &YamlDialect::plain()).unwrap();
        assert_eq!(doc.data.data, vec![16_777_217.0, 0.1, 2.5]);
    }

    #[test]
    fn test_custom_dialect() {
        let dialect = YamlDialect::plain()
            .with_header("%YAML:1.1")
            .with_matrix_tag("gt-matrix");
        let yaml = MatrixDocument::new(sample()).to_yaml(&dialect).unwrap();

        assert!(yaml.starts_with("%YAML:1.1\n\ndata: !!gt-matrix\n"));

        let doc = MatrixDocument::from_yaml(&yaml, &dialect).unwrap();
        assert_eq!(doc.data, sample());

        let doc = MatrixDocument::from_yaml(&yaml, &YamlDialect::opencv()).unwrap();
        assert_eq!(doc.data, sample());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let text = "data:\n  rows: 2\n  cols: 3\n  dt: f\n  data: [0, 1, 2]\n";
        let err = MatrixDocument::from_yaml(text, &YamlDialect::plain()).unwrap_err();
        assert!(matches!(err, FormatError::InvalidFormat { .. }));
    }

    #[test]
    fn test_even_cols_rejected() {
        let err = MatrixBody::new(1, 4, vec![0.0; 4]).unwrap_err();
        assert!(matches!(err, FormatError::InvalidFormat { .. }));
    }

    #[test]
    fn test_missing_keys_reported() {
        let err = MatrixDocument::from_yaml("other: 1\n", &YamlDialect::plain()).unwrap_err();
        assert!(matches!(err, FormatError::MissingField { ref field } if field == "data"));

        let text = "data:\n  rows: 0\n  cols: 1\n  data: []\n";
        let err = MatrixDocument::from_yaml(text, &YamlDialect::plain()).unwrap_err();
        assert!(matches!(err, FormatError::MissingField { ref field } if field == "data.dt"));
    }

    #[test]
    fn test_unsupported_dtype_rejected() {
        let text = "data:\n  rows: 1\n  cols: 1\n  dt: u\n  data: [3]\n";
        let err = MatrixDocument::from_yaml(text, &YamlDialect::plain()).unwrap_err();
        assert!(matches!(err, FormatError::InvalidFormat { .. }));
    }

    #[test]
    fn test_to_array_reshapes_row_major() {
        let array = sample().to_array().unwrap();
        assert_eq!(array.dim(), (2, 3));
        assert_eq!(array[[1, 0]], 5.0);
        assert_eq!(array[[0, 2]], 2.0);
    }

    #[test]
    fn test_strip_header() {
        assert_eq!(strip_header("%YAML:1.0\n\nx: 1"), "\nx: 1");
        assert_eq!(strip_header("x: 1"), "x: 1");
        assert_eq!(strip_header("%only"), "");
    }
}
