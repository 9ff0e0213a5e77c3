//! Trait definitions for annotation format implementations.

use std::path::{Path, PathBuf};

use crate::format::error::FormatError;
use crate::format::matrix::YamlDialect;
use crate::model::TaskData;

/// Default label given to imported tracks.
pub const DEFAULT_TRACK_LABEL: &str = "Control Point";

/// Default name of the YAML file inside an export archive.
pub const DEFAULT_GROUND_TRUTH_FILE: &str = "groundTruth.yaml";

/// Trait for annotation format import/export implementations.
pub trait AnnotationFormat: Send + Sync {
    /// Unique identifier for this format (e.g., "isi").
    fn id(&self) -> &'static str;

    /// Human-readable name for UI display.
    fn display_name(&self) -> &'static str;

    /// Format version string.
    fn version(&self) -> &'static str;

    /// Extension of the file produced by [`AnnotationFormat::export`].
    fn export_extension(&self) -> &'static str;

    /// File extensions accepted by [`AnnotationFormat::import`].
    fn import_extensions(&self) -> &[&'static str];

    /// Export the task's annotations to `path`.
    fn export(
        &self,
        data: &TaskData,
        path: &Path,
        options: &ExportOptions,
    ) -> Result<ExportResult, FormatError>;

    /// Import annotations from `path` into `data`.
    fn import(
        &self,
        path: &Path,
        data: &mut TaskData,
        options: &ImportOptions,
    ) -> Result<ImportResult, FormatError>;
}

/// Options for export operations.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// YAML layout to write.
    pub dialect: YamlDialect,

    /// Name of the YAML file inside the archive.
    pub file_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            dialect: YamlDialect::default(),
            file_name: DEFAULT_GROUND_TRUTH_FILE.to_string(),
        }
    }
}

impl ExportOptions {
    /// Create new export options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the YAML dialect.
    pub fn dialect(mut self, dialect: YamlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the file name used inside the archive.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }
}

/// Options for import operations.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// YAML layout expected in the input.
    pub dialect: YamlDialect,

    /// Label assigned to every imported track.
    pub track_label: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            dialect: YamlDialect::default(),
            track_label: DEFAULT_TRACK_LABEL.to_string(),
        }
    }
}

impl ImportOptions {
    /// Create new import options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the YAML dialect.
    pub fn dialect(mut self, dialect: YamlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the label for imported tracks.
    pub fn track_label(mut self, label: impl Into<String>) -> Self {
        self.track_label = label.into();
        self
    }
}

/// Result of an export operation.
#[derive(Debug, Default)]
pub struct ExportResult {
    /// Number of keyframe rows written.
    pub keyframes_exported: usize,

    /// Number of tracks (markers) written.
    pub tracks_exported: usize,

    /// Warnings generated during export.
    pub warnings: Vec<FormatWarning>,

    /// Files created during export.
    pub files_created: Vec<PathBuf>,
}

impl ExportResult {
    /// Create a new export result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the result.
    pub fn add_warning(&mut self, warning: FormatWarning) {
        self.warnings.push(warning);
    }

    /// Check if there were any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Result of an import operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportResult {
    /// Number of tracks submitted to the task.
    pub tracks_imported: usize,

    /// Number of shapes across those tracks.
    pub shapes_imported: usize,
}

/// Warning generated during format conversion.
#[derive(Debug, Clone)]
pub struct FormatWarning {
    /// Frame this warning relates to (if applicable).
    pub frame: Option<u32>,

    /// Human-readable warning message.
    pub message: String,
}

impl FormatWarning {
    /// Create a new warning.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            frame: None,
            message: message.into(),
        }
    }

    /// Set the frame this warning relates to.
    pub fn with_frame(mut self, frame: u32) -> Self {
        self.frame = Some(frame);
        self
    }
}
