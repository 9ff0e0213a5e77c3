//! Annotation format import/export system.
//!
//! Formats implement the [`AnnotationFormat`] trait and are looked up through
//! a [`FormatRegistry`]. Exporters read a [`TaskData`](crate::model::TaskData)
//! frame by frame; importers push reconstructed tracks back into it.
//!
//! ## Supported Formats
//!
//! - **ISI**: OpenCV-matrix YAML ground truth for tracked control points
//!
//! ## Usage
//!
//! ```rust,ignore
//! use isi_gt::format::{ExportOptions, FormatRegistry};
//!
//! let registry = FormatRegistry::new();
//! let format = registry.get("isi").unwrap();
//! let result = format.export(&task, path, &ExportOptions::default())?;
//! ```

mod archive;
mod error;
pub mod formats;
mod matrix;
mod registry;
mod traits;

pub use archive::{make_zip_archive, read_zip_entry};
pub use error::FormatError;
pub use matrix::{
    DTYPE_F32, MatrixBody, MatrixDocument, OPENCV_HEADER, OPENCV_MATRIX_TAG, YamlDialect,
};
pub use registry::FormatRegistry;
pub use traits::{
    AnnotationFormat, DEFAULT_GROUND_TRUTH_FILE, DEFAULT_TRACK_LABEL, ExportOptions, ExportResult,
    FormatWarning, ImportOptions, ImportResult,
};
