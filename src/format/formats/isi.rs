//! ISI ground-truth format implementation.
//!
//! Tracked control points are stored as one OpenCV-style matrix: a row per
//! keyframe, column 0 holding the frame number and an `(x, y)` column pair
//! per marker. `(-1, -1)` marks a marker occluded at that frame. Export
//! produces a ZIP holding `groundTruth.yaml`; import reads the YAML directly.

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use ndarray::Array2;

use crate::format::archive::make_zip_archive;
use crate::format::error::FormatError;
use crate::format::matrix::{MatrixBody, MatrixDocument};
use crate::format::traits::{
    AnnotationFormat, ExportOptions, ExportResult, FormatWarning, ImportOptions, ImportResult,
};
use crate::model::{ShapeType, TaskData, Track, TrackSource, TrackedShape};

/// Coordinate written for both x and y of an occluded marker.
pub const OCCLUDED_SENTINEL: f64 = -1.0;

/// ISI ground-truth format.
///
/// Supports:
/// - Point tracks (first (x, y) pair of each shape)
/// - Occlusion via the `(-1, -1)` sentinel
///
/// Does not support:
/// - The `outside` flag (never written, always `false` on import)
/// - Track labels or attributes (imported tracks get one fixed label)
/// - Non-keyframe frames (skipped on export)
pub struct IsiFormat;

impl IsiFormat {
    /// Build the keyframe matrix for a task.
    ///
    /// A frame contributes a row only when its first shape is a keyframe.
    pub fn build_matrix(
        &self,
        data: &TaskData,
        result: &mut ExportResult,
    ) -> Result<MatrixBody, FormatError> {
        let nb_tracks = data.track_count();
        let cols = 1 + 2 * nb_tracks;
        let mut rows = 0;
        let mut buffer = Vec::new();

        for frame_annotation in data.group_by_frame() {
            let Some(first) = frame_annotation.labeled_shapes.first() else {
                continue;
            };
            if !first.keyframe {
                log::trace!("Skipping non-keyframe frame {}", frame_annotation.frame);
                continue;
            }

            buffer.push(f64::from(frame_annotation.frame));
            rows += 1;

            for shape in &frame_annotation.labeled_shapes {
                if shape.outside {
                    log::warn!(
                        "Track {} is outside at frame {}; ISI has no outside flag",
                        shape.track_id,
                        shape.frame
                    );
                    result.add_warning(
                        FormatWarning::new(format!(
                            "Outside flag of track {} not exported",
                            shape.track_id
                        ))
                        .with_frame(shape.frame),
                    );
                }

                if shape.occluded {
                    buffer.extend_from_slice(&[OCCLUDED_SENTINEL, OCCLUDED_SENTINEL]);
                    continue;
                }

                let Some((x, y)) = shape.first_point() else {
                    return Err(FormatError::invalid_coordinates(format!(
                        "{} shape of track {} at frame {} has {} coordinates, need 2",
                        shape.shape_type.name(),
                        shape.track_id,
                        shape.frame,
                        shape.points.len()
                    )));
                };
                buffer.extend_from_slice(&[f64::from(x), f64::from(y)]);
            }
        }

        log::debug!("ISI matrix: {} rows x {} cols", rows, cols);

        MatrixBody::new(rows, cols, buffer)
    }

    /// Export a task as a ZIP archive written to `writer`.
    ///
    /// The YAML file is staged in a temporary directory which is removed
    /// when this returns, on success or failure.
    pub fn export_to_writer<W: Write + Seek>(
        &self,
        data: &TaskData,
        writer: W,
        options: &ExportOptions,
    ) -> Result<ExportResult, FormatError> {
        let mut result = ExportResult::new();
        let matrix = self.build_matrix(data, &mut result)?;
        result.keyframes_exported = matrix.rows;
        result.tracks_exported = matrix.marker_count();

        let yaml = MatrixDocument::new(matrix).to_yaml(&options.dialect)?;

        let temp_dir = tempfile::tempdir()?;
        std::fs::write(temp_dir.path().join(&options.file_name), yaml)?;
        make_zip_archive(temp_dir.path(), writer)?;

        Ok(result)
    }

    /// Import an ISI YAML document from any reader into `data`.
    pub fn import_from_reader<R: Read>(
        &self,
        mut reader: R,
        data: &mut TaskData,
        options: &ImportOptions,
    ) -> Result<ImportResult, FormatError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let document = MatrixDocument::from_yaml(&text, &options.dialect)?;
        let tracks = tracks_from_matrix(&document.data, &options.track_label)?;

        let mut result = ImportResult::default();
        for track in tracks {
            result.tracks_imported += 1;
            result.shapes_imported += track.shapes.len();
            data.add_track(track);
        }

        Ok(result)
    }
}

impl AnnotationFormat for IsiFormat {
    fn id(&self) -> &'static str {
        "isi"
    }

    fn display_name(&self) -> &'static str {
        "ISI"
    }

    fn version(&self) -> &'static str {
        "1.0"
    }

    fn export_extension(&self) -> &'static str {
        "zip"
    }

    fn import_extensions(&self) -> &[&'static str] {
        &["yaml", "yml"]
    }

    fn export(
        &self,
        data: &TaskData,
        path: &Path,
        options: &ExportOptions,
    ) -> Result<ExportResult, FormatError> {
        log::info!("Exporting ISI ground truth to {:?}", path);

        // The destination is only touched once the archive is complete.
        let mut archive = Cursor::new(Vec::new());
        let mut result = self.export_to_writer(data, &mut archive, options)?;
        std::fs::write(path, archive.into_inner())?;
        result.files_created.push(path.to_path_buf());

        log::info!(
            "Exported {} tracks over {} keyframes ({} warnings)",
            result.tracks_exported,
            result.keyframes_exported,
            result.warnings.len()
        );

        Ok(result)
    }

    fn import(
        &self,
        path: &Path,
        data: &mut TaskData,
        options: &ImportOptions,
    ) -> Result<ImportResult, FormatError> {
        log::info!("Importing ISI ground truth from {:?}", path);

        let file = File::open(path)?;
        let result = self.import_from_reader(file, data, options)?;

        log::info!(
            "Imported {} tracks with {} shapes",
            result.tracks_imported,
            result.shapes_imported
        );

        Ok(result)
    }
}

/// Rebuild one track per marker column pair.
fn tracks_from_matrix(matrix: &MatrixBody, label: &str) -> Result<Vec<Track>, FormatError> {
    let array: Array2<f64> = matrix.to_array()?;
    let frames = array
        .column(0)
        .iter()
        .map(|&value| frame_index(value))
        .collect::<Result<Vec<_>, _>>()?;

    let mut tracks = Vec::with_capacity(matrix.marker_count());
    for marker_idx in 0..matrix.marker_count() {
        let x_col = 1 + 2 * marker_idx;
        let y_col = x_col + 1;

        let shapes = array
            .rows()
            .into_iter()
            .zip(&frames)
            .map(|(row, &frame)| {
                let (x, y) = (row[x_col], row[y_col]);
                TrackedShape {
                    shape_type: ShapeType::Points,
                    frame,
                    points: vec![x as f32, y as f32],
                    occluded: is_occluded(x, y),
                    outside: false,
                    keyframe: true,
                    attributes: Vec::new(),
                    track_id: marker_idx,
                }
            })
            .collect();

        tracks.push(Track {
            label: label.to_string(),
            group: 0,
            source: TrackSource::Imported,
            shapes,
        });
    }

    Ok(tracks)
}

fn is_occluded(x: f64, y: f64) -> bool {
    x == OCCLUDED_SENTINEL && y == OCCLUDED_SENTINEL
}

fn frame_index(value: f64) -> Result<u32, FormatError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(FormatError::invalid_coordinates(format!(
            "frame index must be a non-negative integer, got {}",
            value
        )));
    }
    Ok(value as u32)
}
