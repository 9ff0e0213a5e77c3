//! Host-side task view consumed by exporters and filled by importers.

use std::collections::BTreeSet;

use super::track::{ShapeType, Track, TrackedShape};

/// A track's shape as seen from a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledShape {
    /// Shape kind.
    pub shape_type: ShapeType,
    /// Frame number.
    pub frame: u32,
    /// Label of the owning track.
    pub label: String,
    /// Flat coordinate list.
    pub points: Vec<f32>,
    /// The object is hidden at this frame.
    pub occluded: bool,
    /// The object has left the frame.
    pub outside: bool,
    /// Position was explicitly authored.
    pub keyframe: bool,
    /// Index of the owning track.
    pub track_id: usize,
}

impl LabeledShape {
    /// First (x, y) pair, if the shape has one.
    pub fn first_point(&self) -> Option<(f32, f32)> {
        match self.points.as_slice() {
            [x, y, ..] => Some((*x, *y)),
            _ => None,
        }
    }

    fn from_tracked(track_id: usize, label: &str, shape: &TrackedShape) -> Self {
        Self {
            shape_type: shape.shape_type,
            frame: shape.frame,
            label: label.to_string(),
            points: shape.points.clone(),
            occluded: shape.occluded,
            outside: shape.outside,
            keyframe: shape.keyframe,
            track_id,
        }
    }
}

/// All shapes present at one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnnotation {
    /// Frame number.
    pub frame: u32,
    /// Shapes at this frame, ordered by track index.
    pub labeled_shapes: Vec<LabeledShape>,
}

/// Annotation data of a single task.
///
/// Formats read it through [`TaskData::group_by_frame`] when exporting and
/// push reconstructed tracks through [`TaskData::add_track`] when importing.
#[derive(Debug, Clone, Default)]
pub struct TaskData {
    tracks: Vec<Track>,
}

impl TaskData {
    /// Create an empty task.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a track. Tracks are not touched after submission.
    pub fn add_track(&mut self, track: Track) {
        log::debug!(
            "TaskData::add_track: label={:?}, {} shapes",
            track.label,
            track.shapes.len()
        );
        self.tracks.push(track);
    }

    /// All tracks in submission order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Total number of shapes across all tracks.
    pub fn total_shapes(&self) -> usize {
        self.tracks.iter().map(|t| t.shapes.len()).sum()
    }

    /// Per-frame view over every track.
    ///
    /// Frames are those where at least one track has a recorded shape, in
    /// ascending order; within a frame, shapes are ordered by track index.
    /// A track contributes to every frame in its range, not only to the
    /// frames it was authored on: between two recorded shapes the points
    /// are interpolated linearly, and after its last shape the track holds
    /// that shape until it goes outside. Such filled-in shapes carry
    /// `keyframe == false`. Tracks contribute nothing before their first
    /// shape or after an outside shape.
    pub fn group_by_frame(&self) -> Vec<FrameAnnotation> {
        let frames: BTreeSet<u32> = self
            .tracks
            .iter()
            .flat_map(|t| t.shapes.iter().map(|s| s.frame))
            .collect();

        frames
            .into_iter()
            .filter_map(|frame| {
                let labeled_shapes: Vec<LabeledShape> = self
                    .tracks
                    .iter()
                    .enumerate()
                    .filter_map(|(track_id, track)| {
                        shape_at_frame(track, frame).map(|shape| {
                            LabeledShape::from_tracked(track_id, &track.label, &shape)
                        })
                    })
                    .collect();

                (!labeled_shapes.is_empty()).then_some(FrameAnnotation {
                    frame,
                    labeled_shapes,
                })
            })
            .collect()
    }
}

/// Shape of `track` at `frame`: the recorded one, or one filled in from its
/// neighbours.
fn shape_at_frame(track: &Track, frame: u32) -> Option<TrackedShape> {
    let next_idx = track.shapes.partition_point(|s| s.frame <= frame);
    let prev = track.shapes[..next_idx].last()?;

    if prev.frame == frame {
        return Some(prev.clone());
    }
    if prev.outside {
        return None;
    }

    let mut shape = prev.clone();
    shape.frame = frame;
    shape.keyframe = false;

    if let Some(next) = track
        .shapes
        .get(next_idx)
        .filter(|n| n.points.len() == prev.points.len())
    {
        let t = (frame - prev.frame) as f32 / (next.frame - prev.frame) as f32;
        shape.points = prev
            .points
            .iter()
            .zip(&next.points)
            .map(|(a, b)| a + (b - a) * t)
            .collect();
    }

    Some(shape)
}
