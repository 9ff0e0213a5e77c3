//! Export/import round-trip tests.
//!
//! These tests export a task to an in-memory archive, pull the YAML back out
//! and import it into a fresh task.

use std::io::Cursor;

use crate::format::formats::IsiFormat;
use crate::format::matrix::YamlDialect;
use crate::format::read_zip_entry;
use crate::format::traits::{ExportOptions, ImportOptions};
use crate::model::{TaskData, Track, TrackedShape};

const TOLERANCE: f32 = 1e-4;

/// Export `task` with `options` and import the result.
fn roundtrip(task: &TaskData, options: &ExportOptions) -> TaskData {
    let mut buffer = Cursor::new(Vec::new());
    IsiFormat
        .export_to_writer(task, &mut buffer, options)
        .expect("export failed");

    buffer.set_position(0);
    let yaml = read_zip_entry(&mut buffer, &options.file_name).expect("entry missing");

    let mut imported = TaskData::new();
    IsiFormat
        .import_from_reader(
            yaml.as_slice(),
            &mut imported,
            &ImportOptions::new().dialect(options.dialect.clone()),
        )
        .expect("import failed");
    imported
}

/// `nb_tracks` markers on keyframes `frames`; every third sample occluded.
fn create_task(nb_tracks: usize, frames: &[u32]) -> TaskData {
    let mut task = TaskData::new();
    for t in 0..nb_tracks {
        let mut track = Track::new("Control Point");
        for (i, &frame) in frames.iter().enumerate() {
            let x = 12.25 * (t + 1) as f32 + i as f32;
            let y = 480.5 - 3.75 * i as f32;
            let occluded = (t + i) % 3 == 2;
            track.add_shape(TrackedShape::point(frame, x, y).occluded(occluded));
        }
        task.add_track(track);
    }
    task
}

fn assert_same_points(original: &TaskData, imported: &TaskData) {
    assert_eq!(original.track_count(), imported.track_count());

    for (orig, load) in original.tracks().iter().zip(imported.tracks()) {
        assert_eq!(orig.shapes.len(), load.shapes.len());
        for (a, b) in orig.shapes.iter().zip(&load.shapes) {
            assert_eq!(a.frame, b.frame);
            assert_eq!(a.occluded, b.occluded, "frame {}", a.frame);
            if !a.occluded {
                assert!((a.points[0] - b.points[0]).abs() < TOLERANCE);
                assert!((a.points[1] - b.points[1]).abs() < TOLERANCE);
            }
        }
    }
}

#[test]
fn test_single_track_scenario() {
    let mut track = Track::new("Control Point");
    track.add_shape(TrackedShape::point(0, 1.0, 2.0));
    track.add_shape(TrackedShape::point(5, 1.0, 2.0).occluded(true));
    let mut task = TaskData::new();
    task.add_track(track);

    let imported = roundtrip(&task, &ExportOptions::default());

    assert_eq!(imported.track_count(), 1);
    let shapes = &imported.tracks()[0].shapes;
    assert_eq!(shapes.len(), 2);
    assert_eq!(shapes[0].frame, 0);
    assert_eq!(shapes[0].points, vec![1.0, 2.0]);
    assert_eq!(shapes[1].frame, 5);
    assert_eq!(shapes[1].points, vec![-1.0, -1.0]);

    let occluded: Vec<bool> = shapes.iter().map(|s| s.occluded).collect();
    assert_eq!(occluded, vec![false, true]);
}

#[test]
fn test_multi_track_roundtrip() {
    let task = create_task(4, &[0, 3, 7, 8, 20]);
    let imported = roundtrip(&task, &ExportOptions::default());
    assert_same_points(&task, &imported);
}

#[test]
fn test_plain_dialect_roundtrip() {
    let task = create_task(2, &[1, 2, 3]);
    let options = ExportOptions::new()
        .dialect(YamlDialect::plain())
        .file_name("gt.yaml");

    let imported = roundtrip(&task, &options);
    assert_same_points(&task, &imported);
}

#[test]
fn test_large_frame_numbers_roundtrip() {
    let mut track = Track::new("Control Point");
    track.add_shape(TrackedShape::point(16_777_217, 1.5, 2.5));
    track.add_shape(TrackedShape::point(u32::MAX, 3.5, 4.5));
    let mut task = TaskData::new();
    task.add_track(track);

    let imported = roundtrip(&task, &ExportOptions::default());

    let frames: Vec<u32> = imported.tracks()[0].shapes.iter().map(|s| s.frame).collect();
    assert_eq!(frames, vec![16_777_217, u32::MAX]);
    assert_same_points(&task, &imported);
}

#[test]
fn test_empty_task_roundtrip() {
    let imported = roundtrip(&TaskData::new(), &ExportOptions::default());
    assert_eq!(imported.track_count(), 0);
}

#[test]
fn test_tracks_without_keyframes_roundtrip_empty() {
    let mut track = Track::new("Control Point");
    track.add_shape(TrackedShape::point(0, 1.0, 1.0).keyframe(false));
    let mut task = TaskData::new();
    task.add_track(track);

    let imported = roundtrip(&task, &ExportOptions::default());

    assert_eq!(imported.track_count(), 1);
    assert!(imported.tracks()[0].shapes.is_empty());
}
