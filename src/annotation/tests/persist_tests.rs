//! Tests for the points and times files.

use std::time::Duration;

use ndarray::Array3;

use crate::annotation::persist::{self, points_path, times_path};
use crate::annotation::{AnnotationVolume, Layer, WarningSeverity};
use crate::error::TraceError;

/// Volume with a few marks and timings on every layer.
fn create_annotations() -> AnnotationVolume {
    let mut volume = AnnotationVolume::with_dims(8, 6, 4);
    for (i, layer) in Layer::ALL.into_iter().enumerate() {
        volume.set(layer, i, 1, 0);
        volume.set(layer, 7, 5, 3);
        volume.set(layer, 2, i % 6, 2);
        volume.add_slice_time(layer, 2, Duration::from_millis(1500 + i as u64));
        volume.add_slice_time(layer, 3, Duration::from_secs(3725));
    }
    volume
}

#[test]
fn test_save_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let original = create_annotations();

    let saved = persist::save(&original, dir.path()).unwrap();
    assert_eq!(saved.layers_saved, Layer::ALL.to_vec());
    assert_eq!(saved.points_written, 18);
    assert_eq!(saved.files_created.len(), 12);
    assert!(!saved.has_warnings());

    let (loaded, report) = persist::load(dir.path(), [8, 6, 4]).unwrap();
    assert_eq!(report.layers_loaded.len(), 6);
    assert_eq!(report.points_loaded, 18);
    assert!(!report.has_warnings());

    for layer in Layer::ALL {
        assert_eq!(loaded.layer(layer), original.layer(layer), "marks of {layer}");
        assert_eq!(loaded.slice_times(layer), original.slice_times(layer), "times of {layer}");
    }
}

#[test]
fn test_points_file_layout() {
    let dir = tempfile::tempdir().unwrap();
    let mut volume = AnnotationVolume::with_dims(40, 40, 10);
    volume.set(Layer::Scat, 12, 34, 5);

    persist::save(&volume, dir.path()).unwrap();

    let text = std::fs::read_to_string(points_path(dir.path(), Layer::Scat)).unwrap();
    assert_eq!(text, "10\n#5\n1\n12 34 5\n");

    let empty = std::fs::read_to_string(points_path(dir.path(), Layer::Eat)).unwrap();
    assert_eq!(empty, "10\n");

    let times = std::fs::read_to_string(times_path(dir.path(), Layer::Scat)).unwrap();
    assert_eq!(times.lines().count(), 11);
    assert!(times.starts_with("10\n#0 0h 0m 0s 0ms\n"));
}

#[test]
fn test_dimension_mismatch_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    persist::save(&create_annotations(), dir.path()).unwrap();

    let err = persist::load(dir.path(), [8, 6, 5]).unwrap_err();
    match err {
        TraceError::DimensionMismatch { expected, found, .. } => {
            assert_eq!(expected, 5);
            assert_eq!(found, 4);
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_out_of_bounds_skips_layer() {
    let dir = tempfile::tempdir().unwrap();
    persist::save(&create_annotations(), dir.path()).unwrap();
    std::fs::write(points_path(dir.path(), Layer::Pat), "4\n#1\n2\n0 0 1\n9 0 1\n").unwrap();

    let (loaded, report) = persist::load(dir.path(), [8, 6, 4]).unwrap();
    assert!(!loaded.has_marks(Layer::Pat));
    assert!(loaded.has_marks(Layer::Vat));
    assert_eq!(report.layers_loaded.len(), 5);
    assert!(report.has_errors());
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.layer == Layer::Pat && w.message.contains("outside"))
    );
}

#[test]
fn test_missing_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    persist::save(&create_annotations(), dir.path()).unwrap();
    std::fs::remove_file(points_path(dir.path(), Layer::Eat)).unwrap();
    std::fs::remove_file(times_path(dir.path(), Layer::Vat)).unwrap();

    let (loaded, report) = persist::load(dir.path(), [8, 6, 4]).unwrap();
    assert!(!loaded.has_marks(Layer::Eat));
    assert!(loaded.has_marks(Layer::Vat));
    assert_eq!(loaded.total_time(Layer::Vat), Duration::ZERO);

    let eat = report.warnings.iter().find(|w| w.layer == Layer::Eat).unwrap();
    assert_eq!(eat.severity, WarningSeverity::Error);
    assert!(eat.message.contains("not found"));
    let vat = report.warnings.iter().find(|w| w.layer == Layer::Vat).unwrap();
    assert_eq!(vat.severity, WarningSeverity::Info);
}

#[test]
fn test_malformed_times_keeps_points() {
    let dir = tempfile::tempdir().unwrap();
    persist::save(&create_annotations(), dir.path()).unwrap();
    std::fs::write(times_path(dir.path(), Layer::Imat), "4\n#0 garbage\n").unwrap();

    let (loaded, report) = persist::load(dir.path(), [8, 6, 4]).unwrap();
    assert!(loaded.has_marks(Layer::Imat));
    assert_eq!(loaded.total_time(Layer::Imat), Duration::ZERO);
    assert!(report.has_warnings());
    assert!(!report.has_errors());
}

#[test]
fn test_save_into_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("out");
    let report = persist::save(&create_annotations(), &target).unwrap();
    assert_eq!(report.layers_saved.len(), 6);
    assert!(target.join("times").join("VAT.txt").exists());
}

#[test]
fn test_export_layer_npy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vat.npy");
    let volume = create_annotations();

    persist::export_layer_npy(&volume, Layer::Vat, &path).unwrap();

    let read: Array3<u8> = ndarray_npy::read_npy(&path).unwrap();
    assert_eq!(&read, volume.layer(Layer::Vat).unwrap());
}

#[test]
fn test_export_unallocated_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = persist::export_layer_npy(&AnnotationVolume::new(), Layer::Eat, &dir.path().join("x.npy"))
        .unwrap_err();
    assert!(matches!(err, TraceError::FileUnreadable { .. }));
}
