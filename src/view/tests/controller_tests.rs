//! Tests for dirty tracking, lazy recompute and upload bookkeeping.

use nalgebra::Point2;
use ndarray::Array3;

use fattrace_gpu::TextureKey;

use super::{RecordingUploader, UploadEvent};
use crate::annotation::{AnnotationVolume, Layer};
use crate::data::Volume;
use crate::numeric::{NumericType, ScalarKind};
use crate::view::{Channel, DirtyFlags, DisplayMode, Location, LocationUpdate, ViewController, ViewKind};

const X: usize = 4;
const Y: usize = 3;
const Z: usize = 5;

fn volume(scale: f32) -> Volume {
    let data = Array3::from_shape_fn((Z, Y, X), |(z, y, x)| scale * (z * 100 + y * 10 + x) as f32);
    Volume::from_array(data, NumericType::from_kind(ScalarKind::F32, 1).unwrap())
}

struct Fixture {
    fat: Volume,
    water: Volume,
    annotations: AnnotationVolume,
    uploader: RecordingUploader,
}

impl Fixture {
    fn new() -> Self {
        Self {
            fat: volume(1.0),
            water: volume(2.0),
            annotations: AnnotationVolume::with_dims(X, Y, Z),
            uploader: RecordingUploader::new(),
        }
    }

    fn paint(&mut self, view: &mut ViewController) -> crate::view::FrameData {
        view.paint(&self.fat, &self.water, &self.annotations, &mut self.uploader)
    }
}

fn controller(kind: ViewKind) -> ViewController {
    let mut view = ViewController::new(kind, 0);
    view.reset([X, Y, Z], Location::new(1, 1, 2));
    view.state_mut().set_viewport(400, 300);
    view
}

fn clean(kind: ViewKind) -> ViewController {
    let mut view = controller(kind);
    let mut fixture = Fixture::new();
    fixture.paint(&mut view);
    assert!(view.dirty().is_empty());
    view
}

#[test]
fn test_axial_dirty_flag_combinations() {
    let cases = [
        (LocationUpdate::new().with_z(3), DirtyFlags::SLICE | DirtyFlags::ALL_LAYER_OVERLAYS),
        (LocationUpdate::new().with_y(2), DirtyFlags::CROSSHAIR),
        (
            LocationUpdate::new().with_z(3).with_y(2),
            DirtyFlags::SLICE | DirtyFlags::ALL_LAYER_OVERLAYS | DirtyFlags::CROSSHAIR,
        ),
        (LocationUpdate::new().with_x(3).with_t(4), DirtyFlags::NONE),
    ];

    for (update, expected) in cases {
        let mut view = clean(ViewKind::Axial);
        assert_eq!(view.set_cursor(&update), expected, "{update:?}");
        assert_eq!(view.dirty(), expected);
    }
}

#[test]
fn test_coronal_dirty_flag_combinations() {
    let cases = [
        (LocationUpdate::new().with_y(0), DirtyFlags::SLICE | DirtyFlags::ALL_LAYER_OVERLAYS),
        (LocationUpdate::new().with_z(4), DirtyFlags::CROSSHAIR),
        (
            LocationUpdate::new().with_y(0).with_z(4),
            DirtyFlags::SLICE | DirtyFlags::ALL_LAYER_OVERLAYS | DirtyFlags::CROSSHAIR,
        ),
        (LocationUpdate::new().with_x(0), DirtyFlags::NONE),
    ];

    for (update, expected) in cases {
        let mut view = clean(ViewKind::Coronal);
        assert_eq!(view.set_cursor(&update), expected, "{update:?}");
    }
}

#[test]
fn test_set_cursor_is_idempotent() {
    let mut view = clean(ViewKind::Axial);
    let update = LocationUpdate::new().with_z(4).with_y(0);
    assert!(!view.set_cursor(&update).is_empty());
    assert!(view.set_cursor(&update).is_empty());
    assert_eq!(view.state().cursor(), Location::new(1, 0, 4));
}

#[test]
fn test_first_paint_allocates_then_updates() {
    let mut fixture = Fixture::new();
    let mut view = controller(ViewKind::Axial);

    fixture.paint(&mut view);
    // one slice texture and six overlays
    assert_eq!(fixture.uploader.allocations(), 7);
    assert_eq!(fixture.uploader.updates(), 0);
    assert!(view.dirty().is_empty());

    fixture.uploader.clear_events();
    fixture.paint(&mut view);
    assert!(fixture.uploader.events.is_empty());

    view.set_cursor(&LocationUpdate::new().with_z(4));
    fixture.paint(&mut view);
    assert_eq!(fixture.uploader.allocations(), 0);
    assert_eq!(fixture.uploader.updates(), 7);
}

#[test]
fn test_size_change_reallocates() {
    let mut fixture = Fixture::new();
    let mut view = controller(ViewKind::Coronal);
    fixture.paint(&mut view);

    let data = Array3::<f32>::zeros((Z, Y, X + 2));
    let entry = NumericType::from_kind(ScalarKind::F32, 1).unwrap();
    fixture.fat = Volume::from_array(data.clone(), entry);
    fixture.water = Volume::from_array(data, entry);
    fixture.annotations = AnnotationVolume::with_dims(X + 2, Y, Z);
    view.reset([X + 2, Y, Z], Location::new(0, 0, 0));

    fixture.uploader.clear_events();
    fixture.paint(&mut view);
    assert_eq!(fixture.uploader.allocations(), 7);
    assert!(
        fixture
            .uploader
            .events
            .contains(&UploadEvent::Allocate(TextureKey(0), (X + 2) as u32, Z as u32))
    );
}

#[test]
fn test_active_layer_overlay_only() {
    let mut fixture = Fixture::new();
    let mut view = controller(ViewKind::Axial);
    fixture.paint(&mut view);

    view.state_mut().set_active_layer(Layer::Scat);
    fixture.annotations.set(Layer::Scat, 1, 1, 2);
    fixture.uploader.clear_events();
    fixture.paint(&mut view);

    assert_eq!(
        fixture.uploader.events,
        vec![UploadEvent::Update(TextureKey(2 + Layer::Scat.index() as u32))]
    );
}

#[test]
fn test_uploaded_slice_is_normalised() {
    let mut fixture = Fixture::new();
    let mut view = controller(ViewKind::Axial);
    fixture.paint(&mut view);

    let texels = fixture.uploader.floats(TextureKey(0));
    assert_eq!(texels.len(), X * Y);
    assert_eq!(texels[0], 0.0);
    assert_eq!(texels[X * Y - 1], 1.0);
}

#[test]
fn test_fat_water_uses_two_textures() {
    let mut fixture = Fixture::new();
    let mut view = controller(ViewKind::Axial);
    view.state_mut().set_display_mode(DisplayMode::FatWater);
    let frame = fixture.paint(&mut view);

    assert_eq!(frame.slices.len(), 2);
    assert_eq!(frame.slices[0].key, TextureKey(0));
    assert_eq!(frame.slices[1].key, TextureKey(1));
    assert_eq!(frame.slices[1].opacity, view.state().opacity(Channel::Secondary));

    view.state_mut().set_display_mode(DisplayMode::Fat);
    let frame = fixture.paint(&mut view);
    assert_eq!(frame.slices.len(), 1);
}

#[test]
fn test_fraction_texture() {
    let mut fixture = Fixture::new();
    let mut view = controller(ViewKind::Axial);
    view.state_mut().set_display_mode(DisplayMode::FatFraction);
    fixture.paint(&mut view);

    // equal normalised channels give one half, except at 0/0
    let texels = fixture.uploader.floats(TextureKey(0));
    assert_eq!(texels[0], 0.0);
    assert!(texels[1..].iter().all(|&v| (v - 0.5).abs() < 1e-6));
}

#[test]
fn test_upload_failure_keeps_flags() {
    let mut fixture = Fixture::new();
    let mut view = controller(ViewKind::Axial);
    fixture.uploader.fail = true;

    let frame = fixture.paint(&mut view);
    assert!(view.dirty().contains(DirtyFlags::SLICE));
    assert!(view.dirty().contains(DirtyFlags::ALL_LAYER_OVERLAYS));
    assert!(!view.dirty().contains(DirtyFlags::CROSSHAIR));
    assert!(frame.slices.is_empty());

    fixture.uploader.fail = false;
    fixture.paint(&mut view);
    assert!(view.dirty().is_empty());
}

#[test]
fn test_missing_slice_keeps_flag() {
    let mut fixture = Fixture::new();
    let mut view = controller(ViewKind::Axial);
    view.set_cursor(&LocationUpdate::new().with_z(Z + 3));
    fixture.paint(&mut view);
    assert!(view.dirty().contains(DirtyFlags::SLICE));
    assert_eq!(fixture.uploader.allocations(), 0);
}

#[test]
fn test_hidden_layers_refresh_but_are_not_drawn() {
    let mut fixture = Fixture::new();
    let mut view = controller(ViewKind::Axial);
    view.state_mut().set_layer_visible(Layer::Imat, false);

    let frame = fixture.paint(&mut view);
    assert_eq!(fixture.uploader.allocations(), 7);
    assert_eq!(frame.overlays.len(), 5);
    assert!(frame.overlays.iter().all(|o| o.layer != Layer::Imat));
    assert_eq!(frame.overlays[0].color, Layer::Eat.color());
}

#[test]
fn test_release_textures() {
    let mut fixture = Fixture::new();
    let mut view = controller(ViewKind::Coronal);
    fixture.paint(&mut view);

    fixture.uploader.clear_events();
    view.release_textures(&mut fixture.uploader);
    assert_eq!(fixture.uploader.events.len(), 7);
    assert!(fixture.uploader.textures.is_empty());
    assert_eq!(view.dirty(), DirtyFlags::ALL);

    fixture.uploader.clear_events();
    fixture.paint(&mut view);
    assert_eq!(fixture.uploader.allocations(), 7);
}

#[test]
fn test_crosshair_tracks_other_view() {
    let mut fixture = Fixture::new();
    let mut view = controller(ViewKind::Axial);
    let frame = fixture.paint(&mut view);
    let before = frame.crosshair.unwrap();

    view.set_cursor(&LocationUpdate::new().with_y(0));
    let after = fixture.paint(&mut view).crosshair.unwrap();
    // Y grows upwards on screen
    assert!(after.start.y > before.start.y);
    assert!((after.thickness - 100.0).abs() < 1e-9);
}

#[test]
fn test_window_to_volume() {
    let view = controller(ViewKind::Coronal);
    // 400x300 window over a 4x5 (x by z) plane; bottom-left pixel is x=0, z=0
    assert_eq!(view.window_to_volume(Point2::new(1.0, 299.0)), Some([0, 1, 0]));
    assert_eq!(view.window_to_volume(Point2::new(399.0, 1.0)), Some([3, 1, 4]));
    assert_eq!(view.window_to_volume(Point2::new(-5.0, 10.0)), None);
}
