//! Apply/revert/merge behaviour of each command kind.

use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::Vector2;

use super::{scene, snapshot};
use crate::annotation::Layer;
use crate::color_utils::ColorMap;
use crate::undo::{Command, ControlObserver, PointEdit, Scene};
use crate::view::{Channel, DirtyFlags, DisplayMode, Location, LocationUpdate, ViewKind};

fn every_kind(scene: &Scene) -> Vec<Command> {
    let cursor = scene.cursor();
    let state = scene.axial.state();
    vec![
        Command::pan(ViewKind::Axial, state.pan(), Vector2::new(3.0, -2.0)),
        Command::Zoom {
            view: ViewKind::Coronal,
            old: scene.coronal.state().zoom(),
            delta: 0.5,
        },
        Command::CursorMove {
            old: LocationUpdate::new().with_x(cursor.x).with_z(cursor.z),
            new: LocationUpdate::new().with_x(0).with_z(3),
        },
        Command::Brightness { old: state.brightness(), new: 0.3 },
        Command::Contrast { old: state.contrast(), new: 2.0 },
        Command::Opacity {
            channel: Channel::Secondary,
            old: state.opacity(Channel::Secondary),
            new: 0.9,
        },
        Command::ColorMap {
            channel: Channel::Primary,
            old: state.color_map(Channel::Primary),
            new: ColorMap::Jet,
        },
        Command::DisplayMode {
            old: state.display_mode(),
            new: DisplayMode::FatWater,
        },
        Command::ActiveLayer {
            old: state.active_layer(),
            new: Layer::Vat,
        },
        Command::LayerVisibility {
            layer: Layer::Pat,
            old: state.layer_visible(Layer::Pat),
            new: false,
        },
        Command::PointsAdd {
            layer: Layer::Scat,
            points: vec![
                PointEdit { voxel: [0, 0, 0], was_marked: false },
                PointEdit { voxel: [5, 4, 3], was_marked: false },
            ],
        },
    ]
}

#[test]
fn test_apply_revert_restores_every_kind() {
    let mut scene = scene();
    for command in every_kind(&scene) {
        let before = snapshot(&scene);
        command.apply(&mut scene);
        assert_ne!(snapshot(&scene), before, "{} changed nothing", command.description());
        command.revert(&mut scene);
        assert_eq!(snapshot(&scene), before, "{} not restored", command.description());
    }
}

#[test]
fn test_settings_apply_to_both_views() {
    let mut scene = scene();
    Command::Brightness { old: 0.0, new: 0.4 }.apply(&mut scene);
    Command::ActiveLayer { old: Layer::Eat, new: Layer::Imat }.apply(&mut scene);
    for view in ViewKind::ALL {
        let state = scene.view(view).state();
        assert_eq!(state.brightness(), 0.4);
        assert_eq!(state.active_layer(), Layer::Imat);
    }
}

#[test]
fn test_pan_only_affects_its_view() {
    let mut scene = scene();
    Command::pan(ViewKind::Coronal, Vector2::zeros(), Vector2::new(1.0, 1.0)).apply(&mut scene);
    assert_eq!(scene.coronal.state().pan(), Vector2::new(1.0, 1.0));
    assert_eq!(scene.axial.state().pan(), Vector2::zeros());
}

#[test]
fn test_cursor_move_updates_both_views() {
    let mut scene = scene();
    Command::CursorMove {
        old: LocationUpdate::new().with_y(2),
        new: LocationUpdate::new().with_y(4),
    }
    .apply(&mut scene);
    assert_eq!(scene.axial.state().cursor().y, 4);
    assert_eq!(scene.coronal.state().cursor().y, 4);
    assert_eq!(scene.coronal.slice_index(), 4);
}

#[test]
fn test_points_revert_keeps_earlier_marks() {
    let mut scene = scene();
    scene.annotations.set(Layer::Eat, 1, 1, 1);
    let command = Command::PointsAdd {
        layer: Layer::Eat,
        points: vec![
            PointEdit { voxel: [1, 1, 1], was_marked: true },
            PointEdit { voxel: [2, 1, 1], was_marked: false },
        ],
    };
    command.apply(&mut scene);
    assert!(scene.annotations.is_marked(Layer::Eat, 2, 1, 1));
    command.revert(&mut scene);
    assert!(scene.annotations.is_marked(Layer::Eat, 1, 1, 1));
    assert!(!scene.annotations.is_marked(Layer::Eat, 2, 1, 1));
}

#[test]
fn test_points_outside_volume_are_skipped() {
    let mut scene = scene();
    let command = Command::PointsAdd {
        layer: Layer::Eat,
        points: vec![PointEdit { voxel: [99, 0, 0], was_marked: false }],
    };
    command.apply(&mut scene);
    command.revert(&mut scene);
    assert!(!scene.annotations.has_any_marks());
}

#[test]
fn test_point_edit_dirties_overlays() {
    let mut scene = scene();
    for view in scene.views_mut() {
        view.state_mut().dirty = DirtyFlags::NONE;
    }
    Command::PointsAdd {
        layer: Layer::Eat,
        points: vec![PointEdit { voxel: [0, 0, 0], was_marked: false }],
    }
    .apply(&mut scene);
    assert_eq!(scene.axial.dirty(), DirtyFlags::ACTIVE_LAYER_OVERLAY);

    scene.axial.state_mut().dirty = DirtyFlags::NONE;
    Command::PointsAdd {
        layer: Layer::Vat,
        points: vec![PointEdit { voxel: [0, 0, 0], was_marked: false }],
    }
    .apply(&mut scene);
    assert_eq!(scene.axial.dirty(), DirtyFlags::ALL_LAYER_OVERLAYS);
}

#[test]
fn test_pan_merge_sums_and_respects_limit() {
    let mut first = Command::pan(ViewKind::Axial, Vector2::zeros(), Vector2::new(1.0, 0.0));
    let next = Command::pan(ViewKind::Axial, Vector2::new(1.0, 0.0), Vector2::new(2.0, 1.0));
    assert!(first.try_merge(&next, 1));
    assert!(!first.try_merge(&next, 1));
    let Command::Pan { old, delta, .. } = first else {
        panic!("merged into a different kind");
    };
    assert_eq!(old, Vector2::zeros());
    assert_eq!(delta, Vector2::new(3.0, 1.0));
}

#[test]
fn test_merge_requires_same_target() {
    let mut pan = Command::pan(ViewKind::Axial, Vector2::zeros(), Vector2::new(1.0, 0.0));
    let other_view = Command::pan(ViewKind::Coronal, Vector2::zeros(), Vector2::new(1.0, 0.0));
    assert!(!pan.try_merge(&other_view, 50));

    let mut points = Command::PointsAdd { layer: Layer::Eat, points: vec![] };
    let other_layer = Command::PointsAdd { layer: Layer::Vat, points: vec![] };
    assert!(!points.try_merge(&other_layer, 50));

    let mut color = Command::ColorMap {
        channel: Channel::Primary,
        old: ColorMap::Gray,
        new: ColorMap::Hot,
    };
    let same = color.clone();
    assert!(!color.try_merge(&same, 50));
    assert!(!pan.try_merge(&points, 50));
}

#[test]
fn test_cursor_merge_keeps_original_old() {
    let mut first = Command::CursorMove {
        old: LocationUpdate::new().with_x(1),
        new: LocationUpdate::new().with_x(2),
    };
    let next = Command::CursorMove {
        old: LocationUpdate::new().with_x(2).with_y(7),
        new: LocationUpdate::new().with_x(3).with_y(8),
    };
    assert!(first.try_merge(&next, 50));
    assert_eq!(
        first,
        Command::CursorMove {
            old: LocationUpdate::new().with_x(1).with_y(7),
            new: LocationUpdate::new().with_x(3).with_y(8),
        }
    );
}

#[test]
fn test_brightness_merge_keeps_old() {
    let mut first = Command::Brightness { old: 0.0, new: 0.1 };
    assert!(first.try_merge(&Command::Brightness { old: 0.1, new: 0.5 }, 50));
    assert_eq!(first, Command::Brightness { old: 0.0, new: 0.5 });
}

#[derive(Default)]
struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
}

impl ControlObserver for Recorder {
    fn location_changed(&mut self, location: &Location) {
        self.events.borrow_mut().push(format!("location {}", location.x));
    }

    fn zoom_changed(&mut self, view: ViewKind, zoom: f64) {
        self.events.borrow_mut().push(format!("zoom {} {}", view.name(), zoom));
    }

    fn points_changed(&mut self, layer: Layer, count: usize) {
        self.events.borrow_mut().push(format!("points {} {}", layer, count));
    }
}

#[test]
fn test_observers_receive_values() {
    let mut scene = scene();
    let recorder = Recorder::default();
    let events = Rc::clone(&recorder.events);
    scene.add_observer(Box::new(recorder));

    Command::CursorMove {
        old: LocationUpdate::new().with_x(3),
        new: LocationUpdate::new().with_x(1),
    }
    .apply(&mut scene);
    Command::Zoom { view: ViewKind::Axial, old: 1.0, delta: 0.5 }.apply(&mut scene);
    Command::PointsAdd {
        layer: Layer::Eat,
        points: vec![PointEdit { voxel: [0, 0, 0], was_marked: false }],
    }
    .revert(&mut scene);

    let expected = vec![
        "location 1".to_string(),
        format!("zoom {} 1.5", ViewKind::Axial.name()),
        format!("points {} 1", Layer::Eat),
    ];
    assert_eq!(*events.borrow(), expected);
}
