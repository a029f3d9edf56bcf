//! Tests for commands, merging and the history stacks.

mod command_tests;

use crate::undo::Scene;
use crate::view::{DirtyFlags, Location, ViewState};

pub(crate) const DIMS: [usize; 3] = [6, 5, 4];

/// Scene with allocated annotations and both views reset to `DIMS`.
pub(crate) fn scene() -> Scene {
    let [x, y, z] = DIMS;
    let mut scene = Scene::new();
    scene.annotations.allocate(x, y, z);
    let cursor = Location::new(x / 2, y / 2, z / 2);
    for view in scene.views_mut() {
        view.reset(DIMS, cursor);
    }
    scene
}

/// Everything a command may change, with dirty flags ignored.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Snapshot {
    axial: ViewState,
    coronal: ViewState,
    marks: Vec<Vec<[usize; 3]>>,
}

pub(crate) fn snapshot(scene: &Scene) -> Snapshot {
    let clean = |state: &ViewState| {
        let mut state = state.clone();
        state.dirty = DirtyFlags::NONE;
        state
    };
    Snapshot {
        axial: clean(scene.axial.state()),
        coronal: clean(scene.coronal.state()),
        marks: crate::annotation::Layer::ALL
            .iter()
            .map(|&layer| scene.annotations.marked_points(layer))
            .collect(),
    }
}
