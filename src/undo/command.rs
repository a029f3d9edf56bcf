//! Undoable commands.
//!
//! Every user-visible change is a `Command` holding the state before and
//! after the change, so `revert` restores the captured state exactly instead
//! of computing an inverse.

use nalgebra::Vector2;

use crate::annotation::Layer;
use crate::color_utils::ColorMap;
use crate::view::{Channel, DisplayMode, LocationUpdate, ViewKind, clamp_zoom};

use super::scene::Scene;

/// One voxel painted by a `PointsAdd` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointEdit {
    /// Voxel `[x, y, z]`
    pub voxel: [usize; 3],
    /// Whether the voxel was already marked before the command
    pub was_marked: bool,
}

/// A command that can be applied, reverted and merged with its successor.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Move a view by `delta` from `old`
    Pan {
        view: ViewKind,
        old: Vector2<f64>,
        delta: Vector2<f64>,
        /// Number of pans folded into this one
        merged: usize,
    },
    /// Change a view's zoom by `delta` from `old`
    Zoom { view: ViewKind, old: f64, delta: f64 },
    /// Move the shared cursor
    CursorMove {
        old: LocationUpdate,
        new: LocationUpdate,
    },
    Brightness { old: f32, new: f32 },
    Contrast { old: f32, new: f32 },
    Opacity { channel: Channel, old: f32, new: f32 },
    ColorMap {
        channel: Channel,
        old: ColorMap,
        new: ColorMap,
    },
    DisplayMode { old: DisplayMode, new: DisplayMode },
    ActiveLayer { old: Layer, new: Layer },
    LayerVisibility { layer: Layer, old: bool, new: bool },
    /// Mark voxels of one layer
    PointsAdd { layer: Layer, points: Vec<PointEdit> },
}

impl Command {
    /// Create a pan command.
    pub fn pan(view: ViewKind, old: Vector2<f64>, delta: Vector2<f64>) -> Self {
        Command::Pan {
            view,
            old,
            delta,
            merged: 0,
        }
    }

    /// Get a human-readable description of this command
    pub fn description(&self) -> String {
        match self {
            Command::Pan { view, .. } => format!("Pan {} view", view.name()),
            Command::Zoom { view, .. } => format!("Zoom {} view", view.name()),
            Command::CursorMove { .. } => "Move cursor".to_string(),
            Command::Brightness { .. } => "Change brightness".to_string(),
            Command::Contrast { .. } => "Change contrast".to_string(),
            Command::Opacity { channel, .. } => format!("Change {:?} opacity", channel),
            Command::ColorMap { channel, new, .. } => {
                format!("Set {:?} color map to {}", channel, new.name())
            }
            Command::DisplayMode { new, .. } => format!("Display {:?}", new),
            Command::ActiveLayer { new, .. } => format!("Select layer {}", new),
            Command::LayerVisibility { layer, new, .. } => {
                format!("{} layer {}", if *new { "Show" } else { "Hide" }, layer)
            }
            Command::PointsAdd { layer, points } => {
                format!("Draw {} points on {}", points.len(), layer)
            }
        }
    }

    /// Perform the change.
    pub fn apply(&self, scene: &mut Scene) {
        match self {
            Command::Pan {
                view, old, delta, ..
            } => set_pan(scene, *view, old + delta),
            Command::Zoom { view, old, delta } => set_zoom(scene, *view, old + delta),
            Command::CursorMove { new, .. } => move_cursor(scene, new),
            Command::Brightness { new, .. } => set_brightness(scene, *new),
            Command::Contrast { new, .. } => set_contrast(scene, *new),
            Command::Opacity { channel, new, .. } => set_opacity(scene, *channel, *new),
            Command::ColorMap { channel, new, .. } => set_color_map(scene, *channel, *new),
            Command::DisplayMode { new, .. } => set_display_mode(scene, *new),
            Command::ActiveLayer { new, .. } => set_active_layer(scene, *new),
            Command::LayerVisibility { layer, new, .. } => set_layer_visible(scene, *layer, *new),
            Command::PointsAdd { layer, points } => {
                for point in points {
                    let [x, y, z] = point.voxel;
                    if scene.annotations.contains(x, y, z) {
                        scene.annotations.set(*layer, x, y, z);
                    }
                }
                points_changed(scene, *layer, points.len());
            }
        }
    }

    /// Restore the state captured before the change.
    pub fn revert(&self, scene: &mut Scene) {
        match self {
            Command::Pan { view, old, .. } => set_pan(scene, *view, *old),
            Command::Zoom { view, old, .. } => set_zoom(scene, *view, *old),
            Command::CursorMove { old, .. } => move_cursor(scene, old),
            Command::Brightness { old, .. } => set_brightness(scene, *old),
            Command::Contrast { old, .. } => set_contrast(scene, *old),
            Command::Opacity { channel, old, .. } => set_opacity(scene, *channel, *old),
            Command::ColorMap { channel, old, .. } => set_color_map(scene, *channel, *old),
            Command::DisplayMode { old, .. } => set_display_mode(scene, *old),
            Command::ActiveLayer { old, .. } => set_active_layer(scene, *old),
            Command::LayerVisibility { layer, old, .. } => set_layer_visible(scene, *layer, *old),
            Command::PointsAdd { layer, points } => {
                for point in points.iter().filter(|p| !p.was_marked) {
                    let [x, y, z] = point.voxel;
                    if scene.annotations.contains(x, y, z) {
                        scene.annotations.reset(*layer, x, y, z);
                    }
                }
                points_changed(scene, *layer, points.len());
            }
        }
    }

    /// Fold `next` into `self` if both describe one continuous change.
    ///
    /// Returns `false` (leaving `self` untouched) when they cannot merge.
    /// A pan chain stops growing after `pan_merge_limit` merges.
    pub fn try_merge(&mut self, next: &Command, pan_merge_limit: usize) -> bool {
        match (self, next) {
            (
                Command::Pan {
                    view, delta, merged, ..
                },
                Command::Pan {
                    view: next_view,
                    delta: next_delta,
                    ..
                },
            ) if view == next_view && *merged < pan_merge_limit => {
                *delta += next_delta;
                *merged += 1;
                true
            }
            (
                Command::Zoom { view, delta, .. },
                Command::Zoom {
                    view: next_view,
                    delta: next_delta,
                    ..
                },
            ) if view == next_view => {
                *delta += next_delta;
                true
            }
            (
                Command::CursorMove { old, new },
                Command::CursorMove {
                    old: next_old,
                    new: next_new,
                },
            ) => {
                *old = old.fill_from(next_old);
                *new = new.overlay(next_new);
                true
            }
            (Command::Brightness { new, .. }, Command::Brightness { new: next_new, .. })
            | (Command::Contrast { new, .. }, Command::Contrast { new: next_new, .. }) => {
                *new = *next_new;
                true
            }
            (
                Command::Opacity { channel, new, .. },
                Command::Opacity {
                    channel: next_channel,
                    new: next_new,
                    ..
                },
            ) if channel == next_channel => {
                *new = *next_new;
                true
            }
            (
                Command::PointsAdd { layer, points },
                Command::PointsAdd {
                    layer: next_layer,
                    points: next_points,
                },
            ) if layer == next_layer => {
                points.extend_from_slice(next_points);
                true
            }
            _ => false,
        }
    }
}

fn set_pan(scene: &mut Scene, view: ViewKind, pan: Vector2<f64>) {
    scene.view_mut(view).state_mut().set_pan(pan);
    scene.notify(|o| o.pan_changed(view, &pan));
}

fn set_zoom(scene: &mut Scene, view: ViewKind, zoom: f64) {
    let zoom = clamp_zoom(zoom);
    scene.view_mut(view).state_mut().set_zoom(zoom);
    scene.notify(|o| o.zoom_changed(view, zoom));
}

fn move_cursor(scene: &mut Scene, update: &LocationUpdate) {
    for view in scene.views_mut() {
        view.set_cursor(update);
    }
    let location = scene.cursor();
    scene.notify(|o| o.location_changed(&location));
}

fn set_brightness(scene: &mut Scene, brightness: f32) {
    for view in scene.views_mut() {
        view.state_mut().set_brightness(brightness);
    }
    scene.notify(|o| o.brightness_changed(brightness));
}

fn set_contrast(scene: &mut Scene, contrast: f32) {
    for view in scene.views_mut() {
        view.state_mut().set_contrast(contrast);
    }
    scene.notify(|o| o.contrast_changed(contrast));
}

fn set_opacity(scene: &mut Scene, channel: Channel, opacity: f32) {
    for view in scene.views_mut() {
        view.state_mut().set_opacity(channel, opacity);
    }
    scene.notify(|o| o.opacity_changed(channel, opacity));
}

fn set_color_map(scene: &mut Scene, channel: Channel, map: ColorMap) {
    for view in scene.views_mut() {
        view.state_mut().set_color_map(channel, map);
    }
    scene.notify(|o| o.color_map_changed(channel, map));
}

fn set_display_mode(scene: &mut Scene, mode: DisplayMode) {
    for view in scene.views_mut() {
        view.state_mut().set_display_mode(mode);
    }
    scene.notify(|o| o.display_mode_changed(mode));
}

fn set_active_layer(scene: &mut Scene, layer: Layer) {
    for view in scene.views_mut() {
        view.state_mut().set_active_layer(layer);
    }
    scene.notify(|o| o.active_layer_changed(layer));
}

fn set_layer_visible(scene: &mut Scene, layer: Layer, visible: bool) {
    for view in scene.views_mut() {
        view.state_mut().set_layer_visible(layer, visible);
    }
    scene.notify(|o| o.layer_visibility_changed(layer, visible));
}

fn points_changed(scene: &mut Scene, layer: Layer, count: usize) {
    for view in scene.views_mut() {
        view.mark_layer_edited(layer);
    }
    scene.notify(|o| o.points_changed(layer, count));
}
