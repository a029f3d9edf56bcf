//! Application session: the loaded dataset, both views, the annotations and
//! the undo history.
//!
//! Every user-visible change goes through the `CommandLog`, so it can be
//! undone. Loading replaces state only after the load succeeded.

mod stroke;

#[cfg(test)]
mod tests;

use std::path::Path;

use fattrace_gpu::TextureUpload;
use image::RgbaImage;
use nalgebra::{Point2, Vector2};
use web_time::Instant;

use crate::annotation::{Layer, LoadReport, SaveReport, persist};
use crate::color_utils::ColorMap;
use crate::config::AppConfig;
use crate::data::{Dataset, SubvolumeSource};
use crate::error::{Result, TraceError};
use crate::export;
use crate::undo::{Command, CommandLog, ControlObserver, MergeGroup, PointEdit, Scene};
use crate::view::{
    Channel, DirtyFlags, DisplayMode, FrameData, Location, LocationUpdate, ViewController, ViewKind,
    ViewState, clamp_zoom,
};

use stroke::{Stroke, line};

/// Owns everything one open dataset needs.
#[derive(Debug)]
pub struct Session {
    config: AppConfig,
    dataset: Option<Dataset>,
    scene: Scene,
    log: CommandLog,
    stroke: Option<Stroke>,
    marks_modified: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Session {
    /// Create an empty session using the display defaults from `config`.
    pub fn new(config: AppConfig) -> Self {
        let preferences = &config.preferences;
        let mut scene = Scene::new();
        for view in scene.views_mut() {
            let state = view.state_mut();
            state.set_display_mode(preferences.default_display_mode);
            state.set_color_map(Channel::Primary, preferences.primary_color_map);
            state.set_color_map(Channel::Secondary, preferences.secondary_color_map);
        }

        Self {
            log: CommandLog::with_config(preferences.log_config()),
            config,
            dataset: None,
            scene,
            stroke: None,
            marks_modified: false,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn view(&self, kind: ViewKind) -> &ViewController {
        self.scene.view(kind)
    }

    pub fn cursor(&self) -> Location {
        self.scene.cursor()
    }

    pub fn add_observer(&mut self, observer: Box<dyn ControlObserver>) {
        self.scene.add_observer(observer);
    }

    /// Volume extents `[x, y, z]` of the loaded dataset.
    pub fn dims(&self) -> Option<[usize; 3]> {
        self.dataset.as_ref().map(Dataset::dims)
    }

    fn require_dims(&self) -> Result<[usize; 3]> {
        self.dims().ok_or(TraceError::NoDataset)
    }

    // ------------------------------------------------------------------
    // Loading and saving
    // ------------------------------------------------------------------

    /// Load a dataset directory.
    ///
    /// On success the annotations are reallocated empty, the cursor is
    /// centred, pan and zoom are reset and the history is cleared. On
    /// failure the session is unchanged.
    pub fn load_dataset(&mut self, dir: &Path, source: &dyn SubvolumeSource) -> Result<()> {
        let dataset = Dataset::load(dir, source)?;
        let dims = dataset.dims();
        let [x, y, z] = dims;

        self.scene.annotations.allocate(x, y, z);
        self.scene.reset_views(dims, Location::new(x / 2, y / 2, z / 2));
        self.dataset = Some(dataset);
        self.log.clear();
        self.stroke = None;
        self.marks_modified = false;
        Ok(())
    }

    /// Replace the annotations with those saved in `dir`.
    pub fn load_annotations(&mut self, dir: &Path) -> Result<LoadReport> {
        let dims = self.require_dims()?;
        let (annotations, report) = persist::load(dir, dims)?;

        self.scene.annotations = annotations;
        for view in self.scene.views_mut() {
            view.state_mut().mark_dirty(DirtyFlags::ALL_LAYER_OVERLAYS);
        }
        // Recorded point edits refer to the replaced annotations
        self.log.clear();
        self.stroke = None;
        self.marks_modified = false;
        Ok(report)
    }

    /// Save the annotations into `dir`.
    pub fn save_annotations(&mut self, dir: &Path) -> Result<SaveReport> {
        self.require_dims()?;
        let report = persist::save(&self.scene.annotations, dir)?;
        if !report.has_errors() {
            self.marks_modified = false;
        }
        Ok(report)
    }

    /// Whether marks changed since the last load or successful save.
    pub fn has_unsaved_marks(&self) -> bool {
        self.marks_modified
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Move the cursor. Axes are clamped to the volume; a move that changes
    /// nothing is not recorded.
    pub fn move_cursor(&mut self, update: LocationUpdate, group: Option<MergeGroup>) {
        let Some([xd, yd, zd]) = self.dims() else {
            return;
        };
        let clamp = |v: Option<usize>, dim: usize| v.map(|v| v.min(dim.saturating_sub(1)));
        let update = LocationUpdate {
            x: clamp(update.x, xd),
            y: clamp(update.y, yd),
            z: clamp(update.z, zd),
            t: update.t,
        };

        let cursor = self.scene.cursor();
        if update.is_empty() || update.apply_to(cursor) == cursor {
            return;
        }
        let old = update.capture(cursor);
        self.push(Command::CursorMove { old, new: update }, group);
    }

    /// Scroll `view` through its slices by `delta`, clamped to the volume.
    pub fn step_slice(&mut self, view: ViewKind, delta: i64) {
        let Some(dims) = self.dims() else {
            return;
        };
        let axis = self.scene.view(view).binding().slicing;
        let last = dims[axis.index()].saturating_sub(1) as i64;
        let current = self.scene.cursor().get(axis) as i64;
        let target = (current + delta).clamp(0, last) as usize;
        self.move_cursor(LocationUpdate::axis(axis, target), None);
    }

    /// Pan `view` by `delta` (NDC units).
    pub fn pan(&mut self, view: ViewKind, delta: Vector2<f64>, group: Option<MergeGroup>) {
        if delta == Vector2::zeros() {
            return;
        }
        let old = self.scene.view(view).state().pan();
        self.push(Command::pan(view, old, delta), group);
    }

    /// Change `view`'s zoom by `delta`. Only the part that survives clamping
    /// is recorded, so merged zooms revert exactly.
    pub fn zoom(&mut self, view: ViewKind, delta: f64, group: Option<MergeGroup>) {
        let old = self.scene.view(view).state().zoom();
        let delta = clamp_zoom(old + delta) - old;
        if delta == 0.0 {
            return;
        }
        self.push(Command::Zoom { view, old, delta }, group);
    }

    /// Zoom by wheel notches, using the configured step.
    pub fn zoom_steps(&mut self, view: ViewKind, notches: f64, group: Option<MergeGroup>) {
        self.zoom(view, notches * self.config.preferences.zoom_step, group);
    }

    /// Record a new window size for `view`. Not undoable.
    pub fn resize_view(&mut self, view: ViewKind, width: u32, height: u32) {
        self.scene.view_mut(view).state_mut().set_viewport(width, height);
    }

    // ------------------------------------------------------------------
    // Display settings (shared by both views)
    // ------------------------------------------------------------------

    fn state(&self) -> &ViewState {
        self.scene.axial.state()
    }

    pub fn set_brightness(&mut self, brightness: f32, group: Option<MergeGroup>) {
        let old = self.state().brightness();
        if old != brightness {
            self.push(Command::Brightness { old, new: brightness }, group);
        }
    }

    pub fn set_contrast(&mut self, contrast: f32, group: Option<MergeGroup>) {
        let old = self.state().contrast();
        if old != contrast {
            self.push(Command::Contrast { old, new: contrast }, group);
        }
    }

    /// Set a channel's opacity, clamped to [0, 1].
    pub fn set_opacity(&mut self, channel: Channel, opacity: f32, group: Option<MergeGroup>) {
        let new = opacity.clamp(0.0, 1.0);
        let old = self.state().opacity(channel);
        if old != new {
            self.push(Command::Opacity { channel, old, new }, group);
        }
    }

    pub fn set_color_map(&mut self, channel: Channel, map: ColorMap) {
        let old = self.state().color_map(channel);
        if old != map {
            self.push(Command::ColorMap { channel, old, new: map }, None);
        }
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        let old = self.state().display_mode();
        if old != mode {
            self.push(Command::DisplayMode { old, new: mode }, None);
        }
    }

    pub fn set_active_layer(&mut self, layer: Layer) {
        let old = self.state().active_layer();
        if old != layer {
            self.push(Command::ActiveLayer { old, new: layer }, None);
        }
    }

    pub fn set_layer_visible(&mut self, layer: Layer, visible: bool) {
        let old = self.state().layer_visible(layer);
        if old != visible {
            self.push(Command::LayerVisibility { layer, old, new: visible }, None);
        }
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Start a stroke on the active layer at a window point of `view`.
    ///
    /// An unfinished stroke is ended first.
    pub fn begin_stroke(&mut self, view: ViewKind, window_point: Point2<f64>) {
        if self.dataset.is_none() {
            return;
        }
        self.end_stroke();
        self.stroke = Some(Stroke {
            view,
            layer: self.state().active_layer(),
            group: self.log.new_group(),
            last: None,
            started: Instant::now(),
        });
        self.continue_stroke(window_point);
    }

    /// Extend the current stroke to a window point.
    ///
    /// The segment from the previous point is filled in so fast drags leave
    /// no gaps. Points outside the volume are ignored and break the segment.
    pub fn continue_stroke(&mut self, window_point: Point2<f64>) {
        let Some(stroke) = self.stroke.as_mut() else {
            return;
        };
        let controller = self.scene.view(stroke.view);
        let Some(voxel) = controller.window_to_volume(window_point) else {
            stroke.last = None;
            return;
        };

        let binding = *controller.binding();
        let voxels: Vec<[usize; 3]> = match stroke.last {
            Some(last) if last != voxel => {
                let plane = |v: [usize; 3]| {
                    let p = binding.to_plane(v.map(|c| c as f64));
                    (p.x as i64, p.y as i64)
                };
                let slice = voxel[binding.slicing.index()] as f64;
                line(plane(last), plane(voxel))
                    .into_iter()
                    // the first point was drawn by the previous call
                    .skip(1)
                    .map(|(x, y)| {
                        binding
                            .to_volume(Point2::new(x as f64, y as f64), slice)
                            .map(|c| c as usize)
                    })
                    .collect()
            }
            Some(_) => return,
            None => vec![voxel],
        };
        stroke.last = Some(voxel);
        let (layer, group) = (stroke.layer, stroke.group);

        let annotations = &self.scene.annotations;
        let points: Vec<PointEdit> = voxels
            .into_iter()
            .filter(|&[x, y, z]| annotations.contains(x, y, z))
            .map(|voxel| {
                let [x, y, z] = voxel;
                PointEdit {
                    voxel,
                    was_marked: annotations.is_marked(layer, x, y, z),
                }
            })
            .collect();
        if points.is_empty() {
            return;
        }

        self.push(Command::PointsAdd { layer, points }, Some(group));
        self.marks_modified = true;
    }

    /// Finish the current stroke and add its duration to the layer's timer
    /// for the cursor's slice.
    pub fn end_stroke(&mut self) {
        let Some(stroke) = self.stroke.take() else {
            return;
        };
        let z = self.scene.cursor().z;
        if z < self.scene.annotations.z_dim() {
            let elapsed = stroke.started.elapsed();
            self.scene.annotations.add_slice_time(stroke.layer, z, elapsed);
            log::debug!("Stroke on {} took {:?}", stroke.layer, elapsed);
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Start a new interaction; pass the group to every call it makes.
    pub fn new_group(&mut self) -> MergeGroup {
        self.log.new_group()
    }

    fn push(&mut self, command: Command, group: Option<MergeGroup>) {
        self.log.push(command, group, &mut self.scene);
    }

    fn touches_marks(command: Option<&Command>) -> bool {
        matches!(command, Some(Command::PointsAdd { .. }))
    }

    pub fn undo(&mut self) -> bool {
        self.end_stroke();
        if Self::touches_marks(self.log.next_undo()) {
            self.marks_modified = true;
        }
        self.log.undo(&mut self.scene)
    }

    pub fn redo(&mut self) -> bool {
        self.end_stroke();
        if Self::touches_marks(self.log.next_redo()) {
            self.marks_modified = true;
        }
        self.log.redo(&mut self.scene)
    }

    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.log.undo_description()
    }

    pub fn redo_description(&self) -> Option<String> {
        self.log.redo_description()
    }

    pub fn history(&self) -> &CommandLog {
        &self.log
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Refresh `view`'s textures and describe its frame.
    pub fn paint(&mut self, view: ViewKind, uploader: &mut dyn TextureUpload) -> Option<FrameData> {
        let dataset = self.dataset.as_ref()?;
        let (controller, annotations) = self.scene.view_with_annotations(view);
        Some(controller.paint(&dataset.fat, &dataset.water, annotations, uploader))
    }

    /// Release both views' textures.
    pub fn release_textures(&mut self, uploader: &mut dyn TextureUpload) {
        for view in self.scene.views_mut() {
            view.release_textures(uploader);
        }
    }

    /// Render `view` on the CPU.
    pub fn render_view(&self, view: ViewKind) -> Option<RgbaImage> {
        let dataset = self.dataset.as_ref()?;
        export::render_view_rgba(
            self.scene.view(view),
            &dataset.fat,
            &dataset.water,
            &self.scene.annotations,
        )
    }

    /// Export one layer's marks as `.npy`.
    pub fn export_layer_npy(&self, layer: Layer, path: &Path) -> Result<()> {
        self.require_dims()?;
        persist::export_layer_npy(&self.scene.annotations, layer, path)
    }
}
