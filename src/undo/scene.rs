//! State that commands act on.

use nalgebra::Vector2;

use crate::annotation::{AnnotationVolume, Layer};
use crate::color_utils::ColorMap;
use crate::view::{Channel, DisplayMode, Location, ViewController, ViewKind};

/// Receives every value a command changes, e.g. to keep widgets in sync.
///
/// Observers only see values; they cannot reach the command log, so a
/// notification never records a new command.
pub trait ControlObserver {
    fn location_changed(&mut self, _location: &Location) {}
    fn pan_changed(&mut self, _view: ViewKind, _pan: &Vector2<f64>) {}
    fn zoom_changed(&mut self, _view: ViewKind, _zoom: f64) {}
    fn brightness_changed(&mut self, _brightness: f32) {}
    fn contrast_changed(&mut self, _contrast: f32) {}
    fn opacity_changed(&mut self, _channel: Channel, _opacity: f32) {}
    fn color_map_changed(&mut self, _channel: Channel, _map: ColorMap) {}
    fn display_mode_changed(&mut self, _mode: DisplayMode) {}
    fn active_layer_changed(&mut self, _layer: Layer) {}
    fn layer_visibility_changed(&mut self, _layer: Layer, _visible: bool) {}
    /// `count` voxels of `layer` were marked or unmarked
    fn points_changed(&mut self, _layer: Layer, _count: usize) {}
}

/// Both views, the annotation volume and the registered observers.
pub struct Scene {
    pub axial: ViewController,
    pub coronal: ViewController,
    pub annotations: AnnotationVolume,
    observers: Vec<Box<dyn ControlObserver>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            axial: ViewController::new(ViewKind::Axial, 0),
            coronal: ViewController::new(ViewKind::Coronal, 16),
            annotations: AnnotationVolume::new(),
            observers: Vec::new(),
        }
    }

    pub fn view(&self, kind: ViewKind) -> &ViewController {
        match kind {
            ViewKind::Axial => &self.axial,
            ViewKind::Coronal => &self.coronal,
        }
    }

    pub fn view_mut(&mut self, kind: ViewKind) -> &mut ViewController {
        match kind {
            ViewKind::Axial => &mut self.axial,
            ViewKind::Coronal => &mut self.coronal,
        }
    }

    /// One view together with the annotations it overlays.
    pub fn view_with_annotations(&mut self, kind: ViewKind) -> (&mut ViewController, &AnnotationVolume) {
        let view = match kind {
            ViewKind::Axial => &mut self.axial,
            ViewKind::Coronal => &mut self.coronal,
        };
        (view, &self.annotations)
    }

    /// Both views, axial first.
    pub fn views_mut(&mut self) -> [&mut ViewController; 2] {
        [&mut self.axial, &mut self.coronal]
    }

    /// Put both views on new extents at `cursor` with default pan and zoom,
    /// and tell the observers.
    pub fn reset_views(&mut self, dims: [usize; 3], cursor: Location) {
        for view in self.views_mut() {
            view.reset(dims, cursor);
        }
        self.notify(|o| o.location_changed(&cursor));
        for kind in ViewKind::ALL {
            let state = self.view(kind).state();
            let (pan, zoom) = (state.pan(), state.zoom());
            self.notify(|o| {
                o.pan_changed(kind, &pan);
                o.zoom_changed(kind, zoom);
            });
        }
    }

    /// Shared cursor (both views hold the same location).
    pub fn cursor(&self) -> Location {
        self.axial.state().cursor()
    }

    pub fn add_observer(&mut self, observer: Box<dyn ControlObserver>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Call `f` on every observer.
    pub fn notify(&mut self, mut f: impl FnMut(&mut dyn ControlObserver)) {
        for observer in &mut self.observers {
            f(observer.as_mut());
        }
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("axial", &self.axial)
            .field("coronal", &self.coronal)
            .field("annotations", &self.annotations.dims())
            .field("observers", &self.observers.len())
            .finish()
    }
}
