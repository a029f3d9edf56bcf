//! Per-view display state and dirty tracking.

use std::ops::{BitOr, BitOrAssign};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::annotation::Layer;
use crate::color_utils::ColorMap;
use crate::constants::{
    DEFAULT_PRIMARY_OPACITY, DEFAULT_SECONDARY_OPACITY, LAYER_COUNT, MAX_ZOOM, MIN_ZOOM,
};
use crate::view::transform::VolumeAxis;

/// Cursor position in voxels; `t` is carried for time series but not shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Location {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub t: usize,
}

impl Location {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z, t: 0 }
    }

    /// Coordinate along a volume axis.
    pub fn get(&self, axis: VolumeAxis) -> usize {
        match axis {
            VolumeAxis::X => self.x,
            VolumeAxis::Y => self.y,
            VolumeAxis::Z => self.z,
        }
    }

    /// The update that sets every axis to this location.
    pub fn to_update(self) -> LocationUpdate {
        LocationUpdate {
            x: Some(self.x),
            y: Some(self.y),
            z: Some(self.z),
            t: Some(self.t),
        }
    }
}

/// Partial cursor change; `None` leaves an axis untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LocationUpdate {
    pub x: Option<usize>,
    pub y: Option<usize>,
    pub z: Option<usize>,
    pub t: Option<usize>,
}

impl LocationUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_x(mut self, x: usize) -> Self {
        self.x = Some(x);
        self
    }

    pub fn with_y(mut self, y: usize) -> Self {
        self.y = Some(y);
        self
    }

    pub fn with_z(mut self, z: usize) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_t(mut self, t: usize) -> Self {
        self.t = Some(t);
        self
    }

    /// Update touching only `axis`.
    pub fn axis(axis: VolumeAxis, value: usize) -> Self {
        match axis {
            VolumeAxis::X => Self::new().with_x(value),
            VolumeAxis::Y => Self::new().with_y(value),
            VolumeAxis::Z => Self::new().with_z(value),
        }
    }

    /// Whether no axis is set.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none() && self.t.is_none()
    }

    /// `location` with this update applied.
    pub fn apply_to(&self, location: Location) -> Location {
        Location {
            x: self.x.unwrap_or(location.x),
            y: self.y.unwrap_or(location.y),
            z: self.z.unwrap_or(location.z),
            t: self.t.unwrap_or(location.t),
        }
    }

    /// Axes set in `other` replace those in `self`.
    pub fn overlay(&self, other: &LocationUpdate) -> LocationUpdate {
        LocationUpdate {
            x: other.x.or(self.x),
            y: other.y.or(self.y),
            z: other.z.or(self.z),
            t: other.t.or(self.t),
        }
    }

    /// Axes unset in `self` are filled from `other`.
    pub fn fill_from(&self, other: &LocationUpdate) -> LocationUpdate {
        other.overlay(self)
    }

    /// The values `location` holds on the axes this update touches.
    pub fn capture(&self, location: Location) -> LocationUpdate {
        LocationUpdate {
            x: self.x.map(|_| location.x),
            y: self.y.map(|_| location.y),
            z: self.z.map(|_| location.z),
            t: self.t.map(|_| location.t),
        }
    }
}

/// How fat and water intensities are combined into slice textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Normalised fat channel
    #[default]
    Fat,
    /// Normalised water channel
    Water,
    /// fat / (fat + water)
    FatFraction,
    /// water / (fat + water)
    WaterFraction,
    /// Fat and water as two blended textures
    FatWater,
}

impl DisplayMode {
    /// Number of slice textures the mode produces.
    pub fn texture_count(self) -> usize {
        match self {
            DisplayMode::FatWater => 2,
            _ => 1,
        }
    }
}

/// Slice texture a colour map or opacity applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Primary,
    Secondary,
}

impl Channel {
    pub fn index(self) -> usize {
        match self {
            Channel::Primary => 0,
            Channel::Secondary => 1,
        }
    }
}

/// Caches a view must recompute before its next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DirtyFlags(u8);

impl DirtyFlags {
    pub const NONE: DirtyFlags = DirtyFlags(0);
    /// Slice textures
    pub const SLICE: DirtyFlags = DirtyFlags(1);
    /// Crosshair geometry
    pub const CROSSHAIR: DirtyFlags = DirtyFlags(1 << 1);
    /// Overlay of the active layer
    pub const ACTIVE_LAYER_OVERLAY: DirtyFlags = DirtyFlags(1 << 2);
    /// Overlays of every layer
    pub const ALL_LAYER_OVERLAYS: DirtyFlags = DirtyFlags(1 << 3);
    pub const ALL: DirtyFlags = DirtyFlags(0b1111);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every flag in `other` is set.
    pub fn contains(self, other: DirtyFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any flag in `other` is set.
    pub fn intersects(self, other: DirtyFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: DirtyFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: DirtyFlags) {
        self.0 &= !other.0;
    }
}

impl BitOr for DirtyFlags {
    type Output = DirtyFlags;

    fn bitor(self, rhs: DirtyFlags) -> DirtyFlags {
        DirtyFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for DirtyFlags {
    fn bitor_assign(&mut self, rhs: DirtyFlags) {
        self.0 |= rhs.0;
    }
}

/// Everything the user can change about one view.
///
/// Setters record which caches the change invalidates. Cursor changes depend
/// on the view's axes and go through `ViewController::set_cursor`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub(crate) cursor: Location,
    display_mode: DisplayMode,
    color_maps: [ColorMap; 2],
    opacities: [f32; 2],
    brightness: f32,
    contrast: f32,
    pan: Vector2<f64>,
    zoom: f64,
    active_layer: Layer,
    layer_visible: [bool; LAYER_COUNT],
    viewport: (u32, u32),
    pub(crate) dirty: DirtyFlags,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            cursor: Location::default(),
            display_mode: DisplayMode::default(),
            color_maps: [ColorMap::Gray, ColorMap::Hot],
            opacities: [DEFAULT_PRIMARY_OPACITY, DEFAULT_SECONDARY_OPACITY],
            brightness: 0.0,
            contrast: 1.0,
            pan: Vector2::zeros(),
            zoom: 1.0,
            active_layer: Layer::Eat,
            layer_visible: [true; LAYER_COUNT],
            viewport: (1, 1),
            dirty: DirtyFlags::ALL,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Location {
        self.cursor
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn color_map(&self, channel: Channel) -> ColorMap {
        self.color_maps[channel.index()]
    }

    pub fn opacity(&self, channel: Channel) -> f32 {
        self.opacities[channel.index()]
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn pan(&self) -> Vector2<f64> {
        self.pan
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn active_layer(&self) -> Layer {
        self.active_layer
    }

    pub fn layer_visible(&self, layer: Layer) -> bool {
        self.layer_visible[layer.index()]
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Mark caches for recomputation.
    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty.insert(flags);
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
        self.dirty.insert(DirtyFlags::SLICE);
    }

    pub fn set_color_map(&mut self, channel: Channel, map: ColorMap) {
        self.color_maps[channel.index()] = map;
    }

    /// Set an opacity, clamped to [0, 1].
    pub fn set_opacity(&mut self, channel: Channel, opacity: f32) {
        self.opacities[channel.index()] = opacity.clamp(0.0, 1.0);
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.brightness = brightness;
    }

    pub fn set_contrast(&mut self, contrast: f32) {
        self.contrast = contrast;
    }

    pub fn set_pan(&mut self, pan: Vector2<f64>) {
        self.pan = pan;
        self.dirty.insert(DirtyFlags::CROSSHAIR);
    }

    /// Set the zoom, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
        self.dirty.insert(DirtyFlags::CROSSHAIR);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
        self.dirty.insert(DirtyFlags::CROSSHAIR);
    }

    pub fn set_active_layer(&mut self, layer: Layer) {
        self.active_layer = layer;
        self.dirty.insert(DirtyFlags::ACTIVE_LAYER_OVERLAY);
    }

    /// Show or hide a layer. Hidden overlays keep refreshing.
    pub fn set_layer_visible(&mut self, layer: Layer, visible: bool) {
        self.layer_visible[layer.index()] = visible;
    }
}

/// Clamp a zoom factor to `[MIN_ZOOM, MAX_ZOOM]`.
pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}
