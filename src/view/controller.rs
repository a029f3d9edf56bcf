//! Per-view slice cache and texture upload.

use nalgebra::{Matrix4, Point2, Vector2};
use ndarray::{Array2, ArrayView2, CowArray, Ix2};

use fattrace_gpu::{GpuError, TextureDesc, TextureKey, TextureUpload};

use crate::annotation::{AnnotationVolume, Layer};
use crate::color_utils::ColorMap;
use crate::constants::{LAYER_COUNT, OVERLAY_ALPHA};
use crate::data::{SliceMode, Volume};
use crate::numeric::{NumericType, ScalarKind};
use crate::view::crosshair::Crosshair;
use crate::view::pixel;
use crate::view::state::{Channel, DirtyFlags, Location, LocationUpdate, ViewState};
use crate::view::transform::{AxisBinding, TransformChain, ViewKind, VolumeAxis};

/// Texture slots per view: two slice channels then one overlay per layer.
const SLOTS_PER_VIEW: usize = 2 + LAYER_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Slice(Channel),
    Overlay(Layer),
}

impl Slot {
    fn index(self) -> usize {
        match self {
            Slot::Slice(channel) => channel.index(),
            Slot::Overlay(layer) => 2 + layer.index(),
        }
    }
}

/// One annotation overlay to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayDraw {
    pub key: TextureKey,
    pub layer: Layer,
    pub color: [u8; 3],
    pub alpha: f32,
}

/// One slice texture to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceDraw {
    pub key: TextureKey,
    pub color_map: ColorMap,
    pub opacity: f32,
}

/// What the renderer needs to draw one view for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    pub view: ViewKind,
    /// Slice textures, primary first
    pub slices: Vec<SliceDraw>,
    pub brightness: f32,
    pub contrast: f32,
    /// Model-view transform
    pub mvp: Matrix4<f64>,
    /// Voxel plane to NDC
    pub volume_transform: Matrix4<f64>,
    pub crosshair: Option<Crosshair>,
    /// Visible overlays in layer order
    pub overlays: Vec<OverlayDraw>,
}

/// State, transforms and texture cache of one slice view.
///
/// `paint` recomputes whatever the dirty flags name. Each texture slot
/// remembers the size it was allocated with, independently of the flags, so
/// an upload of the same size updates in place and anything else allocates.
#[derive(Debug, Clone)]
pub struct ViewController {
    binding: AxisBinding,
    state: ViewState,
    dims: [usize; 3],
    key_base: u32,
    initialized: [Option<(u32, u32)>; SLOTS_PER_VIEW],
    crosshair: Option<Crosshair>,
}

impl ViewController {
    /// Create a controller for a view. `key_base` offsets its texture keys.
    pub fn new(kind: ViewKind, key_base: u32) -> Self {
        Self {
            binding: AxisBinding::for_kind(kind),
            state: ViewState::default(),
            dims: [0; 3],
            key_base,
            initialized: [None; SLOTS_PER_VIEW],
            crosshair: None,
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.binding.kind
    }

    pub fn binding(&self) -> &AxisBinding {
        &self.binding
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Mutable state for setters that do not depend on the view's axes.
    pub fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.state.dirty
    }

    /// Last computed crosshair.
    pub fn crosshair(&self) -> Option<&Crosshair> {
        self.crosshair.as_ref()
    }

    /// Adopt new volume extents: resets pan, zoom and the cursor and marks
    /// every cache dirty. Display settings are kept.
    pub fn reset(&mut self, dims: [usize; 3], cursor: Location) {
        self.dims = dims;
        self.state.cursor = cursor;
        self.state.set_pan(Vector2::zeros());
        self.state.set_zoom(1.0);
        self.state.mark_dirty(DirtyFlags::ALL);
        self.crosshair = None;
    }

    /// Current transform chain.
    pub fn chain(&self) -> TransformChain {
        let mut chain = TransformChain::new(self.binding, self.dims, self.state.viewport());
        chain.pan = self.state.pan();
        chain.zoom = self.state.zoom();
        chain
    }

    /// Move the cursor and return the flags the move set.
    ///
    /// The slicing axis invalidates the slice and every overlay; the axis the
    /// crosshair shows invalidates the crosshair. Other axes change nothing.
    pub fn set_cursor(&mut self, update: &LocationUpdate) -> DirtyFlags {
        let old = self.state.cursor;
        let new = update.apply_to(old);
        self.state.cursor = new;

        let changed = |axis: VolumeAxis| old.get(axis) != new.get(axis);
        let mut flags = DirtyFlags::NONE;
        if changed(self.binding.slicing) {
            flags |= DirtyFlags::SLICE | DirtyFlags::ALL_LAYER_OVERLAYS;
        }
        if changed(self.binding.crosshair()) {
            flags |= DirtyFlags::CROSSHAIR;
        }
        self.state.mark_dirty(flags);
        flags
    }

    /// Record an edit of `layer`'s marks.
    pub fn mark_layer_edited(&mut self, layer: Layer) {
        if layer == self.state.active_layer() {
            self.state.mark_dirty(DirtyFlags::ACTIVE_LAYER_OVERLAY);
        } else {
            self.state.mark_dirty(DirtyFlags::ALL_LAYER_OVERLAYS);
        }
    }

    /// Current slice index along the slicing axis.
    pub fn slice_index(&self) -> usize {
        self.state.cursor.get(self.binding.slicing)
    }

    /// Map a window pixel to volume coordinates `[x, y, z]` on the current
    /// slice, or `None` outside the volume.
    pub fn window_to_volume(&self, p: Point2<f64>) -> Option<[usize; 3]> {
        let plane = self.chain().window_to_voxel(p, true);
        let (w, h) = self.binding.plane_dims(self.dims);
        if plane.x < 0.0 || plane.y < 0.0 || plane.x >= w as f64 || plane.y >= h as f64 {
            return None;
        }
        let lifted = self
            .binding
            .to_volume(Point2::new(plane.x.floor(), plane.y.floor()), self.slice_index() as f64);
        Some(lifted.map(|v| v as usize))
    }

    fn key(&self, slot: Slot) -> TextureKey {
        TextureKey(self.key_base + slot.index() as u32)
    }

    fn is_initialized(&self, slot: Slot) -> bool {
        self.initialized[slot.index()].is_some()
    }

    /// Recompute dirty caches, upload them, and describe the frame.
    ///
    /// A cache that cannot be computed or uploaded keeps its flag and is
    /// retried on the next call.
    pub fn paint(
        &mut self,
        fat: &Volume,
        water: &Volume,
        annotations: &AnnotationVolume,
        uploader: &mut dyn TextureUpload,
    ) -> FrameData {
        let dirty = self.state.dirty;

        if dirty.contains(DirtyFlags::SLICE) && self.refresh_slices(fat, water, uploader) {
            self.state.dirty.remove(DirtyFlags::SLICE);
        }

        if dirty.contains(DirtyFlags::CROSSHAIR) {
            let row = self.state.cursor.get(self.binding.crosshair());
            self.crosshair = Some(Crosshair::compute(&self.chain(), row));
            self.state.dirty.remove(DirtyFlags::CROSSHAIR);
        }

        if dirty.contains(DirtyFlags::ALL_LAYER_OVERLAYS) {
            let ok = Layer::ALL
                .iter()
                .fold(true, |ok, &layer| self.refresh_overlay(layer, annotations, uploader) && ok);
            if ok {
                self.state
                    .dirty
                    .remove(DirtyFlags::ALL_LAYER_OVERLAYS | DirtyFlags::ACTIVE_LAYER_OVERLAY);
            }
        } else if dirty.contains(DirtyFlags::ACTIVE_LAYER_OVERLAY)
            && self.refresh_overlay(self.state.active_layer(), annotations, uploader)
        {
            self.state.dirty.remove(DirtyFlags::ACTIVE_LAYER_OVERLAY);
        }

        self.frame_data()
    }

    /// Slice images for the current slice and display mode, one per texture.
    pub fn slice_images(&self, fat: &Volume, water: &Volume) -> Option<Vec<Array2<f32>>> {
        let index = self.slice_index();
        let (fat_slice, water_slice) = match self.binding.slicing {
            VolumeAxis::Z => (fat.axial_slice(index)?, water.axial_slice(index)?),
            VolumeAxis::Y => (fat.coronal_slice(index)?, water.coronal_slice(index)?),
            VolumeAxis::X => (fat.sagittal_slice(index)?, water.sagittal_slice(index)?),
        };
        Some(pixel::compose(self.state.display_mode(), fat_slice, water_slice))
    }

    /// Overlay marks of `layer` on the current slice.
    pub fn overlay_image<'a>(&self, layer: Layer, annotations: &'a AnnotationVolume) -> Option<CowArray<'a, u8, Ix2>> {
        let index = self.slice_index();
        match self.binding.slicing {
            VolumeAxis::Z => annotations.axial_slice(layer, index, SliceMode::View),
            VolumeAxis::Y => annotations.coronal_slice(layer, index, SliceMode::View),
            VolumeAxis::X => None,
        }
    }

    fn refresh_slices(&mut self, fat: &Volume, water: &Volume, uploader: &mut dyn TextureUpload) -> bool {
        let Some(images) = self.slice_images(fat, water) else {
            log::warn!(
                "{} view: no slice at {}",
                self.binding.kind.name(),
                self.slice_index()
            );
            return false;
        };

        log::debug!(
            "{} view: recomputing slice {} ({:?})",
            self.binding.kind.name(),
            self.slice_index(),
            self.state.display_mode()
        );

        let channels = [Channel::Primary, Channel::Secondary];
        images.iter().zip(channels).fold(true, |ok, (image, channel)| {
            self.upload(Slot::Slice(channel), image.view(), ScalarKind::F32, uploader) && ok
        })
    }

    fn refresh_overlay(
        &mut self,
        layer: Layer,
        annotations: &AnnotationVolume,
        uploader: &mut dyn TextureUpload,
    ) -> bool {
        let slice = self.overlay_image(layer, annotations);
        let Some(slice) = slice else {
            log::warn!(
                "{} view: no {} overlay at {}",
                self.binding.kind.name(),
                layer,
                self.slice_index()
            );
            return false;
        };
        self.upload(Slot::Overlay(layer), slice.view(), ScalarKind::U8, uploader)
    }

    fn upload<A: bytemuck::Pod>(
        &mut self,
        slot: Slot,
        image: ArrayView2<'_, A>,
        kind: ScalarKind,
        uploader: &mut dyn TextureUpload,
    ) -> bool {
        match self.try_upload(slot, image, kind, uploader) {
            Ok(()) => true,
            Err(e) => {
                log::error!(
                    "{} view: upload of {:?} failed: {}",
                    self.binding.kind.name(),
                    slot,
                    e
                );
                false
            }
        }
    }

    fn try_upload<A: bytemuck::Pod>(
        &mut self,
        slot: Slot,
        image: ArrayView2<'_, A>,
        kind: ScalarKind,
        uploader: &mut dyn TextureUpload,
    ) -> fattrace_gpu::Result<()> {
        let entry = NumericType::from_kind(kind, 1)
            .ok_or_else(|| GpuError::Texture(format!("no sample type for {:?}", kind)))?;

        let (rows, cols) = image.dim();
        let size = (cols as u32, rows as u32);
        let image = image.as_standard_layout();
        let texels = image
            .as_slice()
            .ok_or_else(|| GpuError::Texture("slice is not contiguous".to_string()))?;
        let bytes: &[u8] = bytemuck::cast_slice(texels);

        let key = self.key(slot);
        match self.initialized[slot.index()] {
            Some(current) if current == size => uploader.update(key, bytes),
            _ => {
                let desc = TextureDesc::new(size.0, size.1, entry.render_format, entry.render_element);
                uploader.allocate(key, &desc, bytes)?;
                self.initialized[slot.index()] = Some(size);
                Ok(())
            }
        }
    }

    fn frame_data(&self) -> FrameData {
        let slices = [Channel::Primary, Channel::Secondary]
            .into_iter()
            .take(self.state.display_mode().texture_count())
            .filter(|&channel| self.is_initialized(Slot::Slice(channel)))
            .map(|channel| SliceDraw {
                key: self.key(Slot::Slice(channel)),
                color_map: self.state.color_map(channel),
                opacity: self.state.opacity(channel),
            })
            .collect();

        let overlays = Layer::ALL
            .into_iter()
            .filter(|&layer| self.state.layer_visible(layer) && self.is_initialized(Slot::Overlay(layer)))
            .map(|layer| OverlayDraw {
                key: self.key(Slot::Overlay(layer)),
                layer,
                color: layer.color(),
                alpha: OVERLAY_ALPHA,
            })
            .collect();

        let chain = self.chain();
        FrameData {
            view: self.binding.kind,
            slices,
            brightness: self.state.brightness(),
            contrast: self.state.contrast(),
            mvp: chain.mvp(),
            volume_transform: chain.volume(self.binding.volume_flip),
            crosshair: self.crosshair,
            overlays,
        }
    }

    /// Free every texture and forget their sizes; everything is re-uploaded
    /// on the next paint.
    pub fn release_textures(&mut self, uploader: &mut dyn TextureUpload) {
        for (index, slot) in self.initialized.iter_mut().enumerate() {
            if slot.take().is_some() {
                uploader.release(TextureKey(self.key_base + index as u32));
            }
        }
        self.state.mark_dirty(DirtyFlags::ALL);
        log::debug!("{} view: released textures", self.binding.kind.name());
    }
}
