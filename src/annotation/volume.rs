//! Six-layer voxel annotation storage.

use std::time::Duration;

use ndarray::{Array3, Axis, CowArray, Ix2};

use crate::annotation::Layer;
use crate::constants::{LAYER_COUNT, MARKED, UNMARKED};
use crate::data::SliceMode;

/// Marks and per-slice drawing time for every layer.
///
/// Each layer is a `(z, y, x)` byte array holding `MARKED` or `UNMARKED`.
#[derive(Debug, Clone, Default)]
pub struct AnnotationVolume {
    layers: Vec<Array3<u8>>,
    times: Vec<Vec<Duration>>,
}

impl AnnotationVolume {
    /// Create an empty, unallocated volume.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zero-filled volume of the given extents.
    pub fn with_dims(x: usize, y: usize, z: usize) -> Self {
        let mut volume = Self::new();
        volume.allocate(x, y, z);
        volume
    }

    /// Zero-fill every layer to `(z, y, x)` and reset all timers.
    pub fn allocate(&mut self, x: usize, y: usize, z: usize) {
        self.layers = (0..LAYER_COUNT).map(|_| Array3::zeros((z, y, x))).collect();
        self.times = vec![vec![Duration::ZERO; z]; LAYER_COUNT];
        log::debug!("Allocated annotation volume {}x{}x{}", x, y, z);
    }

    /// Whether `allocate` has been called.
    pub fn is_allocated(&self) -> bool {
        !self.layers.is_empty()
    }

    /// Extents as `[x, y, z]`, zero when unallocated.
    pub fn dims(&self) -> [usize; 3] {
        self.layers
            .first()
            .map(|layer| {
                let (z, y, x) = layer.dim();
                [x, y, z]
            })
            .unwrap_or([0; 3])
    }

    /// Extent along Z.
    pub fn z_dim(&self) -> usize {
        self.dims()[2]
    }

    /// Whether `(x, y, z)` lies inside the volume.
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        let [xd, yd, zd] = self.dims();
        x < xd && y < yd && z < zd
    }

    /// Mark one voxel. Panics when out of range.
    pub fn set(&mut self, layer: Layer, x: usize, y: usize, z: usize) {
        self.layers[layer.index()][[z, y, x]] = MARKED;
    }

    /// Unmark one voxel. Panics when out of range.
    pub fn reset(&mut self, layer: Layer, x: usize, y: usize, z: usize) {
        self.layers[layer.index()][[z, y, x]] = UNMARKED;
    }

    /// Whether a voxel is marked; `false` outside the volume.
    pub fn is_marked(&self, layer: Layer, x: usize, y: usize, z: usize) -> bool {
        self.layers
            .get(layer.index())
            .and_then(|data| data.get([z, y, x]))
            .is_some_and(|&v| v != UNMARKED)
    }

    /// Whole array of one layer.
    pub fn layer(&self, layer: Layer) -> Option<&Array3<u8>> {
        self.layers.get(layer.index())
    }

    /// Layer marks at fixed Z, indexed `(y, x)`.
    pub fn axial_slice(&self, layer: Layer, z: usize, mode: SliceMode) -> Option<CowArray<'_, u8, Ix2>> {
        self.slice_along(layer, Axis(0), z, mode)
    }

    /// Layer marks at fixed Y, indexed `(z, x)`.
    pub fn coronal_slice(&self, layer: Layer, y: usize, mode: SliceMode) -> Option<CowArray<'_, u8, Ix2>> {
        self.slice_along(layer, Axis(1), y, mode)
    }

    fn slice_along(
        &self,
        layer: Layer,
        axis: Axis,
        index: usize,
        mode: SliceMode,
    ) -> Option<CowArray<'_, u8, Ix2>> {
        let data = self.layers.get(layer.index())?;
        if index >= data.len_of(axis) {
            return None;
        }
        let view = data.index_axis(axis, index);
        Some(match mode {
            SliceMode::View => CowArray::from(view),
            SliceMode::Clone => CowArray::from(view.to_owned()),
        })
    }

    /// Whether any layer holds a mark.
    pub fn has_any_marks(&self) -> bool {
        Layer::ALL.iter().any(|&layer| self.has_marks(layer))
    }

    /// Whether one layer holds a mark.
    pub fn has_marks(&self, layer: Layer) -> bool {
        self.layer(layer)
            .is_some_and(|data| data.iter().any(|&v| v != UNMARKED))
    }

    /// Number of marked voxels in a layer.
    pub fn marked_count(&self, layer: Layer) -> usize {
        self.layer(layer)
            .map_or(0, |data| data.iter().filter(|&&v| v != UNMARKED).count())
    }

    /// Marked voxels of a layer as `(x, y, z)`, sorted by `(z, y, x)`.
    pub fn marked_points(&self, layer: Layer) -> Vec<[usize; 3]> {
        self.layer(layer)
            .map(|data| {
                data.indexed_iter()
                    .filter(|&(_, &v)| v != UNMARKED)
                    .map(|((z, y, x), _)| [x, y, z])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Unmark every voxel of a layer and zero its timers.
    pub fn clear_layer(&mut self, layer: Layer) {
        if let Some(data) = self.layers.get_mut(layer.index()) {
            data.fill(UNMARKED);
        }
        if let Some(times) = self.times.get_mut(layer.index()) {
            times.fill(Duration::ZERO);
        }
    }

    /// Drawing time spent on slice `z`; zero outside the volume.
    pub fn slice_time(&self, layer: Layer, z: usize) -> Duration {
        self.times
            .get(layer.index())
            .and_then(|times| times.get(z))
            .copied()
            .unwrap_or_default()
    }

    /// Per-slice drawing times of a layer.
    pub fn slice_times(&self, layer: Layer) -> &[Duration] {
        self.times
            .get(layer.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Add drawing time to slice `z`. Ignored outside the volume.
    pub fn add_slice_time(&mut self, layer: Layer, z: usize, elapsed: Duration) {
        if let Some(t) = self.times.get_mut(layer.index()).and_then(|times| times.get_mut(z)) {
            *t += elapsed;
        }
    }

    /// Overwrite the drawing time of slice `z`. Ignored outside the volume.
    pub fn set_slice_time(&mut self, layer: Layer, z: usize, time: Duration) {
        if let Some(t) = self.times.get_mut(layer.index()).and_then(|times| times.get_mut(z)) {
            *t = time;
        }
    }

    /// Total drawing time of a layer.
    pub fn total_time(&self, layer: Layer) -> Duration {
        self.slice_times(layer).iter().sum()
    }
}
