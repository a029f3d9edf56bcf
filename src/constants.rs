//! Global constants for fattrace

/// Smallest allowed view zoom
pub const MIN_ZOOM: f64 = 0.05;

/// Largest allowed view zoom
pub const MAX_ZOOM: f64 = 3.0;

/// Zoom change applied per wheel notch
pub const DEFAULT_ZOOM_STEP: f64 = 0.05;

/// Number of consecutive pan events folded into one undo step
pub const DEFAULT_PAN_MERGE_LIMIT: usize = 50;

/// Maximum number of commands kept in the undo history
pub const DEFAULT_MAX_HISTORY: usize = 500;

/// Number of annotation layers
pub const LAYER_COUNT: usize = 6;

/// Value written into an annotation voxel when it is marked
pub const MARKED: u8 = 255;

/// Value of an unmarked annotation voxel
pub const UNMARKED: u8 = 0;

/// Default opacity of the primary slice texture
pub const DEFAULT_PRIMARY_OPACITY: f32 = 1.0;

/// Default opacity of the secondary slice texture (dual display)
pub const DEFAULT_SECONDARY_OPACITY: f32 = 0.5;

/// Opacity of annotation overlays
pub const OVERLAY_ALPHA: f32 = 0.6;

/// Thinnest crosshair line in window pixels
pub const MIN_CROSSHAIR_THICKNESS: f64 = 1.0;

/// Subdirectory of an annotation save holding the per-slice timing files
pub const TIMES_DIR: &str = "times";

/// Stitch configuration file name inside a dataset directory
pub const DATASET_CONFIG_FILE: &str = "config.xml";
