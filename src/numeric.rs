//! Sample type registry.
//!
//! A logical sample type (scalar kind and channel count) has three external
//! names: the NIfTI `datatype` code a scan file carries, a packed array
//! element code, and the format/element pair used for GPU uploads. This
//! module is the single table translating between them.
//!
//! Packed array codes store the depth in the low three bits and
//! `channels - 1` above them.

use fattrace_gpu::{RenderElementType, RenderFormat};

/// Scalar kind of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Unsigned 8-bit integer
    U8,
    /// Signed 8-bit integer
    I8,
    /// Unsigned 16-bit integer
    U16,
    /// Signed 16-bit integer
    I16,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 32-bit integer
    I32,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
}

impl ScalarKind {
    /// Depth value used in packed array codes.
    pub const fn depth(self) -> i32 {
        match self {
            ScalarKind::U8 => 0,
            ScalarKind::I8 => 1,
            ScalarKind::U16 => 2,
            ScalarKind::I16 => 3,
            ScalarKind::I32 => 4,
            ScalarKind::F32 => 5,
            ScalarKind::F64 => 6,
            ScalarKind::U32 => 7,
        }
    }

    /// Size of one scalar in bytes.
    pub const fn size_bytes(self) -> usize {
        match self {
            ScalarKind::U8 | ScalarKind::I8 => 1,
            ScalarKind::U16 | ScalarKind::I16 => 2,
            ScalarKind::U32 | ScalarKind::I32 | ScalarKind::F32 => 4,
            ScalarKind::F64 => 8,
        }
    }

    const fn render_element(self) -> RenderElementType {
        match self {
            ScalarKind::U8 => RenderElementType::U8,
            ScalarKind::I8 => RenderElementType::I8,
            ScalarKind::U16 => RenderElementType::U16,
            ScalarKind::I16 => RenderElementType::I16,
            ScalarKind::U32 => RenderElementType::U32,
            ScalarKind::I32 => RenderElementType::I32,
            ScalarKind::F32 => RenderElementType::F32,
            ScalarKind::F64 => RenderElementType::F64,
        }
    }

    const fn range(self) -> (f64, f64) {
        match self {
            ScalarKind::U8 => (u8::MIN as f64, u8::MAX as f64),
            ScalarKind::I8 => (i8::MIN as f64, i8::MAX as f64),
            ScalarKind::U16 => (u16::MIN as f64, u16::MAX as f64),
            ScalarKind::I16 => (i16::MIN as f64, i16::MAX as f64),
            ScalarKind::U32 => (u32::MIN as f64, u32::MAX as f64),
            ScalarKind::I32 => (i32::MIN as f64, i32::MAX as f64),
            ScalarKind::F32 => (f32::MIN as f64, f32::MAX as f64),
            ScalarKind::F64 => (f64::MIN, f64::MAX),
        }
    }
}

/// One row of the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericTypeEntry {
    /// Scalar kind of each channel
    pub kind: ScalarKind,
    /// Channels per sample (1-4)
    pub channels: u8,
    /// Channel layout for GPU uploads
    pub render_format: RenderFormat,
    /// Element type for GPU uploads
    pub render_element: RenderElementType,
    /// Packed array element code including channels
    pub array_code: i32,
    /// Packed array element code of a single channel
    pub array_code_no_channel: i32,
    /// NIfTI datatype code, if the file format can express this type
    pub source_code: Option<i16>,
    /// Smallest representable value
    pub min: f64,
    /// Largest representable value
    pub max: f64,
}

impl NumericTypeEntry {
    const fn new(kind: ScalarKind, channels: u8, source_code: Option<i16>) -> Self {
        let render_format = match channels {
            1 => RenderFormat::Red,
            2 => RenderFormat::Rg,
            3 => RenderFormat::Rgb,
            _ => RenderFormat::Rgba,
        };
        let (min, max) = kind.range();
        Self {
            kind,
            channels,
            render_format,
            render_element: kind.render_element(),
            array_code: pack(kind.depth(), channels),
            array_code_no_channel: kind.depth(),
            source_code,
            min,
            max,
        }
    }

    /// Bytes per sample across all channels.
    pub fn bytes_per_sample(&self) -> usize {
        self.kind.size_bytes() * self.channels as usize
    }
}

const fn pack(depth: i32, channels: u8) -> i32 {
    depth | ((channels as i32 - 1) << 3)
}

// NIfTI datatype codes
const DT_UINT8: i16 = 2;
const DT_INT16: i16 = 4;
const DT_INT32: i16 = 8;
const DT_FLOAT32: i16 = 16;
const DT_FLOAT64: i16 = 64;
const DT_RGB24: i16 = 128;
const DT_INT8: i16 = 256;
const DT_UINT16: i16 = 512;
const DT_UINT32: i16 = 768;
const DT_RGBA32: i16 = 2304;

macro_rules! rows {
    ($($kind:ident: [$c1:expr, $c2:expr, $c3:expr, $c4:expr]),* $(,)?) => {
        [$(
            NumericTypeEntry::new(ScalarKind::$kind, 1, $c1),
            NumericTypeEntry::new(ScalarKind::$kind, 2, $c2),
            NumericTypeEntry::new(ScalarKind::$kind, 3, $c3),
            NumericTypeEntry::new(ScalarKind::$kind, 4, $c4),
        )*]
    };
}

static TABLE: [NumericTypeEntry; 32] = rows! {
    U8: [Some(DT_UINT8), None, Some(DT_RGB24), Some(DT_RGBA32)],
    I8: [Some(DT_INT8), None, None, None],
    U16: [Some(DT_UINT16), None, None, None],
    I16: [Some(DT_INT16), None, None, None],
    U32: [Some(DT_UINT32), None, None, None],
    I32: [Some(DT_INT32), None, None, None],
    F32: [Some(DT_FLOAT32), None, None, None],
    F64: [Some(DT_FLOAT64), None, None, None],
};

/// Lookup functions over the registry.
pub struct NumericType;

impl NumericType {
    /// All registry rows.
    pub fn all() -> &'static [NumericTypeEntry] {
        &TABLE
    }

    /// Resolve a NIfTI datatype code.
    pub fn from_source_code(code: i16) -> Option<&'static NumericTypeEntry> {
        TABLE.iter().find(|e| e.source_code == Some(code))
    }

    /// Resolve a packed array element code (depth and channels).
    pub fn from_array_code(code: i32) -> Option<&'static NumericTypeEntry> {
        TABLE.iter().find(|e| e.array_code == code)
    }

    /// Resolve a single-channel depth code combined with a channel count.
    pub fn from_depth_channels(depth: i32, channels: u8) -> Option<&'static NumericTypeEntry> {
        TABLE
            .iter()
            .find(|e| e.array_code_no_channel == depth && e.channels == channels)
    }

    /// Resolve a scalar kind and channel count.
    pub fn from_kind(kind: ScalarKind, channels: u8) -> Option<&'static NumericTypeEntry> {
        TABLE.iter().find(|e| e.kind == kind && e.channels == channels)
    }
}
