//! fattrace - fat/water MRI tracing
//!
//! Loads the upper and lower fat and water scans of a subject, stitches them
//! into two volumes, and lets the user trace six fat depots slice by slice in
//! an axial and a coronal view. Every change is undoable, and the traced
//! layers are saved as plain text point lists with per-slice drawing times.

pub mod annotation;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod export;
pub mod numeric;
pub mod session;
pub mod undo;
pub mod view;

pub use error::{Result, TraceError};
pub use session::Session;
