//! Tests for view controllers against a recording texture uploader.

mod controller_tests;

pub(crate) use recording::{RecordingUploader, UploadEvent};
