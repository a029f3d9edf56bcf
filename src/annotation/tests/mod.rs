//! Tests for annotation persistence.
//!
//! These tests write into temporary directories and check the on-disk format
//! as well as save/load round trips.

mod persist_tests;
