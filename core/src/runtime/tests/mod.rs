//! Tests for the runtime
//!
//! Organized by construct

mod helpers;

mod exiting_tests;
