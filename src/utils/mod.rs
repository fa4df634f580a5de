//! Utility functions.
//!
//! This module provides:
//! - Error message sanitization
//! - Byte formatting and character-safe truncation for inline bodies

pub mod sanitize;
mod text;

pub use text::{format_bytes, truncate_chars};
