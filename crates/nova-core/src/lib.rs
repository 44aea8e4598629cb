//! Core shared types for Nova.
//!
//! This crate is intentionally small: a text model (positions, ranges, line index) and the
//! [`TextDocument`] accessor analyzers use to turn syntax-tree offsets into editor ranges.

mod document;
mod text;

pub use document::{BadLocation, TextDocument};
pub use text::{LineIndex, Position, Range, TextRange, TextSize};
