//! Output helpers shared by the library and the command line

pub mod display;

pub use display::{BoardLayout, Color, ColorOutput, PuzzleFormatter};
