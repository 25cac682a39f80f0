//! ReelCut Core Engine
//!
//! Turns a time-aligned transcript into a highlights timeline: windowed
//! classification of cues, then geometric cleanup of the selected spans into
//! a sorted, non-overlapping interval list.

pub mod ai;
pub mod captions;
pub mod config;
pub mod ffmpeg;
pub mod pipeline;
pub mod process;
pub mod selection;
pub mod speakers;
pub mod timeline;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;

#[cfg(test)]
mod tests_destructive;
