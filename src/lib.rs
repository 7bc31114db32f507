//! Movie metadata integration library - shared modules for all binaries.

pub mod config;
pub mod error;
pub mod exact;
pub mod fusion;
pub mod fuzzy;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod safety;
pub mod scoring;
pub mod stats;
pub mod table;
