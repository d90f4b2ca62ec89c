//! mkvsub - Subtitle extraction for Matroska files
//!
//! Reads the track layout printed by `mkvinfo`, resolves the subtitle tracks
//! and extracts them with `mkvextract`.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod tools;
pub mod tracks;
pub mod tree;
pub mod workflow;
