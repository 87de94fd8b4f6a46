//! flvsync - live FLV rewriter
//!
//! Reads an FLV stream, replaces its metadata announcement, injects
//! clock-sync and bandwidth-budget script tags, and follows every tag with a
//! wall-clock timing trailer.

pub mod clock;
pub mod config;
pub mod inspect;
pub mod rewriter;
