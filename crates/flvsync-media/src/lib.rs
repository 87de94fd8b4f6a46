//! Flvsync-Media: FLV tag framing and AMF0 script data
//!
//! This crate provides the container-level pieces flvsync needs to rewrite a
//! live FLV stream without touching audio or video payloads.
//!
//! # Modules
//!
//! - `flv` - File header and tag framing (streaming reader/writer)
//! - `amf` - AMF0 value model and codec
//! - `script` - Script tag events (`onMetaData` and friends)
//!
//! Payloads of audio and video tags stay opaque byte buffers; only script
//! tags are decoded.

pub mod amf;
pub mod error;
pub mod flv;
pub mod script;

pub use amf::{Object, Value};
pub use error::{Error, Result};
pub use flv::{FileHeader, FlvReader, FlvWriter, Framed, Tag, TagHeader, TagType};
pub use script::{ScriptEvent, SourceMetadata, ON_METADATA};
