//! FLV container framing.
//!
//! An FLV stream is a 9-byte file header, a 4-byte previous-tag-size field
//! for the (absent) tag 0, then a sequence of tags, each followed by its own
//! previous-tag-size field. A tag header is 11 bytes:
//!
//! - type (u8): 8 audio, 9 video, 18 script
//! - payload size (u24)
//! - timestamp (u24 low bits, then u8 extension holding the high bits)
//! - stream id (u24)
//!
//! The reader keeps payloads opaque; only script tags are ever decoded,
//! by [`crate::script`].

mod header;
mod reader;
mod tag;
mod writer;

pub use header::{FileHeader, ANNOTATED_FLAGS, FILE_HEADER_LEN, HEADER_REST_LEN, SIGNATURE};
pub use reader::{read_full, FlvReader, Framed};
pub use tag::{Tag, TagHeader, TagType, MAX_DATA_SIZE, PREVIOUS_TAG_SIZE_LEN, TAG_HEADER_SIZE};
pub use writer::FlvWriter;
