//! Streaming FLV writer.

use super::header::FileHeader;
use super::tag::Tag;
use crate::Result;
use bytes::BytesMut;
use std::io::Write;

/// Writes framed FLV units to a byte sink, counting bytes written.
pub struct FlvWriter<W> {
    writer: W,
    bytes_written: u64,
}

impl<W: Write> FlvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write the full file header, signature included.
    pub fn write_header(&mut self, header: &FileHeader) -> Result<()> {
        self.write_raw(&header.to_bytes())
    }

    /// Write a tag header and payload (no previous-tag-size field).
    pub fn write_tag(&mut self, tag: &Tag) -> Result<()> {
        let mut buf = BytesMut::with_capacity(tag.payload.len() + super::TAG_HEADER_SIZE);
        tag.encode(&mut buf);
        self.write_raw(&buf)
    }

    /// Write bytes verbatim.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
