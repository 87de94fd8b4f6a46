//! Streaming FLV reader.

use super::header::{FileHeader, HEADER_REST_LEN, SIGNATURE};
use super::tag::{Tag, TagHeader, PREVIOUS_TAG_SIZE_LEN, TAG_HEADER_SIZE};
use crate::{Error, Result};
use bytes::Bytes;
use std::io::{self, Read};

/// Outcome of reading one framed unit.
///
/// A short read is the normal way a live stream ends, so it is a value
/// rather than an error. `EndOfStream` holds whatever bytes were read before
/// the input ran dry (empty on a clean boundary).
#[derive(Debug, Clone, PartialEq)]
pub enum Framed<T> {
    Complete(T),
    EndOfStream(Vec<u8>),
}

/// Read until `buf` is full or the reader is exhausted.
///
/// Returns the number of bytes read; less than `buf.len()` only at end of
/// input.
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Pulls the file header and then one tag at a time from a byte stream.
pub struct FlvReader<R> {
    reader: R,
    bytes_read: u64,
}

impl<R: Read> FlvReader<R> {
    /// Create a new FLV reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            bytes_read: 0,
        }
    }

    /// Total bytes consumed from the input.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read and verify the file header.
    ///
    /// A missing signature is an error. A short read after the signature
    /// yields `EndOfStream` with the bytes that followed it.
    pub fn read_header(&mut self) -> Result<Framed<FileHeader>> {
        let mut signature = [0u8; SIGNATURE.len()];
        let n = self.fill(&mut signature)?;
        if n < signature.len() || signature != SIGNATURE {
            return Err(Error::InvalidSignature {
                found: signature[..n].to_vec(),
            });
        }

        let mut rest = [0u8; HEADER_REST_LEN];
        let n = self.fill(&mut rest)?;
        if n < rest.len() {
            return Ok(Framed::EndOfStream(rest[..n].to_vec()));
        }

        Ok(Framed::Complete(FileHeader::parse(&rest)))
    }

    /// Read the next tag header and payload.
    ///
    /// The previous-tag-size field that follows is left in the stream; call
    /// [`read_previous_tag_size`](Self::read_previous_tag_size) next.
    pub fn read_tag(&mut self) -> Result<Framed<Tag>> {
        let mut header_bytes = [0u8; TAG_HEADER_SIZE];
        let n = self.fill(&mut header_bytes)?;
        if n < header_bytes.len() {
            return Ok(Framed::EndOfStream(header_bytes[..n].to_vec()));
        }

        let header = TagHeader::parse(&header_bytes);
        let mut payload = vec![0u8; header.data_size as usize];
        let n = self.fill(&mut payload)?;
        if n < payload.len() {
            tracing::debug!(
                tag_type = %header.tag_type,
                declared = header.data_size,
                read = n,
                "Tag payload truncated"
            );
            let mut partial = Vec::with_capacity(TAG_HEADER_SIZE + n);
            partial.extend_from_slice(&header_bytes);
            partial.extend_from_slice(&payload[..n]);
            return Ok(Framed::EndOfStream(partial));
        }

        Ok(Framed::Complete(Tag {
            header,
            payload: Bytes::from(payload),
        }))
    }

    /// Read the 4-byte previous-tag-size field, kept as raw bytes.
    pub fn read_previous_tag_size(&mut self) -> Result<Framed<[u8; PREVIOUS_TAG_SIZE_LEN]>> {
        self.read_array()
    }

    /// Read `N` raw bytes, e.g. data that is not part of the FLV framing.
    pub fn read_array<const N: usize>(&mut self) -> Result<Framed<[u8; N]>> {
        let mut field = [0u8; N];
        let n = self.fill(&mut field)?;
        if n < N {
            return Ok(Framed::EndOfStream(field[..n].to_vec()));
        }
        Ok(Framed::Complete(field))
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = read_full(&mut self.reader, buf)?;
        self.bytes_read += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flv::TagType;
    use std::io::Cursor;

    fn header_bytes() -> Vec<u8> {
        let mut data = b"FLV".to_vec();
        data.extend_from_slice(&[1, 5, 0, 0, 0, 9, 0, 0, 0, 0]);
        data
    }

    /// Reader yielding at most one byte per call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[test]
    fn test_read_full_loops_over_short_reads() {
        let data = [1u8, 2, 3, 4, 5];
        let mut reader = Trickle(&data);
        let mut buf = [0u8; 4];
        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 4);
        assert_eq!(buf, [1, 2, 3, 4]);

        let mut buf = [0u8; 4];
        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 1);
    }

    #[test]
    fn test_read_header() {
        let mut reader = FlvReader::new(Cursor::new(header_bytes()));
        match reader.read_header().unwrap() {
            Framed::Complete(header) => {
                assert_eq!(header.version, 1);
                assert_eq!(header.flags, 5);
                assert_eq!(header.data_offset, 9);
            }
            other => panic!("expected header, got {:?}", other),
        }
        assert_eq!(reader.bytes_read(), 13);
    }

    #[test]
    fn test_read_header_bad_signature() {
        let mut reader = FlvReader::new(Cursor::new(b"RIFF0000".to_vec()));
        let err = reader.read_header().unwrap_err();
        assert!(matches!(err, Error::InvalidSignature { .. }));
    }

    #[test]
    fn test_read_header_empty_input() {
        let mut reader = FlvReader::new(Cursor::new(Vec::new()));
        let err = reader.read_header().unwrap_err();
        assert!(matches!(err, Error::InvalidSignature { found } if found.is_empty()));
    }

    #[test]
    fn test_read_header_truncated_after_signature() {
        let mut reader = FlvReader::new(Cursor::new(b"FLV\x01\x05".to_vec()));
        assert_eq!(reader.read_header().unwrap(), Framed::EndOfStream(vec![1, 5]));
    }

    #[test]
    fn test_read_tag_and_previous_size() {
        let mut data = vec![9, 0, 0, 3, 0, 0, 100, 0, 0, 0, 0, 0x17, 0x01, 0x00];
        data.extend_from_slice(&14u32.to_be_bytes());
        let mut reader = FlvReader::new(Trickle(&data));

        let tag = match reader.read_tag().unwrap() {
            Framed::Complete(tag) => tag,
            other => panic!("expected tag, got {:?}", other),
        };
        assert_eq!(tag.tag_type(), TagType::Video);
        assert_eq!(tag.timestamp(), 100);
        assert_eq!(&tag.payload[..], &[0x17, 0x01, 0x00]);

        assert_eq!(
            reader.read_previous_tag_size().unwrap(),
            Framed::Complete([0, 0, 0, 14])
        );
        assert_eq!(reader.read_tag().unwrap(), Framed::EndOfStream(Vec::new()));
    }

    #[test]
    fn test_read_tag_truncated_payload_returns_partial() {
        let data = vec![8, 0, 0, 10, 0, 0, 0, 0, 0, 0, 0, 0xAF, 0x01];
        let mut reader = FlvReader::new(Cursor::new(data.clone()));
        assert_eq!(reader.read_tag().unwrap(), Framed::EndOfStream(data));
    }

    #[test]
    fn test_read_tag_truncated_header_returns_partial() {
        let data = vec![8, 0, 0];
        let mut reader = FlvReader::new(Cursor::new(data.clone()));
        assert_eq!(reader.read_tag().unwrap(), Framed::EndOfStream(data));
    }

    #[test]
    fn test_read_array_short() {
        let mut reader = FlvReader::new(Cursor::new(vec![1u8, 2, 3, 4, 5, 6]));
        assert_eq!(reader.read_array::<4>().unwrap(), Framed::Complete([1, 2, 3, 4]));
        assert_eq!(reader.read_array::<4>().unwrap(), Framed::EndOfStream(vec![5, 6]));
        assert_eq!(reader.bytes_read(), 6);
    }
}
