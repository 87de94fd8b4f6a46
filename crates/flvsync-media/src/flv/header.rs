//! FLV file header.

/// Leading signature of every FLV stream.
pub const SIGNATURE: [u8; 3] = *b"FLV";

/// Header size after the signature: version, flags, data offset, and the
/// previous-tag-size field of tag 0.
pub const HEADER_REST_LEN: usize = 1 + 1 + 4 + 4;

/// Full header size including the signature.
pub const FILE_HEADER_LEN: usize = SIGNATURE.len() + HEADER_REST_LEN;

/// Flags value announcing the timing-annotated format downstream.
pub const ANNOTATED_FLAGS: u8 = 0x07;

/// File header following the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u8,
    pub flags: u8,
    /// Offset of the first tag, as written by the muxer.
    pub data_offset: u32,
    /// Previous-tag-size field of tag 0.
    pub tag0_size: u32,
}

impl FileHeader {
    /// Parse the bytes following the signature.
    pub fn parse(b: &[u8; HEADER_REST_LEN]) -> Self {
        Self {
            version: b[0],
            flags: b[1],
            data_offset: u32::from_be_bytes([b[2], b[3], b[4], b[5]]),
            tag0_size: u32::from_be_bytes([b[6], b[7], b[8], b[9]]),
        }
    }

    /// Copy with the flags byte replaced.
    pub fn with_flags(self, flags: u8) -> Self {
        Self { flags, ..self }
    }

    /// Full header including the signature.
    pub fn to_bytes(&self) -> [u8; FILE_HEADER_LEN] {
        let offset = self.data_offset.to_be_bytes();
        let tag0 = self.tag0_size.to_be_bytes();
        [
            SIGNATURE[0],
            SIGNATURE[1],
            SIGNATURE[2],
            self.version,
            self.flags,
            offset[0],
            offset[1],
            offset[2],
            offset[3],
            tag0[0],
            tag0[1],
            tag0[2],
            tag0[3],
        ]
    }

    /// Replace the flags byte in a truncated header remainder, if present.
    pub fn annotate_partial(rest: &mut [u8]) {
        if let Some(flags) = rest.get_mut(1) {
            *flags = ANNOTATED_FLAGS;
        }
    }
}
