//! AMF0 decoding.

use super::{marker, Object, Value};
use crate::{Error, Result};

/// Maximum object nesting accepted before the payload is rejected.
const MAX_DEPTH: usize = 32;

/// Decode a single value from the start of `data`.
pub fn decode_value(data: &[u8]) -> Result<Value> {
    Decoder::new(data).read_value()
}

/// Cursor over an AMF0 byte sequence.
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left to decode.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Read the next value.
    pub fn read_value(&mut self) -> Result<Value> {
        self.read_nested(0)
    }

    fn read_nested(&mut self, depth: usize) -> Result<Value> {
        let offset = self.pos;
        if depth > MAX_DEPTH {
            return Err(Error::invalid_amf(offset, "objects nested too deeply"));
        }

        match self.read_u8()? {
            marker::NUMBER => Ok(Value::Number(self.read_f64()?)),
            marker::BOOLEAN => Ok(Value::Boolean(self.read_u8()? != 0)),
            marker::STRING => {
                let len = self.read_u16()? as usize;
                Ok(Value::String(self.read_utf8(len)?))
            }
            marker::LONG_STRING => {
                let len = self.read_u32()? as usize;
                Ok(Value::String(self.read_utf8(len)?))
            }
            marker::OBJECT => Ok(Value::Object(self.read_properties(depth, false)?)),
            marker::ECMA_ARRAY => {
                // Count is only a hint; the pairs are terminated like an object.
                let _count = self.read_u32()?;
                Ok(Value::Object(self.read_properties(depth, true)?))
            }
            marker::NULL => Ok(Value::Null),
            marker::UNDEFINED | marker::UNSUPPORTED => Ok(Value::Undefined),
            marker::REFERENCE => Ok(Value::Reference(self.read_u16()?)),
            marker::STRICT_ARRAY => {
                let count = self.read_u32()? as usize;
                // Every element takes at least its marker byte
                let mut items = Vec::with_capacity(count.min(self.remaining()));
                for _ in 0..count {
                    items.push(self.read_nested(depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            marker::DATE => {
                let millis = self.read_f64()?;
                let timezone = self.read_u16()? as i16;
                Ok(Value::Date { millis, timezone })
            }
            marker::XML_DOCUMENT => {
                let len = self.read_u32()? as usize;
                Ok(Value::String(self.read_utf8(len)?))
            }
            marker::TYPED_OBJECT => {
                // Class name is dropped; the properties follow as in an object
                let len = self.read_u16()? as usize;
                self.read_utf8(len)?;
                Ok(Value::Object(self.read_properties(depth, false)?))
            }
            marker::OBJECT_END => Err(Error::invalid_amf(offset, "unexpected object end marker")),
            other => Err(Error::UnsupportedMarker {
                marker: other,
                offset,
            }),
        }
    }

    /// Read name/value pairs up to the end marker.
    ///
    /// Some muxers leave the end marker off ECMA arrays that close the
    /// payload, so `lenient_end` also accepts running out of bytes there.
    fn read_properties(&mut self, depth: usize, lenient_end: bool) -> Result<Object> {
        let mut object = Object::new();

        loop {
            if lenient_end && self.remaining() == 0 {
                return Ok(object);
            }

            let len = self.read_u16()? as usize;
            if len == 0 && self.peek_u8() == Some(marker::OBJECT_END) {
                self.pos += 1;
                return Ok(object);
            }

            let name = self.read_utf8(len)?;
            let value = self.read_nested(depth + 1)?;
            object.insert(name, value);
        }
    }

    fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::invalid_amf(
                self.pos,
                format!("need {} bytes, have {}", len, self.remaining()),
            ));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_f64(&mut self) -> Result<f64> {
        let b = self.take(8)?;
        Ok(f64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn read_utf8(&mut self, len: usize) -> Result<String> {
        let offset = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::invalid_amf(offset, "string is not valid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_number() {
        let mut data = vec![marker::NUMBER];
        data.extend_from_slice(&1920.0f64.to_be_bytes());
        assert_eq!(decode_value(&data).unwrap(), Value::Number(1920.0));
    }

    #[test]
    fn test_decode_string_and_boolean() {
        let data = [marker::STRING, 0, 4, b'c', b'a', b'm', b'1'];
        assert_eq!(decode_value(&data).unwrap(), Value::from("cam1"));

        let data = [marker::BOOLEAN, 1];
        assert_eq!(decode_value(&data).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_decode_ecma_array_as_object() {
        let mut data = vec![marker::ECMA_ARRAY, 0, 0, 0, 2];
        data.extend_from_slice(&[0, 5]);
        data.extend_from_slice(b"width");
        data.push(marker::NUMBER);
        data.extend_from_slice(&640.0f64.to_be_bytes());
        data.extend_from_slice(&[0, 6]);
        data.extend_from_slice(b"height");
        data.push(marker::NUMBER);
        data.extend_from_slice(&360.0f64.to_be_bytes());
        data.extend_from_slice(&[0, 0, marker::OBJECT_END]);

        let value = decode_value(&data).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.get_number("width"), Some(640.0));
        assert_eq!(object.get_number("height"), Some(360.0));
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["width", "height"]);
    }

    #[test]
    fn test_decode_ecma_array_without_end_marker() {
        let mut data = vec![marker::ECMA_ARRAY, 0, 0, 0, 1];
        data.extend_from_slice(&[0, 8]);
        data.extend_from_slice(b"duration");
        data.push(marker::NUMBER);
        data.extend_from_slice(&0.0f64.to_be_bytes());

        let value = decode_value(&data).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_decode_unterminated_object_fails() {
        let mut data = vec![marker::OBJECT];
        data.extend_from_slice(&[0, 1, b'x']);
        data.push(marker::BOOLEAN);
        data.push(0);

        let err = decode_value(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidAmf { .. }));
    }

    #[test]
    fn test_decode_truncated_number() {
        let data = [marker::NUMBER, 0x40, 0x00];
        let err = decode_value(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidAmf { offset: 1, .. }));
    }

    #[test]
    fn test_decode_unsupported_marker() {
        // AVM+ switch
        let data = [0x11, 0x04];
        let err = decode_value(&data).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedMarker {
                marker: 0x11,
                offset: 0
            }
        ));
    }

    #[test]
    fn test_decode_null_and_undefined() {
        assert_eq!(decode_value(&[marker::NULL]).unwrap(), Value::Null);
        assert_eq!(decode_value(&[marker::UNDEFINED]).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_decode_strict_array() {
        let mut data = vec![marker::STRICT_ARRAY, 0, 0, 0, 3];
        data.push(marker::NUMBER);
        data.extend_from_slice(&2.0f64.to_be_bytes());
        data.push(marker::NULL);
        data.extend_from_slice(&[marker::STRING, 0, 2, b'o', b'k']);

        assert_eq!(
            decode_value(&data).unwrap(),
            Value::Array(vec![Value::Number(2.0), Value::Null, Value::from("ok")])
        );
    }

    #[test]
    fn test_decode_strict_array_count_beyond_data() {
        let data = [marker::STRICT_ARRAY, 0xFF, 0xFF, 0xFF, 0xFF, marker::NULL];
        let err = decode_value(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidAmf { offset: 6, .. }));
    }

    #[test]
    fn test_decode_date() {
        let mut data = vec![marker::DATE];
        data.extend_from_slice(&1_700_000_000_000.0f64.to_be_bytes());
        data.extend_from_slice(&(-60i16).to_be_bytes());

        assert_eq!(
            decode_value(&data).unwrap(),
            Value::Date {
                millis: 1_700_000_000_000.0,
                timezone: -60
            }
        );
    }

    #[test]
    fn test_decode_typed_object_keeps_properties() {
        let mut data = vec![marker::TYPED_OBJECT, 0, 3, b'C', b'u', b'e'];
        data.extend_from_slice(&[0, 4]);
        data.extend_from_slice(b"time");
        data.push(marker::NUMBER);
        data.extend_from_slice(&1.5f64.to_be_bytes());
        data.extend_from_slice(&[0, 0, marker::OBJECT_END]);

        let value = decode_value(&data).unwrap();
        assert_eq!(value.as_object().unwrap().get_number("time"), Some(1.5));
    }

    #[test]
    fn test_decode_rejects_deep_nesting() {
        let mut data = Vec::new();
        for _ in 0..=MAX_DEPTH + 1 {
            data.push(marker::OBJECT);
            data.extend_from_slice(&[0, 1, b'n']);
        }
        let err = decode_value(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidAmf { .. }));
    }
}
