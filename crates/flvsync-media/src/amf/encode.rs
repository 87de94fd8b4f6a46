//! AMF0 encoding.

use super::{marker, Object, Value};
use crate::{Error, Result};
use bytes::{BufMut, BytesMut};

/// Encode `value` with its type marker.
///
/// Strings longer than `u16::MAX` bytes are written as long strings.
pub fn encode_value(buf: &mut BytesMut, value: &Value) -> Result<()> {
    match value {
        Value::Number(n) => {
            buf.put_u8(marker::NUMBER);
            buf.put_f64(*n);
        }
        Value::Boolean(b) => {
            buf.put_u8(marker::BOOLEAN);
            buf.put_u8(u8::from(*b));
        }
        Value::String(s) => match u16::try_from(s.len()) {
            Ok(len) => {
                buf.put_u8(marker::STRING);
                buf.put_u16(len);
                buf.put_slice(s.as_bytes());
            }
            Err(_) => {
                let len = u32::try_from(s.len())
                    .map_err(|_| Error::invalid_amf(buf.len(), "string exceeds 4 GiB"))?;
                buf.put_u8(marker::LONG_STRING);
                buf.put_u32(len);
                buf.put_slice(s.as_bytes());
            }
        },
        Value::Object(object) => {
            buf.put_u8(marker::OBJECT);
            encode_properties(buf, object)?;
        }
        Value::Null => buf.put_u8(marker::NULL),
        Value::Undefined => buf.put_u8(marker::UNDEFINED),
        Value::Reference(index) => {
            buf.put_u8(marker::REFERENCE);
            buf.put_u16(*index);
        }
        Value::Array(items) => {
            let count = u32::try_from(items.len())
                .map_err(|_| Error::invalid_amf(buf.len(), "array has too many elements"))?;
            buf.put_u8(marker::STRICT_ARRAY);
            buf.put_u32(count);
            for item in items {
                encode_value(buf, item)?;
            }
        }
        Value::Date { millis, timezone } => {
            buf.put_u8(marker::DATE);
            buf.put_f64(*millis);
            buf.put_i16(*timezone);
        }
    }
    Ok(())
}

/// Write a marker-less UTF-8 name (u16 length prefix).
pub fn write_name(buf: &mut BytesMut, name: &str) -> Result<()> {
    let len = u16::try_from(name.len())
        .map_err(|_| Error::invalid_amf(buf.len(), format!("name of {} bytes too long", name.len())))?;
    buf.put_u16(len);
    buf.put_slice(name.as_bytes());
    Ok(())
}

fn encode_properties(buf: &mut BytesMut, object: &Object) -> Result<()> {
    for (name, value) in object.iter() {
        write_name(buf, name)?;
        encode_value(buf, value)?;
    }
    // Empty name followed by the end marker
    buf.put_u16(0);
    buf.put_u8(marker::OBJECT_END);
    Ok(())
}
