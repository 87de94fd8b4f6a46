//! Script tag (type 18) events.
//!
//! A script tag payload is an AMF0 event name string followed by the event
//! arguments, in practice a single object or ECMA array.

use crate::amf::{self, Decoder, Object, Value};
use crate::flv::{TagHeader, TagType, MAX_DATA_SIZE, PREVIOUS_TAG_SIZE_LEN, TAG_HEADER_SIZE};
use crate::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// Name of the stream metadata event.
pub const ON_METADATA: &str = "onMetaData";

/// A named script event.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptEvent {
    pub name: String,
    pub value: Value,
}

impl ScriptEvent {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Decode a script tag payload.
    ///
    /// Events without arguments decode to an empty object. Values after the
    /// first argument are ignored.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(payload);
        let name = read_name(&mut decoder)?;

        let value = if decoder.remaining() == 0 {
            Value::Object(Object::new())
        } else {
            decoder.read_value()?
        };

        Ok(Self { name, value })
    }

    /// Decode only the event name, leaving the arguments untouched.
    pub fn decode_name(payload: &[u8]) -> Result<String> {
        read_name(&mut Decoder::new(payload))
    }

    /// The event arguments as an object, if they are one.
    pub fn object(&self) -> Option<&Object> {
        self.value.as_object()
    }

    /// Encode the AMF0 payload: name string then the value.
    pub fn encode_payload(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(256);
        amf::encode_value(&mut buf, &Value::String(self.name.clone()))?;
        amf::encode_value(&mut buf, &self.value)?;
        Ok(buf.freeze())
    }

    /// Encode a complete script tag: header, payload and the trailing
    /// previous-tag-size field describing this tag.
    pub fn encode_tag(&self, timestamp: i32) -> Result<Bytes> {
        let payload = self.encode_payload()?;
        let data_size = u32::try_from(payload.len())
            .ok()
            .filter(|size| *size <= MAX_DATA_SIZE)
            .ok_or(Error::PayloadTooLarge(payload.len()))?;

        let header = TagHeader {
            tag_type: TagType::Script,
            data_size,
            timestamp,
            stream_id: 0,
        };

        let mut buf =
            BytesMut::with_capacity(TAG_HEADER_SIZE + payload.len() + PREVIOUS_TAG_SIZE_LEN);
        buf.put_slice(&header.to_bytes());
        buf.put_slice(&payload);
        buf.put_u32(header.tag_size());
        Ok(buf.freeze())
    }
}

fn read_name(decoder: &mut Decoder<'_>) -> Result<String> {
    match decoder.read_value()? {
        Value::String(name) => Ok(name),
        other => Err(Error::invalid_amf(
            0,
            format!("event name is a {}, expected string", other.kind()),
        )),
    }
}

/// Fields read from a source `onMetaData` event.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMetadata {
    /// `streamName`, when the source carries one.
    pub stream_name: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl SourceMetadata {
    /// Extract the stream name and video dimensions.
    ///
    /// `width` and `height` are required and must be non-negative whole
    /// numbers. Other fields are ignored, whatever their type.
    pub fn from_event(event: &ScriptEvent) -> Result<Self> {
        let object = event
            .object()
            .ok_or_else(|| Error::field_type(&event.name, "arguments", "object"))?;

        let stream_name = match object.get("streamName") {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(Error::field_type(&event.name, "streamName", "string")),
        };

        Ok(Self {
            stream_name,
            width: dimension(event, object, "width")?,
            height: dimension(event, object, "height")?,
        })
    }
}

fn dimension(event: &ScriptEvent, object: &Object, field: &'static str) -> Result<u32> {
    let value = object
        .get(field)
        .ok_or_else(|| Error::missing_field(&event.name, field))?;
    match value.as_number() {
        Some(n) if n.fract() == 0.0 && n >= 0.0 && n <= f64::from(u32::MAX) => Ok(n as u32),
        _ => Err(Error::field_type(&event.name, field, "non-negative integer")),
    }
}
