use bytes::{Bytes, BytesMut};
use chunkwire_frame::{encode_frame, frame_payload};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::MarshalError;

/// A value that can travel over a [`Connection`](crate::Connection).
///
/// The connection never looks inside the encoded bytes. In length-prefixed
/// framing the encoded bytes must carry their own prefix (see [`Prefixed`]);
/// on read, `decode` receives the whole frame, prefix included.
pub trait Message {
    fn encode(&self) -> Result<Vec<u8>, MarshalError>;

    /// Replace `self` with the value decoded from `bytes`.
    fn decode(&mut self, bytes: &[u8]) -> Result<(), MarshalError>;
}

/// Opaque bytes, passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Raw(pub Bytes);

impl Raw {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Message for Raw {
    fn encode(&self) -> Result<Vec<u8>, MarshalError> {
        Ok(self.0.to_vec())
    }

    fn decode(&mut self, bytes: &[u8]) -> Result<(), MarshalError> {
        self.0 = Bytes::copy_from_slice(bytes);
        Ok(())
    }
}

/// A serde value carried as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T> {
    value: Option<T>,
}

impl<T> Json<T> {
    pub fn new(value: T) -> Self {
        Self { value: Some(value) }
    }

    /// An empty target to read into.
    pub fn empty() -> Self {
        Self { value: None }
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_inner(self) -> Option<T> {
        self.value
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Serialize + DeserializeOwned> Message for Json<T> {
    fn encode(&self) -> Result<Vec<u8>, MarshalError> {
        let value = self
            .value
            .as_ref()
            .ok_or_else(|| MarshalError::new("no value to encode"))?;
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&mut self, bytes: &[u8]) -> Result<(), MarshalError> {
        self.value = Some(serde_json::from_slice(bytes)?);
        Ok(())
    }
}

/// Wraps a message in a 2-byte little-endian length prefix.
///
/// Pairs with length-prefixed framing: `encode` prepends the total frame
/// length, `decode` checks and strips it before handing the payload on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prefixed<M>(pub M);

impl<M> Prefixed<M> {
    pub fn into_inner(self) -> M {
        self.0
    }
}

impl<M: Message> Message for Prefixed<M> {
    fn encode(&self) -> Result<Vec<u8>, MarshalError> {
        let payload = self.0.encode()?;
        let mut frame = BytesMut::new();
        encode_frame(&payload, &mut frame)?;
        Ok(frame.to_vec())
    }

    fn decode(&mut self, bytes: &[u8]) -> Result<(), MarshalError> {
        self.0.decode(frame_payload(bytes)?)
    }
}
