use alloc::vec::Vec;

use crate::error::{Error, Result};

/// Size of the embedded-version header in bytes.
pub const FRAME_HEADER_SIZE: usize = 2;

/// A payload prefixed with the schema version it was written at.
///
/// Binary format (2 bytes overhead):
/// ```text
/// [VERSION: u16 little-endian][PAYLOAD: N bytes]
/// ```
///
/// There is no length field and no checksum: the payload runs to the end of
/// the buffer, and its own encoding is expected to be self-terminating.
///
/// # Example
///
/// ```
/// use verchain::VersionedFrame;
///
/// let frame = VersionedFrame::new(2, b"payload".to_vec());
///
/// let bytes = frame.to_bytes();
/// assert_eq!(&bytes[..2], &[2, 0]);
///
/// let decoded = VersionedFrame::from_bytes(&bytes).unwrap();
/// assert_eq!(decoded, frame);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedFrame {
    /// Schema version of the payload.
    pub version: u16,
    /// Codec-defined payload bytes.
    pub payload: Vec<u8>,
}

impl VersionedFrame {
    /// Create a new frame.
    pub fn new(version: u16, payload: Vec<u8>) -> Self {
        Self { version, payload }
    }

    /// Serialize the frame to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_frame(self.version, &self.payload)
    }

    /// Parse a frame, copying the payload out of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (version, payload) = split_frame(data)?;
        Ok(Self {
            version,
            payload: payload.to_vec(),
        })
    }

    /// Total encoded length.
    pub fn encoded_len(&self) -> usize {
        FRAME_HEADER_SIZE + self.payload.len()
    }
}

/// Prepend the little-endian `version` header to `payload`.
pub fn encode_frame(version: u16, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    bytes.extend_from_slice(&version.to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// Split a frame into its version and a borrowed payload.
pub fn split_frame(data: &[u8]) -> Result<(u16, &[u8])> {
    let version = peek_version(data)?;
    Ok((version, &data[FRAME_HEADER_SIZE..]))
}

/// Read the version without touching the payload.
pub fn peek_version(data: &[u8]) -> Result<u16> {
    match data {
        [lo, hi, ..] => Ok(u16::from_le_bytes([*lo, *hi])),
        _ => Err(Error::TruncatedFrame { len: data.len() }),
    }
}
