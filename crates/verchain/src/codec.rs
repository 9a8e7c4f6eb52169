use alloc::vec::Vec;
use core::fmt;

use crate::error::Result;

/// Per-version payload codec.
///
/// A codec maps raw payload bytes of one schema version to the matching
/// in-memory value and back. It dispatches on `version` internally and must
/// reject versions it does not know with [`Error::UnknownVersion`] rather than
/// guessing. Malformed payloads are reported with [`Error::codec`]; the handler
/// passes those through untouched.
///
/// Codecs are usually generated from a schema description. They must be pure:
/// the handler calls them from any thread without synchronization.
///
/// [`Error::UnknownVersion`]: crate::Error::UnknownVersion
/// [`Error::codec`]: crate::Error::codec
pub trait VersionCodec<V>: Send + Sync {
    /// Decode `payload`, which is known to be at `version`.
    fn decode(&self, payload: &[u8], version: u16) -> Result<V>;

    /// Encode `value` as a payload at `version`.
    fn encode(&self, value: V, version: u16) -> Result<Vec<u8>>;
}

/// A [`VersionCodec`] built from a pair of closures.
///
/// ```
/// use verchain::{Error, FnCodec, VersionCodec};
///
/// let codec = FnCodec::new(
///     |payload: &[u8], version: u16| match version {
///         1 => Ok(payload.len() as u32),
///         v => Err(Error::UnknownVersion(v)),
///     },
///     |value: u32, version: u16| match version {
///         1 => Ok(vec![0u8; value as usize]),
///         v => Err(Error::UnknownVersion(v)),
///     },
/// );
///
/// assert_eq!(codec.decode(&[7, 7, 7], 1).unwrap(), 3);
/// assert!(matches!(codec.decode(&[], 2), Err(Error::UnknownVersion(2))));
/// ```
pub struct FnCodec<D, E> {
    decode: D,
    encode: E,
}

impl<D, E> FnCodec<D, E> {
    /// Pair a decode and an encode function.
    pub fn new(decode: D, encode: E) -> Self {
        Self { decode, encode }
    }
}

impl<V, D, E> VersionCodec<V> for FnCodec<D, E>
where
    D: Fn(&[u8], u16) -> Result<V> + Send + Sync,
    E: Fn(V, u16) -> Result<Vec<u8>> + Send + Sync,
{
    fn decode(&self, payload: &[u8], version: u16) -> Result<V> {
        (self.decode)(payload, version)
    }

    fn encode(&self, value: V, version: u16) -> Result<Vec<u8>> {
        (self.encode)(value, version)
    }
}

impl<D, E> fmt::Debug for FnCodec<D, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}
