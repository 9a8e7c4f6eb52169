use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use crate::chain::{check_version, MigrationChain};
use crate::codec::VersionCodec;
use crate::config::HandlerBuilder;
use crate::error::{Error, Result};
use crate::frame::{encode_frame, split_frame};
use crate::versioned::Versioned;

/// Decodes payloads of any supported version into the latest representation,
/// and encodes the latest representation for any supported version.
///
/// A handler is built once through [`HandlerBuilder`] and never changes
/// afterwards. Every call is an independent pipeline:
///
/// ```text
/// read:  bytes@v --decode--> V@v --upgrades--> V@latest --> Latest
/// write: Latest --> V@latest --downgrades--> V@v --encode--> bytes@v
/// ```
///
/// Handlers hold no per-call state and are `Send + Sync`, so one instance can
/// be shared across threads behind an `Arc` or a `static`.
pub struct VersionedDataHandler<V> {
    codec: Box<dyn VersionCodec<V>>,
    chain: MigrationChain<V>,
    latest: u16,
}

impl<V: Versioned> VersionedDataHandler<V> {
    /// Start building a handler around `codec`.
    pub fn builder(codec: impl VersionCodec<V> + 'static) -> HandlerBuilder<V> {
        HandlerBuilder::new(codec)
    }

    pub(crate) fn from_parts(
        codec: Box<dyn VersionCodec<V>>,
        chain: MigrationChain<V>,
        latest: u16,
    ) -> Self {
        Self {
            codec,
            chain,
            latest,
        }
    }

    /// The latest (canonical) schema version.
    pub fn latest_version(&self) -> u16 {
        self.latest
    }

    /// True if data at `version` has to go through the chain.
    pub fn needs_migration(&self, version: u16) -> bool {
        version != self.latest
    }

    /// The migration chain this handler runs.
    pub fn chain(&self) -> &MigrationChain<V> {
        &self.chain
    }

    /// Check that every step between `min_version` and latest is registered,
    /// in both directions.
    pub fn validate_chain(&self, min_version: u16) -> Result<()> {
        self.chain.validate(min_version, self.latest)
    }

    /// Decode `payload`, written at `version`, and upgrade it to the latest
    /// representation.
    pub fn deserialize(&self, payload: &[u8], version: u16) -> Result<V::Latest> {
        self.check_known(version)?;

        let value = self.codec.decode(payload, version)?;
        let found = value.version();
        if found != version {
            return Err(Error::VersionMismatch {
                expected: version,
                found,
            });
        }

        if version != self.latest {
            tracing::debug!(from = version, to = self.latest, "upgrading decoded value");
        }
        let value = self.chain.apply_upgrades(value, self.latest)?;

        value
            .into_latest()
            .map_err(|value| Error::NotLatest {
                found: value.version(),
            })
    }

    /// Downgrade the latest representation to `version` and encode it.
    pub fn serialize(&self, latest: V::Latest, version: u16) -> Result<Vec<u8>> {
        self.serialize_value(V::from_latest(latest, self.latest), version)
    }

    /// Encode a value of any version at `version`, walking the chain up or
    /// down as needed.
    pub fn serialize_value(&self, value: V, version: u16) -> Result<Vec<u8>> {
        let value = self.migrate(value, version)?;
        self.codec.encode(value, version)
    }

    /// Walk `value` along the chain until it reaches `version`.
    pub fn migrate(&self, value: V, version: u16) -> Result<V> {
        self.check_known(version)?;

        let from = value.version();
        self.check_known(from)?;

        match from.cmp(&version) {
            Ordering::Equal => Ok(value),
            Ordering::Less => {
                tracing::debug!(from, to = version, "upgrading value");
                self.chain.apply_upgrades(value, version)
            }
            Ordering::Greater => {
                tracing::debug!(from, to = version, "downgrading value");
                self.chain.apply_downgrades(value, version)
            }
        }
    }

    /// [`serialize`](Self::serialize), prefixed with the 2-byte
    /// little-endian version.
    pub fn serialize_with_embedded_version(
        &self,
        latest: V::Latest,
        version: u16,
    ) -> Result<Vec<u8>> {
        let payload = self.serialize(latest, version)?;
        Ok(encode_frame(version, &payload))
    }

    /// Read the 2-byte little-endian version prefix, then
    /// [`deserialize`](Self::deserialize) the rest.
    pub fn deserialize_with_embedded_version(&self, bytes: &[u8]) -> Result<V::Latest> {
        let (version, payload) = split_frame(bytes)?;
        self.deserialize(payload, version)
    }

    fn check_known(&self, version: u16) -> Result<()> {
        check_version(version)?;
        if version > self.latest {
            return Err(Error::FutureVersion {
                requested: version,
                latest: self.latest,
            });
        }
        Ok(())
    }
}

impl<V> fmt::Debug for VersionedDataHandler<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedDataHandler")
            .field("latest", &self.latest)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}
