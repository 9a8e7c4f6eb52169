use alloc::boxed::Box;
use alloc::format;

use crate::chain::{MigrationChain, Step};
use crate::codec::VersionCodec;
use crate::error::{Error, Result};
use crate::handler::VersionedDataHandler;
use crate::versioned::Versioned;

/// Builder for a [`VersionedDataHandler`].
///
/// Steps are registered in version order. Upgrades start with the v1→v2 step,
/// downgrades with the v2→v1 step; both lists are addressed by the lower
/// version of each pair.
///
/// ```
/// use verchain::{Error, FnCodec, HandlerBuilder, Versioned};
///
/// #[derive(Debug, PartialEq)]
/// enum Celsius {
///     V1(i32),       // whole degrees
///     V2(f64),       // fractional degrees
/// }
///
/// impl Versioned for Celsius {
///     type Latest = f64;
///     fn version(&self) -> u16 {
///         match self { Celsius::V1(_) => 1, Celsius::V2(_) => 2 }
///     }
///     fn from_latest(latest: f64, _: u16) -> Self { Celsius::V2(latest) }
///     fn into_latest(self) -> Result<f64, Self> {
///         match self { Celsius::V2(t) => Ok(t), other => Err(other) }
///     }
/// }
///
/// let codec = FnCodec::new(
///     |payload: &[u8], version: u16| -> Result<Celsius, Error> {
///         match version {
///             1 => Ok(Celsius::V1(i32::from_le_bytes(payload.try_into().map_err(Error::codec)?))),
///             2 => Ok(Celsius::V2(f64::from_le_bytes(payload.try_into().map_err(Error::codec)?))),
///             v => Err(Error::UnknownVersion(v)),
///         }
///     },
///     |value: Celsius, _version: u16| -> Result<Vec<u8>, Error> {
///         match value {
///             Celsius::V1(t) => Ok(t.to_le_bytes().to_vec()),
///             Celsius::V2(t) => Ok(t.to_le_bytes().to_vec()),
///         }
///     },
/// );
///
/// let handler = HandlerBuilder::new(codec)
///     .upgrade(|v: Celsius| match v {
///         Celsius::V1(t) => Ok(Celsius::V2(f64::from(t))),
///         other => Ok(other),
///     })
///     .downgrade(|v: Celsius| match v {
///         Celsius::V2(t) => Ok(Celsius::V1(t.round() as i32)),
///         other => Ok(other),
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(handler.latest_version(), 2);
/// assert_eq!(handler.deserialize(&21i32.to_le_bytes(), 1).unwrap(), 21.0);
/// assert_eq!(handler.serialize(21.6, 1).unwrap(), 22i32.to_le_bytes());
/// ```
pub struct HandlerBuilder<V> {
    codec: Box<dyn VersionCodec<V>>,
    chain: MigrationChain<V>,
    latest_version: Option<u16>,
}

impl<V: Versioned> HandlerBuilder<V> {
    /// Start a builder around the codec for every supported version.
    pub fn new(codec: impl VersionCodec<V> + 'static) -> Self {
        Self {
            codec: Box::new(codec),
            chain: MigrationChain::new(),
            latest_version: None,
        }
    }

    /// Append the next upgrade step (v1→v2 first).
    pub fn upgrade(mut self, step: impl Fn(V) -> Result<V> + Send + Sync + 'static) -> Self {
        self.chain.push_upgrade(Box::new(step));
        self
    }

    /// Append the next downgrade step (v2→v1 first).
    pub fn downgrade(mut self, step: impl Fn(V) -> Result<V> + Send + Sync + 'static) -> Self {
        self.chain.push_downgrade(Box::new(step));
        self
    }

    /// Append an already boxed upgrade step.
    pub fn upgrade_step(mut self, step: Step<V>) -> Self {
        self.chain.push_upgrade(step);
        self
    }

    /// Append an already boxed downgrade step.
    pub fn downgrade_step(mut self, step: Step<V>) -> Self {
        self.chain.push_downgrade(step);
        self
    }

    /// Pin the latest version instead of deriving it from the upgrade chain.
    ///
    /// Useful when the chain is deliberately shorter than the version range,
    /// e.g. a handler that only ever writes the latest version.
    pub fn latest_version(mut self, version: u16) -> Self {
        self.latest_version = Some(version);
        self
    }

    /// Validate the configuration and freeze it into a handler.
    pub fn build(self) -> Result<VersionedDataHandler<V>> {
        let latest = match self.latest_version {
            Some(0) => {
                return Err(Error::InvalidConfig(
                    "latest version must be at least 1".into(),
                ))
            }
            Some(v) => v,
            None => u16::try_from(self.chain.upgrade_len() + 1).map_err(|_| {
                Error::InvalidConfig(format!(
                    "{} upgrade steps exceed the u16 version range",
                    self.chain.upgrade_len()
                ))
            })?,
        };

        let max_steps = usize::from(latest - 1);
        if self.chain.upgrade_len() > max_steps {
            return Err(Error::InvalidConfig(format!(
                "{} upgrade steps registered but latest version v{latest} needs at most \
                 {max_steps}",
                self.chain.upgrade_len()
            )));
        }
        if self.chain.downgrade_len() > max_steps {
            return Err(Error::InvalidConfig(format!(
                "{} downgrade steps registered but latest version v{latest} needs at most \
                 {max_steps}",
                self.chain.downgrade_len()
            )));
        }

        tracing::debug!(
            latest,
            upgrades = self.chain.upgrade_len(),
            downgrades = self.chain.downgrade_len(),
            "built versioned data handler"
        );

        Ok(VersionedDataHandler::from_parts(self.codec, self.chain, latest))
    }
}
