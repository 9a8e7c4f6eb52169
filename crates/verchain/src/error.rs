use alloc::boxed::Box;
use alloc::string::String;

/// Boxed error used to carry codec and transform failures through the handler.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors produced while decoding, migrating or encoding versioned data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The codec does not know how to decode or encode this version.
    #[error("unknown schema version v{0}")]
    UnknownVersion(u16),

    /// The requested version is newer than the latest one the chain reaches.
    #[error("data version v{requested} is newer than latest v{latest}")]
    FutureVersion { requested: u16, latest: u16 },

    /// The chain has no step bridging two adjacent versions.
    #[error("missing migration step v{from}→v{to}")]
    MissingMigration { from: u16, to: u16 },

    /// An embedded-version frame is shorter than its 2-byte header.
    #[error("frame of {len} bytes is too short for the 2-byte version header")]
    TruncatedFrame { len: usize },

    /// Versions start at 1.
    #[error("invalid schema version v{0}, versions start at 1")]
    InvalidVersion(u16),

    /// A codec or a chain step produced a value at an unexpected version.
    #[error("expected a value at v{expected}, found v{found}")]
    VersionMismatch { expected: u16, found: u16 },

    /// A type-erased step received a value of the wrong type.
    #[error("value at v{version} is not a `{expected}`")]
    TypeMismatch {
        version: u16,
        expected: &'static str,
    },

    /// The fully migrated value could not be unwrapped as the latest representation.
    #[error("value at v{found} is not the latest representation")]
    NotLatest { found: u16 },

    /// The handler configuration was rejected at build time.
    #[error("invalid handler configuration: {0}")]
    InvalidConfig(String),

    /// Codec-internal failure (malformed payload, encoder error).
    #[error(transparent)]
    Codec(BoxError),

    /// A chain step failed on its own terms.
    #[error("migration v{from}→v{to} failed: {source}")]
    Transform {
        from: u16,
        to: u16,
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Wrap a codec-internal error.
    pub fn codec<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Codec(err.into())
    }

    /// True if the error points at a misconfigured handler rather than bad input.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingMigration { .. }
                | Self::VersionMismatch { .. }
                | Self::TypeMismatch { .. }
                | Self::NotLatest { .. }
                | Self::InvalidConfig(_)
        )
    }
}
