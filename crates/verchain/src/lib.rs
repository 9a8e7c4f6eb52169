//! # verchain
//!
//! Schema evolution for binary-encoded application state.
//!
//! Data written by an older build must stay readable by a newer one, and a
//! newer build must be able to write data an older reader still understands.
//! `verchain` runs the chain of per-version transforms that makes both work.
//!
//! ## How It Works
//!
//! 1. A [`VersionCodec`] decodes and encodes the payload of each schema
//!    version. It is usually generated from a schema description.
//! 2. A [`MigrationChain`] holds one upgrade and one downgrade step per pair of
//!    adjacent versions.
//! 3. A [`VersionedDataHandler`] ties both together: reads decode at the
//!    payload's version and upgrade to latest, writes downgrade from latest
//!    and encode at the requested version.
//! 4. Optionally, the version travels with the data in a 2-byte
//!    little-endian header ([`VersionedFrame`]).
//!
//! ## Key Concepts
//!
//! - **Linear chain**: steps run v1→v2→…→latest (or back), one version at a
//!   time, never skipping one.
//! - **Pure steps**: codecs and steps hold no mutable state, so a handler can
//!   be shared freely across threads.
//! - **Loud misconfiguration**: a missing step is an error naming the gap,
//!   never a silently truncated chain.
//!
//! ## Quick Start
//!
//! ```
//! use verchain::{Error, FnCodec, VersionedDataHandler, Versioned};
//!
//! enum Name {
//!     V1(String),               // "Ada Lovelace"
//!     V2((String, String)),     // ("Ada", "Lovelace")
//! }
//!
//! impl Versioned for Name {
//!     type Latest = (String, String);
//!     fn version(&self) -> u16 {
//!         match self { Name::V1(_) => 1, Name::V2(_) => 2 }
//!     }
//!     fn from_latest(latest: (String, String), _: u16) -> Self { Name::V2(latest) }
//!     fn into_latest(self) -> Result<(String, String), Self> {
//!         match self { Name::V2(n) => Ok(n), other => Err(other) }
//!     }
//! }
//!
//! let codec = FnCodec::new(
//!     |payload: &[u8], version: u16| -> Result<Name, Error> {
//!         let text = String::from_utf8(payload.to_vec()).map_err(Error::codec)?;
//!         match version {
//!             1 => Ok(Name::V1(text)),
//!             2 => {
//!                 let (first, last) = text
//!                     .split_once('|')
//!                     .ok_or(Error::codec("missing separator"))?;
//!                 Ok(Name::V2((first.into(), last.into())))
//!             }
//!             v => Err(Error::UnknownVersion(v)),
//!         }
//!     },
//!     |value: Name, _version: u16| -> Result<Vec<u8>, Error> {
//!         Ok(match value {
//!             Name::V1(full) => full.into_bytes(),
//!             Name::V2((first, last)) => format!("{first}|{last}").into_bytes(),
//!         })
//!     },
//! );
//!
//! let handler = VersionedDataHandler::builder(codec)
//!     .upgrade(|v: Name| match v {
//!         Name::V1(full) => {
//!             let (first, last) = full.split_once(' ').unwrap_or((full.as_str(), ""));
//!             Ok(Name::V2((first.into(), last.into())))
//!         }
//!         other => Ok(other),
//!     })
//!     .downgrade(|v: Name| match v {
//!         Name::V2((first, last)) => Ok(Name::V1(format!("{first} {last}"))),
//!         other => Ok(other),
//!     })
//!     .build()
//!     .unwrap();
//!
//! // Old data, new code.
//! let name = handler.deserialize(b"Ada Lovelace", 1).unwrap();
//! assert_eq!(name, ("Ada".to_string(), "Lovelace".to_string()));
//!
//! // New code, old reader, version carried in the frame.
//! let bytes = handler.serialize_with_embedded_version(name, 1).unwrap();
//! assert_eq!(bytes, b"\x01\x00Ada Lovelace");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod chain;
mod codec;
mod config;
pub mod erased;
mod error;
mod frame;
mod handler;
mod versioned;

pub use chain::{MigrationChain, Step};
pub use codec::{FnCodec, VersionCodec};
pub use config::HandlerBuilder;
pub use erased::ErasedValue;
pub use error::{BoxError, Error, Result};
pub use frame::{encode_frame, peek_version, split_frame, VersionedFrame, FRAME_HEADER_SIZE};
pub use handler::VersionedDataHandler;
pub use versioned::Versioned;
