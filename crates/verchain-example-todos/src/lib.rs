//! # Todo storage across three schema versions
//!
//! `TodoAppVersioned` holds the application state at any stored version and
//! [`handler`] wires its codec and transforms into a
//! [`VersionedDataHandler`]. Readers always get a [`v3::App`]; writers can
//! still produce v1 or v2 bytes for older clients.
//!
//! v1 todo ids must be unique: from v2 on todos are keyed by id. v1 lists
//! written by [`handler`] are in ascending id order.
//!
//! [`v3::App`]: schemas::v3::App

pub mod schemas;

use std::collections::BTreeMap;

use verchain::{Error, Result, VersionCodec, Versioned, VersionedDataHandler};

use schemas::{v1, v2, v3};

/// Newest storage schema.
pub const LATEST_VERSION: u16 = 3;

/// Application state at one of the stored versions.
#[derive(Debug, Clone, PartialEq)]
pub enum TodoAppVersioned {
    V1(v1::App),
    V2(v2::App),
    V3(v3::App),
}

impl Versioned for TodoAppVersioned {
    type Latest = v3::App;

    fn version(&self) -> u16 {
        match self {
            TodoAppVersioned::V1(_) => 1,
            TodoAppVersioned::V2(_) => 2,
            TodoAppVersioned::V3(_) => 3,
        }
    }

    fn from_latest(latest: v3::App, _latest_version: u16) -> Self {
        TodoAppVersioned::V3(latest)
    }

    fn into_latest(self) -> std::result::Result<v3::App, Self> {
        match self {
            TodoAppVersioned::V3(app) => Ok(app),
            other => Err(other),
        }
    }
}

/// postcard encoding of each version's `App`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoCodec;

impl VersionCodec<TodoAppVersioned> for TodoCodec {
    fn decode(&self, payload: &[u8], version: u16) -> Result<TodoAppVersioned> {
        let value = match version {
            1 => TodoAppVersioned::V1(postcard::from_bytes(payload).map_err(Error::codec)?),
            2 => TodoAppVersioned::V2(postcard::from_bytes(payload).map_err(Error::codec)?),
            3 => TodoAppVersioned::V3(postcard::from_bytes(payload).map_err(Error::codec)?),
            v => return Err(Error::UnknownVersion(v)),
        };
        Ok(value)
    }

    fn encode(&self, value: TodoAppVersioned, _version: u16) -> Result<Vec<u8>> {
        let bytes = match &value {
            TodoAppVersioned::V1(app) => postcard::to_allocvec(app),
            TodoAppVersioned::V2(app) => postcard::to_allocvec(app),
            TodoAppVersioned::V3(app) => postcard::to_allocvec(app),
        };
        bytes.map_err(Error::codec)
    }
}

/// Handler for todo state stored at v1, v2 or v3.
pub fn handler() -> Result<VersionedDataHandler<TodoAppVersioned>> {
    VersionedDataHandler::builder(TodoCodec)
        .upgrade(TodoAppVersioned::v1_to_v2)
        .upgrade(TodoAppVersioned::v2_to_v3)
        .downgrade(TodoAppVersioned::v2_to_v1)
        .downgrade(TodoAppVersioned::v3_to_v2)
        .latest_version(LATEST_VERSION)
        .build()
}

/// Decode `payload` stored at `version` and bring it up to v3.
pub fn migrate_to_latest(payload: &[u8], version: u16) -> Result<v3::App> {
    handler()?.deserialize(payload, version)
}

impl TodoAppVersioned {
    fn v1_to_v2(self) -> Result<Self> {
        let app = match self {
            TodoAppVersioned::V1(app) => app,
            other => return Ok(other),
        };

        let mut todos = BTreeMap::new();
        for t in app.todos {
            let id = v2::TodoId::from(t.id);
            let status = if t.done {
                v2::TodoStatus::Done
            } else {
                v2::TodoStatus::Open
            };
            let todo = v2::Todo {
                id,
                title: t.title,
                status,
                created_at: 0,
                tags: Vec::new(),
            };
            if todos.insert(id, todo).is_some() {
                return Err(Error::codec(format!("duplicate todo id {id}")));
            }
        }

        Ok(TodoAppVersioned::V2(v2::App {
            todos,
            settings: BTreeMap::new(),
        }))
    }

    fn v2_to_v3(self) -> Result<Self> {
        let app = match self {
            TodoAppVersioned::V2(app) => app,
            other => return Ok(other),
        };

        let todos = app
            .todos
            .into_iter()
            .map(|(id, t)| {
                let todo = v3::Todo {
                    id,
                    status: t.status,
                    created_at: t.created_at,
                    priority: v3::Priority::default(),
                    detail: v3::TodoDetail {
                        title: t.title,
                        tags: number_tags(t.tags),
                    },
                };
                (id, todo)
            })
            .collect();

        Ok(TodoAppVersioned::V3(v3::App {
            todos,
            settings: app.settings,
        }))
    }

    fn v3_to_v2(self) -> Result<Self> {
        let app = match self {
            TodoAppVersioned::V3(app) => app,
            other => return Ok(other),
        };

        let todos = app
            .todos
            .into_iter()
            .map(|(id, t)| {
                let todo = v2::Todo {
                    id,
                    title: t.detail.title,
                    status: t.status,
                    created_at: t.created_at,
                    // Tag ids are dense from 1, so map order is creation order.
                    tags: t.detail.tags.into_values().map(|tag| tag.name).collect(),
                };
                (id, todo)
            })
            .collect();

        Ok(TodoAppVersioned::V2(v2::App {
            todos,
            settings: app.settings,
        }))
    }

    /// The v1 list is written in ascending id order.
    fn v2_to_v1(self) -> Result<Self> {
        let app = match self {
            TodoAppVersioned::V2(app) => app,
            other => return Ok(other),
        };

        let todos = app
            .todos
            .into_values()
            .map(|t| {
                Ok(v1::Todo {
                    id: u32::try_from(t.id).map_err(Error::codec)?,
                    title: t.title,
                    done: t.status == v2::TodoStatus::Done,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TodoAppVersioned::V1(v1::App { todos }))
    }
}

fn number_tags(names: Vec<String>) -> BTreeMap<v3::TagId, v3::Tag> {
    (1..)
        .zip(names)
        .map(|(id, name)| {
            (
                id,
                v3::Tag {
                    id,
                    name,
                    color: None,
                },
            )
        })
        .collect()
}
