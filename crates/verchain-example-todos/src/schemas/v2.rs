//! v2: todos keyed by a 64-bit id, a three-state status, creation time and
//! free-form tags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type TodoId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoStatus {
    Open,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub status: TodoStatus,
    /// Unix seconds. `0` when unknown.
    pub created_at: u64,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub todos: BTreeMap<TodoId, Todo>,
    pub settings: BTreeMap<String, String>,
}
