//! v3: priorities, and tags promoted to records with their own ids.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use super::v2::TodoStatus;

pub type TodoId = u64;
pub type TagId = u32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoDetail {
    pub title: String,
    pub tags: BTreeMap<TagId, Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub status: TodoStatus,
    pub created_at: u64,
    pub priority: Priority,
    pub detail: TodoDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub todos: BTreeMap<TodoId, Todo>,
    pub settings: BTreeMap<String, String>,
}
