use serde::{Deserialize, Serialize};

use crate::util::now_ms;

/// Audit fields carried by every stored row. A row is "active" while
/// `deleted_at_ms` is `None`; soft-deleted rows stay in the store forever.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuditStamp {
    pub created_by: String,
    pub created_at_ms: i64,
    pub updated_by: String,
    pub updated_at_ms: i64,
    pub deleted_at_ms: Option<i64>,
}

impl AuditStamp {
    pub fn new(actor: &str) -> Self {
        let now = now_ms();
        Self {
            created_by: actor.to_string(),
            created_at_ms: now,
            updated_by: actor.to_string(),
            updated_at_ms: now,
            deleted_at_ms: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at_ms.is_some()
    }

    pub fn touch(&mut self, actor: &str) {
        self.updated_by = actor.to_string();
        self.updated_at_ms = now_ms();
    }

    pub fn mark_deleted(&mut self, actor: &str) {
        self.deleted_at_ms = Some(now_ms());
        self.touch(actor);
    }

    pub fn mark_restored(&mut self, actor: &str) {
        self.deleted_at_ms = None;
        self.touch(actor);
    }
}
