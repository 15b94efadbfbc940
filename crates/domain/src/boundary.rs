use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audit::AuditStamp;
use crate::error::DomainError;
use crate::geometry::Polygon;
use crate::ports::boundary::{BoundaryKindRepository, BoundaryRepository};
use crate::DomainResult;

/// Reference classification of a boundary, carrying its display colors.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BoundaryKind {
    pub id: i64,
    pub name: String,
    pub background_color: String,
    pub border_color: String,
    pub audit: AuditStamp,
}

/// A stored polygon geometry with its own soft-delete lifecycle. Boundaries
/// are created by the upgrade flow or by seed data, never directly by
/// clients, and are never hard-deleted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Boundary {
    pub id: i64,
    pub kind_id: i64,
    pub polygon: Polygon,
    pub is_system: bool,
    pub audit: AuditStamp,
}

#[derive(Clone, Debug)]
pub struct NewBoundary {
    pub kind_id: i64,
    pub polygon: Polygon,
    pub is_system: bool,
    pub audit: AuditStamp,
}

#[derive(Clone)]
pub struct BoundaryService {
    boundaries: Arc<dyn BoundaryRepository>,
    kinds: Arc<dyn BoundaryKindRepository>,
}

impl BoundaryService {
    pub fn new(
        boundaries: Arc<dyn BoundaryRepository>,
        kinds: Arc<dyn BoundaryKindRepository>,
    ) -> Self {
        Self { boundaries, kinds }
    }

    pub async fn get_by_id(&self, id: i64) -> DomainResult<Boundary> {
        self.boundaries
            .get(id)
            .await?
            .ok_or(DomainError::NotFoundBoundary)
    }

    pub async fn list(&self) -> DomainResult<Vec<Boundary>> {
        self.boundaries.list_active().await
    }

    pub async fn add(
        &self,
        polygon: Option<Polygon>,
        kind_id: i64,
        actor: &str,
    ) -> DomainResult<i64> {
        let polygon = polygon.ok_or(DomainError::EmptyCoordinates)?;
        let kind = self
            .kinds
            .get(kind_id)
            .await?
            .ok_or(DomainError::NotFoundBoundaryKind)?;
        if kind.audit.is_deleted() {
            return Err(DomainError::DeletedBoundaryKind);
        }

        self.boundaries
            .insert(NewBoundary {
                kind_id: kind.id,
                polygon,
                is_system: false,
                audit: AuditStamp::new(actor),
            })
            .await
    }

    /// Clears the soft-delete timestamp. Restoring an active boundary is a
    /// caller bug and surfaces as `NotDeletedBoundary`.
    pub async fn restore(&self, id: i64, actor: &str) -> DomainResult<bool> {
        let mut boundary = self.get_by_id(id).await?;
        if !boundary.audit.is_deleted() {
            return Err(DomainError::NotDeletedBoundary);
        }
        boundary.audit.mark_restored(actor);
        self.boundaries.update(&boundary).await?;
        Ok(true)
    }

    /// Soft-deletes the boundary. Closing twice is an error, not a no-op.
    pub async fn close(&self, id: i64, actor: &str) -> DomainResult<bool> {
        let mut boundary = self.get_by_id(id).await?;
        if boundary.audit.is_deleted() {
            return Err(DomainError::DeletedBoundary);
        }
        boundary.audit.mark_deleted(actor);
        self.boundaries.update(&boundary).await?;
        Ok(true)
    }
}
