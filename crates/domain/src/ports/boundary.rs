use crate::boundary::{Boundary, BoundaryKind, NewBoundary};
use crate::ports::BoxFuture;
use crate::DomainResult;

pub trait BoundaryRepository: Send + Sync {
    fn get(&self, id: i64) -> BoxFuture<'_, DomainResult<Option<Boundary>>>;

    /// Active boundaries only (soft-deleted rows excluded).
    fn list_active(&self) -> BoxFuture<'_, DomainResult<Vec<Boundary>>>;

    fn insert(&self, boundary: NewBoundary) -> BoxFuture<'_, DomainResult<i64>>;

    fn update(&self, boundary: &Boundary) -> BoxFuture<'_, DomainResult<()>>;
}

pub trait BoundaryKindRepository: Send + Sync {
    fn get(&self, id: i64) -> BoxFuture<'_, DomainResult<Option<BoundaryKind>>>;
}
