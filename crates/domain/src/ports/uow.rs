use crate::association::NewCountryBoundary;
use crate::boundary::NewBoundary;
use crate::ports::BoxFuture;
use crate::DomainResult;

/// The commit phase of a boundary upgrade: close the superseded association,
/// insert the replacement boundary, and link it to the country.
///
/// `association.boundary_id` is filled in by the store once the new boundary
/// row has an id; the value supplied by the caller is ignored.
#[derive(Clone, Debug)]
pub struct UpgradeCommit {
    pub close_association_id: i64,
    pub boundary: NewBoundary,
    pub association: NewCountryBoundary,
}

/// Scoped transaction handle over the backing store. Implementations must
/// apply the whole commit or none of it; readers never observe a closed
/// association without its replacement.
pub trait UpgradeUnitOfWork: Send + Sync {
    /// Returns the id of the newly created association.
    fn commit_upgrade(&self, commit: UpgradeCommit) -> BoxFuture<'_, DomainResult<i64>>;
}
