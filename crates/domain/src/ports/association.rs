use crate::association::{CountryBoundary, NewCountryBoundary};
use crate::ports::BoxFuture;
use crate::DomainResult;

pub trait CountryBoundaryRepository: Send + Sync {
    fn get(&self, id: i64) -> BoxFuture<'_, DomainResult<Option<CountryBoundary>>>;

    /// First candidate for the `(country, boundary)` pair, ordered by
    /// `deleted_at_ms` ascending with the active row (null) first. The active
    /// row therefore always wins over historical ones.
    fn get_by_pair(
        &self,
        country_id: i64,
        boundary_id: i64,
    ) -> BoxFuture<'_, DomainResult<Option<CountryBoundary>>>;

    /// Every association, historical rows included.
    fn list(&self) -> BoxFuture<'_, DomainResult<Vec<CountryBoundary>>>;

    fn list_active_by_country(
        &self,
        country_id: i64,
    ) -> BoxFuture<'_, DomainResult<Vec<CountryBoundary>>>;

    /// Insert rejects with `ExistsCountryBoundary` when an active row for the
    /// same `(country, boundary)` pair is already present. This is the sole
    /// write-conflict control for concurrent upgrades.
    fn insert(&self, association: NewCountryBoundary) -> BoxFuture<'_, DomainResult<i64>>;

    /// Updates reject with `ExistsCountryBoundary` when the written row is
    /// active and another active row already holds the same pair, so a
    /// restore can never yield two active rows for one `(country, boundary)`.
    fn update(&self, association: &CountryBoundary) -> BoxFuture<'_, DomainResult<()>>;
}
