use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use metrics::counter;

use atlas_domain::association::{CountryBoundary, NewCountryBoundary};
use atlas_domain::boundary::{Boundary, BoundaryKind, NewBoundary};
use atlas_domain::country::Country;
use atlas_domain::error::DomainError;
use atlas_domain::ports::association::CountryBoundaryRepository;
use atlas_domain::ports::boundary::{BoundaryKindRepository, BoundaryRepository};
use atlas_domain::ports::country::CountryRepository;
use atlas_domain::ports::uow::{UpgradeCommit, UpgradeUnitOfWork};
use atlas_domain::ports::BoxFuture;
use atlas_domain::DomainResult;

const STORE_UPGRADES_TOTAL: &str = "atlas_store_upgrades_total";
const STORE_UPGRADE_CONFLICTS_TOTAL: &str = "atlas_store_upgrade_conflicts_total";

/// In-memory backing store implementing every repository port plus the
/// upgrade unit of work. One mutex guards the whole state, which is what
/// makes the upgrade commit atomic: all of its checks and writes happen
/// under a single guard, and checks run before the first write.
#[derive(Clone, Default)]
pub struct InMemoryAtlasStore {
    inner: Arc<Mutex<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    next_id: i64,
    countries: HashMap<i64, Country>,
    kinds: HashMap<i64, BoundaryKind>,
    boundaries: HashMap<i64, Boundary>,
    associations: HashMap<i64, CountryBoundary>,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn active_pair_exists(&self, country_id: i64, boundary_id: i64) -> bool {
        self.associations.values().any(|row| {
            row.country_id == country_id
                && row.boundary_id == boundary_id
                && !row.audit.is_deleted()
        })
    }

    fn insert_association(&mut self, new: NewCountryBoundary) -> DomainResult<i64> {
        if self.active_pair_exists(new.country_id, new.boundary_id) {
            return Err(DomainError::ExistsCountryBoundary);
        }
        let id = self.next_id();
        self.associations.insert(
            id,
            CountryBoundary {
                id,
                country_id: new.country_id,
                boundary_id: new.boundary_id,
                center: new.center,
                area: new.area,
                zoom: new.zoom,
                is_system: new.is_system,
                audit: new.audit,
            },
        );
        Ok(id)
    }

    fn insert_boundary(&mut self, new: NewBoundary) -> i64 {
        let id = self.next_id();
        self.boundaries.insert(
            id,
            Boundary {
                id,
                kind_id: new.kind_id,
                polygon: new.polygon,
                is_system: new.is_system,
                audit: new.audit,
            },
        );
        id
    }
}

impl InMemoryAtlasStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.inner.lock().expect("atlas store lock")
    }

    /// Inserts a country, assigning a fresh id. Used by seed data and tests;
    /// the service layer never creates countries.
    pub fn insert_country(&self, mut country: Country) -> i64 {
        let mut state = self.state();
        let id = state.next_id();
        country.id = id;
        state.countries.insert(id, country);
        id
    }

    pub fn insert_kind(&self, mut kind: BoundaryKind) -> i64 {
        let mut state = self.state();
        let id = state.next_id();
        kind.id = id;
        state.kinds.insert(id, kind);
        id
    }

    pub fn insert_boundary_sync(&self, boundary: NewBoundary) -> i64 {
        self.state().insert_boundary(boundary)
    }

    pub fn insert_association_sync(&self, association: NewCountryBoundary) -> DomainResult<i64> {
        self.state().insert_association(association)
    }
}

impl CountryRepository for InMemoryAtlasStore {
    fn get(&self, id: i64) -> BoxFuture<'_, DomainResult<Option<Country>>> {
        Box::pin(async move { Ok(self.state().countries.get(&id).cloned()) })
    }

    fn list_active(&self) -> BoxFuture<'_, DomainResult<Vec<Country>>> {
        Box::pin(async move {
            let mut rows: Vec<Country> = self
                .state()
                .countries
                .values()
                .filter(|row| !row.audit.is_deleted())
                .cloned()
                .collect();
            rows.sort_by_key(|row| row.id);
            Ok(rows)
        })
    }
}

impl BoundaryKindRepository for InMemoryAtlasStore {
    fn get(&self, id: i64) -> BoxFuture<'_, DomainResult<Option<BoundaryKind>>> {
        Box::pin(async move { Ok(self.state().kinds.get(&id).cloned()) })
    }
}

impl BoundaryRepository for InMemoryAtlasStore {
    fn get(&self, id: i64) -> BoxFuture<'_, DomainResult<Option<Boundary>>> {
        Box::pin(async move { Ok(self.state().boundaries.get(&id).cloned()) })
    }

    fn list_active(&self) -> BoxFuture<'_, DomainResult<Vec<Boundary>>> {
        Box::pin(async move {
            let mut rows: Vec<Boundary> = self
                .state()
                .boundaries
                .values()
                .filter(|row| !row.audit.is_deleted())
                .cloned()
                .collect();
            rows.sort_by_key(|row| row.id);
            Ok(rows)
        })
    }

    fn insert(&self, boundary: NewBoundary) -> BoxFuture<'_, DomainResult<i64>> {
        Box::pin(async move { Ok(self.state().insert_boundary(boundary)) })
    }

    fn update(&self, boundary: &Boundary) -> BoxFuture<'_, DomainResult<()>> {
        let boundary = boundary.clone();
        Box::pin(async move {
            let mut state = self.state();
            if !state.boundaries.contains_key(&boundary.id) {
                return Err(DomainError::NotFoundBoundary);
            }
            state.boundaries.insert(boundary.id, boundary);
            Ok(())
        })
    }
}

impl CountryBoundaryRepository for InMemoryAtlasStore {
    fn get(&self, id: i64) -> BoxFuture<'_, DomainResult<Option<CountryBoundary>>> {
        Box::pin(async move { Ok(self.state().associations.get(&id).cloned()) })
    }

    fn get_by_pair(
        &self,
        country_id: i64,
        boundary_id: i64,
    ) -> BoxFuture<'_, DomainResult<Option<CountryBoundary>>> {
        Box::pin(async move {
            let state = self.state();
            let mut rows: Vec<&CountryBoundary> = state
                .associations
                .values()
                .filter(|row| row.country_id == country_id && row.boundary_id == boundary_id)
                .collect();
            // Active row (null deleted_at) sorts first, then by deletion time.
            rows.sort_by_key(|row| {
                (
                    row.audit.deleted_at_ms.is_some(),
                    row.audit.deleted_at_ms,
                    row.id,
                )
            });
            Ok(rows.first().map(|row| (*row).clone()))
        })
    }

    fn list(&self) -> BoxFuture<'_, DomainResult<Vec<CountryBoundary>>> {
        Box::pin(async move {
            let mut rows: Vec<CountryBoundary> =
                self.state().associations.values().cloned().collect();
            rows.sort_by_key(|row| row.id);
            Ok(rows)
        })
    }

    fn list_active_by_country(
        &self,
        country_id: i64,
    ) -> BoxFuture<'_, DomainResult<Vec<CountryBoundary>>> {
        Box::pin(async move {
            let mut rows: Vec<CountryBoundary> = self
                .state()
                .associations
                .values()
                .filter(|row| row.country_id == country_id && !row.audit.is_deleted())
                .cloned()
                .collect();
            rows.sort_by_key(|row| row.id);
            Ok(rows)
        })
    }

    fn insert(&self, association: NewCountryBoundary) -> BoxFuture<'_, DomainResult<i64>> {
        Box::pin(async move { self.state().insert_association(association) })
    }

    fn update(&self, association: &CountryBoundary) -> BoxFuture<'_, DomainResult<()>> {
        let association = association.clone();
        Box::pin(async move {
            let mut state = self.state();
            if !state.associations.contains_key(&association.id) {
                return Err(DomainError::NotFoundCountryBoundary);
            }
            // The active-pair constraint is scoped to the null deleted_at
            // case, so it also guards updates that reactivate a row: a
            // restore must not produce a second active row for the pair.
            if !association.audit.is_deleted() {
                let clash = state.associations.values().any(|row| {
                    row.id != association.id
                        && row.country_id == association.country_id
                        && row.boundary_id == association.boundary_id
                        && !row.audit.is_deleted()
                });
                if clash {
                    return Err(DomainError::ExistsCountryBoundary);
                }
            }
            state.associations.insert(association.id, association);
            Ok(())
        })
    }
}

impl UpgradeUnitOfWork for InMemoryAtlasStore {
    fn commit_upgrade(&self, commit: UpgradeCommit) -> BoxFuture<'_, DomainResult<i64>> {
        Box::pin(async move {
            let mut state = self.state();

            // Checks run before the writes; the guard is held throughout, so
            // a failed commit leaves the store untouched and readers never
            // see a closed association without its replacement.
            let old = state
                .associations
                .get(&commit.close_association_id)
                .cloned()
                .ok_or(DomainError::NotFoundCountryBoundary)
                .map_err(conflict)?;
            if old.audit.is_deleted() {
                // A concurrent upgrade already superseded this association.
                return Err(conflict(DomainError::DeletedCountryBoundary));
            }

            let actor = commit.association.audit.created_by.clone();
            let boundary_id = state.insert_boundary(commit.boundary);

            let mut association = commit.association;
            association.boundary_id = boundary_id;
            let new_id = match state.insert_association(association) {
                Ok(id) => id,
                Err(err) => {
                    state.boundaries.remove(&boundary_id);
                    return Err(conflict(err));
                }
            };

            let closed = state
                .associations
                .get_mut(&old.id)
                .ok_or(DomainError::NotFoundCountryBoundary)?;
            closed.audit.mark_deleted(&actor);

            counter!(STORE_UPGRADES_TOTAL).increment(1);
            Ok(new_id)
        })
    }
}

fn conflict(err: DomainError) -> DomainError {
    counter!(STORE_UPGRADE_CONFLICTS_TOTAL).increment(1);
    err
}
