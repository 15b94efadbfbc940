use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::association::NewCountryBoundary;
use crate::audit::AuditStamp;
use crate::boundary::NewBoundary;
use crate::error::DomainError;
use crate::geometry::{Polygon, Ring};
use crate::ports::association::CountryBoundaryRepository;
use crate::ports::boundary::BoundaryRepository;
use crate::ports::country::CountryRepository;
use crate::ports::uow::{UpgradeCommit, UpgradeUnitOfWork};
use crate::DomainResult;

/// Replacement request: which country, which boundary is being superseded,
/// and the new ring set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpgradeRequest {
    pub country_id: Option<i64>,
    pub boundary_id: Option<i64>,
    pub rings: Option<Vec<Ring>>,
}

/// Replaces a country's active boundary with a newly supplied one while
/// keeping the old version as history. Validation happens before any write;
/// the commit itself is a single atomic unit of work and is never retried.
#[derive(Clone)]
pub struct UpgradeService {
    countries: Arc<dyn CountryRepository>,
    boundaries: Arc<dyn BoundaryRepository>,
    associations: Arc<dyn CountryBoundaryRepository>,
    uow: Arc<dyn UpgradeUnitOfWork>,
}

impl UpgradeService {
    pub fn new(
        countries: Arc<dyn CountryRepository>,
        boundaries: Arc<dyn BoundaryRepository>,
        associations: Arc<dyn CountryBoundaryRepository>,
        uow: Arc<dyn UpgradeUnitOfWork>,
    ) -> Self {
        Self {
            countries,
            boundaries,
            associations,
            uow,
        }
    }

    /// Returns the id of the new association on success.
    pub async fn upgrade(&self, request: &UpgradeRequest, actor: &str) -> DomainResult<i64> {
        if actor.trim().is_empty() {
            return Err(DomainError::EmptyActor);
        }
        let country_id = request.country_id.ok_or(DomainError::NotFoundCountry)?;
        let boundary_id = request.boundary_id.ok_or(DomainError::NotFoundBoundary)?;
        let rings = request
            .rings
            .as_deref()
            .filter(|rings| !rings.is_empty())
            .ok_or(DomainError::EmptyCoordinates)?;
        let polygon = Polygon::from_rings(rings)?;

        let country = self
            .countries
            .get(country_id)
            .await?
            .ok_or(DomainError::NotFoundCountry)?;
        let prior = self
            .boundaries
            .get(boundary_id)
            .await?
            .ok_or(DomainError::NotFoundBoundary)?;
        if country.audit.is_deleted() {
            return Err(DomainError::DeletedCountry);
        }
        if prior.audit.is_deleted() {
            return Err(DomainError::DeletedBoundary);
        }

        // A replacement must be a real change.
        if polygon == prior.polygon {
            return Err(DomainError::NotChangesCoordinates);
        }

        let association = self
            .associations
            .get_by_pair(country.id, prior.id)
            .await?
            .ok_or(DomainError::NotFoundCountryBoundary)?;
        // Unreachable while the prior boundary is active, guarded anyway.
        if association.audit.is_deleted() {
            return Err(DomainError::DeletedCountryBoundary);
        }

        let center = polygon.interior_point();
        let area = polygon.area();
        let new_association_id = self
            .uow
            .commit_upgrade(UpgradeCommit {
                close_association_id: association.id,
                boundary: NewBoundary {
                    kind_id: prior.kind_id,
                    polygon,
                    is_system: false,
                    audit: AuditStamp::new(actor),
                },
                association: NewCountryBoundary {
                    country_id: country.id,
                    boundary_id: 0,
                    center,
                    area,
                    zoom: association.zoom,
                    is_system: false,
                    audit: AuditStamp::new(actor),
                },
            })
            .await?;

        info!(
            country_id = country.id,
            old_boundary_id = prior.id,
            new_association_id,
            "boundary upgraded"
        );
        Ok(new_association_id)
    }
}
