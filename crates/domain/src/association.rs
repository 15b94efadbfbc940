use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audit::AuditStamp;
use crate::boundary::{Boundary, BoundaryKind};
use crate::error::DomainError;
use crate::geometry::{Point, Ring};
use crate::ports::association::CountryBoundaryRepository;
use crate::ports::boundary::{BoundaryKindRepository, BoundaryRepository};
use crate::ports::country::CountryRepository;
use crate::DomainResult;

pub const ZOOM_MIN: i32 = 3;
pub const ZOOM_MAX: i32 = 24;

/// The versioned link between a country and a boundary. Center and area are
/// snapshots of the boundary geometry taken when the link was created; they
/// are never recomputed. At most one active row may exist per
/// `(country_id, boundary_id)` pair.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CountryBoundary {
    pub id: i64,
    pub country_id: i64,
    pub boundary_id: i64,
    pub center: Point,
    pub area: f64,
    pub zoom: i32,
    pub is_system: bool,
    pub audit: AuditStamp,
}

#[derive(Clone, Debug)]
pub struct NewCountryBoundary {
    pub country_id: i64,
    pub boundary_id: i64,
    pub center: Point,
    pub area: f64,
    pub zoom: i32,
    pub is_system: bool,
    pub audit: AuditStamp,
}

/// One boundary entry in the presentation payloads.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CountryBoundaryItem {
    pub id: i64,
    pub boundary_id: i64,
    pub rings: Vec<Ring>,
    pub background_color: Option<String>,
    pub border_color: Option<String>,
}

/// Per-country view: header fields come from the largest-area active
/// association, items carry every active one.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CountryBoundariesView {
    pub id: i64,
    pub name: String,
    pub center: Point,
    pub zoom: i32,
    pub items: Vec<CountryBoundaryItem>,
}

#[derive(Clone)]
pub struct CountryBoundaryService {
    associations: Arc<dyn CountryBoundaryRepository>,
    countries: Arc<dyn CountryRepository>,
    boundaries: Arc<dyn BoundaryRepository>,
    kinds: Arc<dyn BoundaryKindRepository>,
}

impl CountryBoundaryService {
    pub fn new(
        associations: Arc<dyn CountryBoundaryRepository>,
        countries: Arc<dyn CountryRepository>,
        boundaries: Arc<dyn BoundaryRepository>,
        kinds: Arc<dyn BoundaryKindRepository>,
    ) -> Self {
        Self {
            associations,
            countries,
            boundaries,
            kinds,
        }
    }

    pub async fn get_by_id(&self, id: i64) -> DomainResult<CountryBoundary> {
        self.associations
            .get(id)
            .await?
            .ok_or(DomainError::NotFoundCountryBoundary)
    }

    /// Active row first, then historical ones by soft-delete time.
    pub async fn get_by_country_and_boundary(
        &self,
        country_id: i64,
        boundary_id: i64,
    ) -> DomainResult<Option<CountryBoundary>> {
        self.associations.get_by_pair(country_id, boundary_id).await
    }

    pub async fn list(&self) -> DomainResult<Vec<CountryBoundary>> {
        self.associations.list().await
    }

    pub async fn list_by_country(&self, country_id: i64) -> DomainResult<Vec<CountryBoundary>> {
        self.associations.list_active_by_country(country_id).await
    }

    /// The currently-displayed boundary: the active association with the
    /// largest stored area. An exact-area tie is left unspecified.
    pub async fn current_of(&self, country_id: i64) -> DomainResult<Option<CountryBoundary>> {
        let active = self.associations.list_active_by_country(country_id).await?;
        Ok(pick_current(active))
    }

    pub async fn add(
        &self,
        country_id: i64,
        boundary_id: i64,
        zoom: Option<i32>,
        actor: &str,
    ) -> DomainResult<i64> {
        let country = self
            .countries
            .get(country_id)
            .await?
            .ok_or(DomainError::NotFoundCountry)?;
        let boundary = self
            .boundaries
            .get(boundary_id)
            .await?
            .ok_or(DomainError::NotFoundBoundary)?;
        let zoom = zoom.ok_or(DomainError::EmptyZoom)?;
        if country.audit.is_deleted() {
            return Err(DomainError::DeletedCountry);
        }
        if boundary.audit.is_deleted() {
            return Err(DomainError::DeletedBoundary);
        }
        if !(ZOOM_MIN..=ZOOM_MAX).contains(&zoom) {
            return Err(DomainError::IncorrectZoom);
        }

        if let Some(existing) = self.associations.get_by_pair(country.id, boundary.id).await? {
            if !existing.audit.is_deleted() {
                return Err(DomainError::ExistsCountryBoundary);
            }
        }

        self.associations
            .insert(NewCountryBoundary {
                country_id: country.id,
                boundary_id: boundary.id,
                center: boundary.polygon.interior_point(),
                area: boundary.polygon.area(),
                zoom,
                is_system: false,
                audit: AuditStamp::new(actor),
            })
            .await
    }

    pub async fn restore(&self, id: i64, actor: &str) -> DomainResult<bool> {
        let mut association = self.get_by_id(id).await?;
        if !association.audit.is_deleted() {
            return Err(DomainError::NotDeletedCountryBoundary);
        }
        association.audit.mark_restored(actor);
        self.associations.update(&association).await?;
        Ok(true)
    }

    pub async fn close(&self, id: i64, actor: &str) -> DomainResult<bool> {
        let mut association = self.get_by_id(id).await?;
        if association.audit.is_deleted() {
            return Err(DomainError::DeletedCountryBoundary);
        }
        association.audit.mark_deleted(actor);
        self.associations.update(&association).await?;
        Ok(true)
    }

    /// The per-country view served by `GET /countries_coordinates/list`.
    pub async fn boundaries_of_country(
        &self,
        country_id: i64,
    ) -> DomainResult<CountryBoundariesView> {
        let country = self
            .countries
            .get(country_id)
            .await?
            .ok_or(DomainError::NotFoundCountry)?;
        let active = self.associations.list_active_by_country(country_id).await?;
        let current = pick_current(active.clone()).ok_or(DomainError::NotFoundCountryBoundary)?;

        let mut items = Vec::with_capacity(active.len());
        for association in &active {
            items.push(self.render_item(association, &country.color).await?);
        }

        Ok(CountryBoundariesView {
            id: country.id,
            name: country.name,
            center: current.center,
            zoom: current.zoom,
            items,
        })
    }

    pub(crate) async fn render_item(
        &self,
        association: &CountryBoundary,
        background_color: &str,
    ) -> DomainResult<CountryBoundaryItem> {
        let boundary: Boundary = self
            .boundaries
            .get(association.boundary_id)
            .await?
            .ok_or(DomainError::NotFoundBoundary)?;
        let kind: Option<BoundaryKind> = self.kinds.get(boundary.kind_id).await?;
        Ok(CountryBoundaryItem {
            id: association.id,
            boundary_id: association.boundary_id,
            rings: boundary.polygon.to_rings(),
            background_color: Some(background_color.to_string()),
            border_color: kind.map(|kind| kind.border_color),
        })
    }
}

/// Largest stored area wins; ties are unspecified and resolve to whichever
/// candidate is visited first.
pub fn pick_current(active: Vec<CountryBoundary>) -> Option<CountryBoundary> {
    active.into_iter().max_by(|a, b| {
        a.area
            .partial_cmp(&b.area)
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}
