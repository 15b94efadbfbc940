use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::association::{pick_current, CountryBoundaryItem, CountryBoundaryService};
use crate::audit::AuditStamp;
use crate::error::DomainError;
use crate::geometry::Point;
use crate::ports::country::CountryRepository;
use crate::DomainResult;

/// A political entity. Countries are mutated in place, not versioned; only
/// their boundary links carry history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Country {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Globally unique map color, used as the boundary background.
    pub color: String,
    pub language: Option<String>,
    pub organization_id: Option<i64>,
    pub audit: AuditStamp,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CountryListItem {
    pub id: i64,
    pub name: String,
}

/// One entry of the aggregate "all countries with boundaries" payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CountryWithBoundaries {
    pub id: i64,
    pub name: String,
    pub center: Point,
    pub zoom: i32,
    pub boundaries: Vec<CountryBoundaryItem>,
}

#[derive(Clone)]
pub struct CountryService {
    countries: Arc<dyn CountryRepository>,
    country_boundaries: CountryBoundaryService,
}

impl CountryService {
    pub fn new(
        countries: Arc<dyn CountryRepository>,
        country_boundaries: CountryBoundaryService,
    ) -> Self {
        Self {
            countries,
            country_boundaries,
        }
    }

    pub async fn get_by_id(&self, id: i64) -> DomainResult<Country> {
        self.countries
            .get(id)
            .await?
            .ok_or(DomainError::NotFoundCountry)
    }

    /// Active countries, optionally filtered by whether they have at least
    /// one active boundary link.
    pub async fn list(&self, has_boundaries: Option<bool>) -> DomainResult<Vec<CountryListItem>> {
        let mut items = Vec::new();
        for country in self.countries.list_active().await? {
            let keep = match has_boundaries {
                None => true,
                Some(wanted) => {
                    let active = self.country_boundaries.list_by_country(country.id).await?;
                    active.is_empty() != wanted
                }
            };
            if keep {
                items.push(CountryListItem {
                    id: country.id,
                    name: country.name,
                });
            }
        }
        Ok(items)
    }

    /// The aggregate view behind the read cache: every active country with
    /// boundaries, centered and zoomed on its largest-area association.
    pub async fn list_with_boundaries(&self) -> DomainResult<Vec<CountryWithBoundaries>> {
        let mut entries = Vec::new();
        for country in self.countries.list_active().await? {
            let active = self.country_boundaries.list_by_country(country.id).await?;
            let Some(current) = pick_current(active.clone()) else {
                continue;
            };

            let mut boundaries = Vec::with_capacity(active.len());
            for association in &active {
                boundaries.push(
                    self.country_boundaries
                        .render_item(association, &country.color)
                        .await?,
                );
            }

            entries.push(CountryWithBoundaries {
                id: country.id,
                name: country.name,
                center: current.center,
                zoom: current.zoom,
                boundaries,
            });
        }
        Ok(entries)
    }
}
