use atlas_domain::association::NewCountryBoundary;
use atlas_domain::audit::AuditStamp;
use atlas_domain::boundary::{BoundaryKind, NewBoundary};
use atlas_domain::country::Country;
use atlas_domain::geometry::{Polygon, Ring};
use atlas_domain::DomainResult;
use tracing::info;

use crate::repositories::InMemoryAtlasStore;

const SEED_ACTOR: &str = "initializer";

/// Bootstraps a deterministic dataset so the service answers with data out
/// of the box: one boundary kind and two countries, each with an active
/// boundary link. All seed rows are marked `is_system`.
pub fn seed(store: &InMemoryAtlasStore) -> DomainResult<()> {
    let kind_id = store.insert_kind(BoundaryKind {
        id: 0,
        name: "country boundary".to_string(),
        background_color: "#7c86da".to_string(),
        border_color: "#0004ff".to_string(),
        audit: AuditStamp::new(SEED_ACTOR),
    });

    seed_country(
        store,
        kind_id,
        "Northmark",
        "#aa0000",
        rectangle(0.0, 0.0, 40.0, 30.0),
        4,
    )?;
    seed_country(
        store,
        kind_id,
        "Southvale",
        "#00aa00",
        rectangle(50.0, 0.0, 80.0, 20.0),
        5,
    )?;

    info!("seed data loaded");
    Ok(())
}

fn seed_country(
    store: &InMemoryAtlasStore,
    kind_id: i64,
    name: &str,
    color: &str,
    ring: Ring,
    zoom: i32,
) -> DomainResult<()> {
    let country_id = store.insert_country(Country {
        id: 0,
        name: name.to_string(),
        description: None,
        color: color.to_string(),
        language: None,
        organization_id: None,
        audit: AuditStamp::new(SEED_ACTOR),
    });

    let polygon = Polygon::from_rings(&[ring])?;
    let center = polygon.interior_point();
    let area = polygon.area();
    let boundary_id = store.insert_boundary_sync(NewBoundary {
        kind_id,
        polygon,
        is_system: true,
        audit: AuditStamp::new(SEED_ACTOR),
    });

    store.insert_association_sync(NewCountryBoundary {
        country_id,
        boundary_id,
        center,
        area,
        zoom,
        is_system: true,
        audit: AuditStamp::new(SEED_ACTOR),
    })?;
    Ok(())
}

fn rectangle(x1: f64, y1: f64, x2: f64, y2: f64) -> Ring {
    vec![[x1, y1], [x1, y2], [x2, y2], [x2, y1], [x1, y1]]
}
