use std::sync::Arc;

use atlas_domain::association::{CountryBoundaryService, NewCountryBoundary};
use atlas_domain::audit::AuditStamp;
use atlas_domain::boundary::{BoundaryKind, BoundaryService, NewBoundary};
use atlas_domain::country::{Country, CountryService};
use atlas_domain::error::DomainError;
use atlas_domain::geometry::{Polygon, Ring};
use atlas_domain::ports::uow::{UpgradeCommit, UpgradeUnitOfWork};
use atlas_domain::upgrade::{UpgradeRequest, UpgradeService};
use atlas_infra::repositories::InMemoryAtlasStore;

struct Fixture {
    store: Arc<InMemoryAtlasStore>,
    kind_id: i64,
    country_id: i64,
    boundary_id: i64,
    association_id: i64,
    boundaries: BoundaryService,
    associations: CountryBoundaryService,
    countries: CountryService,
    upgrades: UpgradeService,
}

fn square(x: f64, y: f64, size: f64) -> Ring {
    vec![
        [x, y],
        [x, y + size],
        [x + size, y + size],
        [x + size, y],
        [x, y],
    ]
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryAtlasStore::new());

    let kind_id = store.insert_kind(BoundaryKind {
        id: 0,
        name: "country boundary".to_string(),
        background_color: "#7c86da".to_string(),
        border_color: "#0004ff".to_string(),
        audit: AuditStamp::new("tester"),
    });
    let country_id = store.insert_country(Country {
        id: 0,
        name: "Northmark".to_string(),
        description: None,
        color: "#aa0000".to_string(),
        language: None,
        organization_id: None,
        audit: AuditStamp::new("tester"),
    });

    let polygon = Polygon::from_rings(&[square(0.0, 0.0, 10.0)]).unwrap();
    let center = polygon.interior_point();
    let area = polygon.area();
    let boundary_id = store.insert_boundary_sync(NewBoundary {
        kind_id,
        polygon,
        is_system: true,
        audit: AuditStamp::new("tester"),
    });
    let association_id = store
        .insert_association_sync(NewCountryBoundary {
            country_id,
            boundary_id,
            center,
            area,
            zoom: 4,
            is_system: true,
            audit: AuditStamp::new("tester"),
        })
        .unwrap();

    let boundaries = BoundaryService::new(store.clone(), store.clone());
    let associations = CountryBoundaryService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    );
    let countries = CountryService::new(store.clone(), associations.clone());
    let upgrades = UpgradeService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    );

    Fixture {
        store,
        kind_id,
        country_id,
        boundary_id,
        association_id,
        boundaries,
        associations,
        countries,
        upgrades,
    }
}

#[tokio::test]
async fn close_twice_is_an_error() {
    let fx = fixture();
    assert!(fx.boundaries.close(fx.boundary_id, "tester").await.unwrap());
    assert_eq!(
        fx.boundaries.close(fx.boundary_id, "tester").await.unwrap_err(),
        DomainError::DeletedBoundary
    );
}

#[tokio::test]
async fn restore_requires_a_deleted_row() {
    let fx = fixture();
    assert_eq!(
        fx.boundaries
            .restore(fx.boundary_id, "tester")
            .await
            .unwrap_err(),
        DomainError::NotDeletedBoundary
    );

    fx.boundaries.close(fx.boundary_id, "tester").await.unwrap();
    assert!(fx
        .boundaries
        .restore(fx.boundary_id, "tester")
        .await
        .unwrap());
    let restored = fx.boundaries.get_by_id(fx.boundary_id).await.unwrap();
    assert!(restored.audit.deleted_at_ms.is_none());
    assert_eq!(restored.audit.updated_by, "tester");
}

#[tokio::test]
async fn add_boundary_validates_kind() {
    let fx = fixture();
    let polygon = Polygon::from_rings(&[square(0.0, 0.0, 3.0)]).unwrap();

    assert_eq!(
        fx.boundaries
            .add(None, fx.kind_id, "tester")
            .await
            .unwrap_err(),
        DomainError::EmptyCoordinates
    );
    assert_eq!(
        fx.boundaries
            .add(Some(polygon.clone()), 999, "tester")
            .await
            .unwrap_err(),
        DomainError::NotFoundBoundaryKind
    );

    let mut retired_audit = AuditStamp::new("tester");
    retired_audit.mark_deleted("tester");
    let retired_kind = fx.store.insert_kind(BoundaryKind {
        id: 0,
        name: "retired".to_string(),
        background_color: "#000000".to_string(),
        border_color: "#000000".to_string(),
        audit: retired_audit,
    });
    assert_eq!(
        fx.boundaries
            .add(Some(polygon.clone()), retired_kind, "tester")
            .await
            .unwrap_err(),
        DomainError::DeletedBoundaryKind
    );

    let id = fx
        .boundaries
        .add(Some(polygon), fx.kind_id, "tester")
        .await
        .unwrap();
    let created = fx.boundaries.get_by_id(id).await.unwrap();
    assert!(!created.is_system);
    assert_eq!(created.audit.created_by, "tester");
}

#[tokio::test]
async fn association_add_validates_zoom_and_uniqueness() {
    let fx = fixture();

    assert_eq!(
        fx.associations
            .add(fx.country_id, fx.boundary_id, None, "tester")
            .await
            .unwrap_err(),
        DomainError::EmptyZoom
    );
    assert_eq!(
        fx.associations
            .add(fx.country_id, fx.boundary_id, Some(2), "tester")
            .await
            .unwrap_err(),
        DomainError::IncorrectZoom
    );
    assert_eq!(
        fx.associations
            .add(fx.country_id, fx.boundary_id, Some(25), "tester")
            .await
            .unwrap_err(),
        DomainError::IncorrectZoom
    );
    // An active link for the pair already exists.
    assert_eq!(
        fx.associations
            .add(fx.country_id, fx.boundary_id, Some(4), "tester")
            .await
            .unwrap_err(),
        DomainError::ExistsCountryBoundary
    );
    assert_eq!(
        fx.associations
            .add(999, fx.boundary_id, Some(4), "tester")
            .await
            .unwrap_err(),
        DomainError::NotFoundCountry
    );
}

#[tokio::test]
async fn association_snapshots_center_and_area() {
    let fx = fixture();
    let polygon = Polygon::from_rings(&[square(100.0, 100.0, 4.0)]).unwrap();
    let boundary_id = fx
        .boundaries
        .add(Some(polygon), fx.kind_id, "tester")
        .await
        .unwrap();

    let id = fx
        .associations
        .add(fx.country_id, boundary_id, Some(6), "tester")
        .await
        .unwrap();
    let created = fx.associations.get_by_id(id).await.unwrap();
    assert!((created.area - 16.0).abs() < 1e-9);
    assert!((created.center[0] - 102.0).abs() < 1e-9);
    assert!((created.center[1] - 102.0).abs() < 1e-9);
}

#[tokio::test]
async fn pair_lookup_prefers_the_active_row() {
    let fx = fixture();
    fx.associations
        .close(fx.association_id, "tester")
        .await
        .unwrap();
    let second = fx
        .associations
        .add(fx.country_id, fx.boundary_id, Some(4), "tester")
        .await
        .unwrap();

    let found = fx
        .associations
        .get_by_country_and_boundary(fx.country_id, fx.boundary_id)
        .await
        .unwrap()
        .expect("pair should resolve");
    assert_eq!(found.id, second);
    assert!(found.audit.deleted_at_ms.is_none());
}

#[tokio::test]
async fn current_boundary_is_the_largest_area() {
    let fx = fixture();
    let small = Polygon::from_rings(&[square(0.0, 0.0, 10.0)]).unwrap(); // area 100
    let large = Polygon::from_rings(&[square(0.0, 0.0, 20.0)]).unwrap(); // area 400

    let small_id = fx
        .boundaries
        .add(Some(small), fx.kind_id, "tester")
        .await
        .unwrap();
    let large_id = fx
        .boundaries
        .add(Some(large), fx.kind_id, "tester")
        .await
        .unwrap();
    fx.associations
        .add(fx.country_id, small_id, Some(4), "tester")
        .await
        .unwrap();
    fx.associations
        .add(fx.country_id, large_id, Some(4), "tester")
        .await
        .unwrap();

    let current = fx
        .associations
        .current_of(fx.country_id)
        .await
        .unwrap()
        .expect("country has active links");
    assert_eq!(current.boundary_id, large_id);
    assert!((current.area - 400.0).abs() < 1e-9);
}

#[tokio::test]
async fn upgrade_replaces_the_boundary_and_keeps_history() {
    let fx = fixture();
    let rings = vec![
        square(0.0, 0.0, 20.0),
        vec![[5.0, 5.0], [5.0, 15.0], [15.0, 15.0], [15.0, 5.0], [5.0, 5.0]],
    ];
    let request = UpgradeRequest {
        country_id: Some(fx.country_id),
        boundary_id: Some(fx.boundary_id),
        rings: Some(rings.clone()),
    };

    let new_association_id = fx.upgrades.upgrade(&request, "operator").await.unwrap();
    assert_ne!(new_association_id, fx.association_id);

    // The old link survives as history.
    let old = fx.associations.get_by_id(fx.association_id).await.unwrap();
    assert!(old.audit.deleted_at_ms.is_some());
    assert_eq!(old.audit.updated_by, "operator");

    // The new link is active and points at a boundary with the new rings,
    // inheriting the prior kind and zoom.
    let new = fx.associations.get_by_id(new_association_id).await.unwrap();
    assert!(new.audit.deleted_at_ms.is_none());
    assert_eq!(new.zoom, old.zoom);
    let boundary = fx.boundaries.get_by_id(new.boundary_id).await.unwrap();
    assert_eq!(boundary.kind_id, fx.kind_id);
    assert_eq!(boundary.polygon.to_rings(), rings);

    // The pair lookup for the old boundary now resolves to the closed row.
    let historical = fx
        .associations
        .get_by_country_and_boundary(fx.country_id, fx.boundary_id)
        .await
        .unwrap()
        .expect("history is preserved");
    assert_eq!(historical.id, fx.association_id);
}

#[tokio::test]
async fn upgrade_rejects_an_unchanged_polygon() {
    let fx = fixture();
    let request = UpgradeRequest {
        country_id: Some(fx.country_id),
        boundary_id: Some(fx.boundary_id),
        rings: Some(vec![square(0.0, 0.0, 10.0)]),
    };
    assert_eq!(
        fx.upgrades.upgrade(&request, "operator").await.unwrap_err(),
        DomainError::NotChangesCoordinates
    );
}

#[tokio::test]
async fn upgrade_validation_failures_write_nothing() {
    let fx = fixture();
    let before = fx.associations.list().await.unwrap();

    let open_ring = UpgradeRequest {
        country_id: Some(fx.country_id),
        boundary_id: Some(fx.boundary_id),
        rings: Some(vec![vec![[0.0, 0.0], [0.0, 5.0], [5.0, 0.0], [1.0, 1.0]]]),
    };
    assert_eq!(
        fx.upgrades.upgrade(&open_ring, "operator").await.unwrap_err(),
        DomainError::IncorrectCoordinates
    );

    let unknown_pair = UpgradeRequest {
        country_id: Some(fx.country_id),
        boundary_id: Some(999),
        rings: Some(vec![square(0.0, 0.0, 5.0)]),
    };
    assert_eq!(
        fx.upgrades
            .upgrade(&unknown_pair, "operator")
            .await
            .unwrap_err(),
        DomainError::NotFoundBoundary
    );

    assert_eq!(fx.associations.list().await.unwrap(), before);
}

#[tokio::test]
async fn conflicting_commit_leaves_no_partial_state() {
    let fx = fixture();

    // Another upgrade wins the race and closes the association first.
    fx.associations
        .close(fx.association_id, "rival")
        .await
        .unwrap();
    let associations_before = fx.associations.list().await.unwrap();
    let boundaries_before = fx.boundaries.list().await.unwrap();

    let polygon = Polygon::from_rings(&[square(0.0, 0.0, 7.0)]).unwrap();
    let stale = UpgradeCommit {
        close_association_id: fx.association_id,
        boundary: NewBoundary {
            kind_id: fx.kind_id,
            polygon: polygon.clone(),
            is_system: false,
            audit: AuditStamp::new("loser"),
        },
        association: NewCountryBoundary {
            country_id: fx.country_id,
            boundary_id: 0,
            center: polygon.interior_point(),
            area: polygon.area(),
            zoom: 4,
            is_system: false,
            audit: AuditStamp::new("loser"),
        },
    };

    let err = fx.store.commit_upgrade(stale).await.unwrap_err();
    assert_eq!(err, DomainError::DeletedCountryBoundary);

    // No orphaned boundary, no new association, history untouched.
    assert_eq!(fx.associations.list().await.unwrap(), associations_before);
    assert_eq!(fx.boundaries.list().await.unwrap(), boundaries_before);
}

#[tokio::test]
async fn restore_cannot_create_a_second_active_pair() {
    let fx = fixture();
    fx.associations
        .close(fx.association_id, "tester")
        .await
        .unwrap();
    let replacement = fx
        .associations
        .add(fx.country_id, fx.boundary_id, Some(4), "tester")
        .await
        .unwrap();

    // Reactivating the closed row would give the pair two active links.
    assert_eq!(
        fx.associations
            .restore(fx.association_id, "tester")
            .await
            .unwrap_err(),
        DomainError::ExistsCountryBoundary
    );
    let old = fx.associations.get_by_id(fx.association_id).await.unwrap();
    assert!(old.audit.deleted_at_ms.is_some());

    // With the replacement closed again the restore goes through.
    fx.associations.close(replacement, "tester").await.unwrap();
    assert!(fx
        .associations
        .restore(fx.association_id, "tester")
        .await
        .unwrap());
    let active: Vec<_> = fx
        .associations
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|row| {
            row.country_id == fx.country_id
                && row.boundary_id == fx.boundary_id
                && row.audit.deleted_at_ms.is_none()
        })
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, fx.association_id);
}

#[tokio::test]
async fn country_list_filters_on_boundary_presence() {
    let fx = fixture();
    fx.store.insert_country(Country {
        id: 0,
        name: "Bareland".to_string(),
        description: None,
        color: "#0000aa".to_string(),
        language: None,
        organization_id: None,
        audit: AuditStamp::new("tester"),
    });

    let all = fx.countries.list(None).await.unwrap();
    assert_eq!(all.len(), 2);

    let with = fx.countries.list(Some(true)).await.unwrap();
    assert_eq!(with.len(), 1);
    assert_eq!(with[0].name, "Northmark");

    let without = fx.countries.list(Some(false)).await.unwrap();
    assert_eq!(without.len(), 1);
    assert_eq!(without[0].name, "Bareland");
}

#[tokio::test]
async fn aggregate_view_centers_on_the_largest_area() {
    let fx = fixture();
    let large = Polygon::from_rings(&[square(0.0, 0.0, 20.0)]).unwrap();
    let large_id = fx
        .boundaries
        .add(Some(large), fx.kind_id, "tester")
        .await
        .unwrap();
    fx.associations
        .add(fx.country_id, large_id, Some(8), "tester")
        .await
        .unwrap();

    let view = fx.countries.list_with_boundaries().await.unwrap();
    assert_eq!(view.len(), 1);
    let entry = &view[0];
    assert_eq!(entry.name, "Northmark");
    assert_eq!(entry.zoom, 8);
    assert!((entry.center[0] - 10.0).abs() < 1e-9);
    assert_eq!(entry.boundaries.len(), 2);
    assert!(entry
        .boundaries
        .iter()
        .all(|item| item.background_color.as_deref() == Some("#aa0000")));
    assert!(entry
        .boundaries
        .iter()
        .all(|item| item.border_color.as_deref() == Some("#0004ff")));
}

#[tokio::test]
async fn per_country_view_reports_all_active_items() {
    let fx = fixture();
    let view = fx
        .associations
        .boundaries_of_country(fx.country_id)
        .await
        .unwrap();
    assert_eq!(view.id, fx.country_id);
    assert_eq!(view.name, "Northmark");
    assert_eq!(view.zoom, 4);
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].boundary_id, fx.boundary_id);

    assert_eq!(
        fx.associations.boundaries_of_country(999).await.unwrap_err(),
        DomainError::NotFoundCountry
    );
}
