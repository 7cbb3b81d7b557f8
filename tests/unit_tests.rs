// Unit tests for Nearest Tow

use nearest_tow::core::{
    distance::{distance_between, haversine_distance},
    ranking::{compare_distance, rank_batch, sort_by_distance, ResultSet},
};
use nearest_tow::models::{Company, CompanyContact, GeoPoint, RatingSummary, SearchContext};
use nearest_tow::services::normalize_name;
use std::cmp::Ordering;

fn create_company(id: i32, location: Option<(f64, f64)>, is_active: bool) -> Company {
    Company {
        id,
        first_name: "Can".to_string(),
        last_name: "Öztürk".to_string(),
        province_id: 16,
        district_id: 1601,
        latitude: location.map(|l| l.0),
        longitude: location.map(|l| l.1),
        service_city: "Bursa".to_string(),
        service_district: None,
        is_active,
        contact: CompanyContact {
            location: location.and_then(|(lat, lon)| GeoPoint::new(lat, lon)),
            ..Default::default()
        },
        areas: vec![],
    }
    .with_home_area()
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(40.1885, 29.0610, 40.1885, 29.0610);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_bursa_to_istanbul() {
    // Bursa to Istanbul is roughly 90-100 km as the crow flies
    let distance = haversine_distance(40.1885, 29.0610, 41.0082, 28.9784);
    assert!(distance > 85.0 && distance < 100.0, "got {}", distance);
}

#[test]
fn test_distance_between_points() {
    let a = GeoPoint::new(40.1885, 29.0610).unwrap();
    let b = GeoPoint::new(41.0082, 28.9784).unwrap();
    assert_eq!(distance_between(a, b), haversine_distance(40.1885, 29.0610, 41.0082, 28.9784));
}

#[test]
fn test_geo_point_validation() {
    assert!(GeoPoint::new(90.0, 180.0).is_some());
    assert!(GeoPoint::new(90.1, 0.0).is_none());
    assert!(GeoPoint::new(0.0, -180.5).is_none());
    assert!(GeoPoint::new(f64::INFINITY, 0.0).is_none());

    // The wire format treats only the exact 0,0 pair as absent
    assert!(GeoPoint::from_wire(Some(0.0), Some(0.0)).is_none());
    assert!(GeoPoint::from_wire(Some(0.0), Some(32.5)).is_some());
    assert!(GeoPoint::from_wire(None, Some(32.5)).is_none());
    assert!(GeoPoint::from_wire(Some(f64::NAN), Some(f64::NAN)).is_none());
}

#[test]
fn test_compare_distance_puts_unknown_last() {
    assert_eq!(compare_distance(Some(1.0), Some(2.0)), Ordering::Less);
    assert_eq!(compare_distance(Some(100.0), None), Ordering::Less);
    assert_eq!(compare_distance(None, Some(0.0)), Ordering::Greater);
    assert_eq!(compare_distance(None, None), Ordering::Equal);
}

#[test]
fn test_rank_batch_without_origin() {
    let ranked = rank_batch(vec![create_company(1, Some((40.2, 29.0)), true)], None);
    assert_eq!(ranked.len(), 1);
    assert!(ranked[0].distance_km.is_none());
}

#[test]
fn test_sort_by_distance_is_stable() {
    let origin = GeoPoint::new(40.1885, 29.0610);
    let mut ranked = rank_batch(
        vec![
            create_company(1, None, true),
            create_company(2, Some((40.3, 29.0)), true),
            create_company(3, None, true),
            create_company(4, Some((40.19, 29.06)), true),
        ],
        origin,
    );

    sort_by_distance(&mut ranked);

    let ids: Vec<i32> = ranked.iter().map(|r| r.candidate.id).collect();
    assert_eq!(ids, vec![4, 2, 1, 3]);
}

#[test]
fn test_result_set_quota_and_dedup() {
    let mut set = ResultSet::new(2);

    let added = set.extend(rank_batch(
        vec![create_company(1, None, true), create_company(1, None, true)],
        None,
    ));
    assert_eq!(added, 1);
    assert_eq!(set.remaining(), 1);

    let added = set.extend(rank_batch(
        vec![
            create_company(2, None, false),
            create_company(3, None, true),
            create_company(4, None, true),
        ],
        None,
    ));
    assert_eq!(added, 1);
    assert!(set.is_full());

    let ids: Vec<i32> = set.into_results().iter().map(|r| r.candidate.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn test_search_context() {
    let context = SearchContext::new(None, 10).with_area(Some(16), None);
    assert!(!context.has_geo());
    assert_eq!(context.province_id, Some(16));
    assert_eq!(context.district_id, None);
}

#[test]
fn test_rating_summary_rounding() {
    assert_eq!(RatingSummary::from_raw(3.25, 4).average_rating, 3.3);
    assert_eq!(RatingSummary::from_raw(4.04, 2).average_rating, 4.0);
    assert_eq!(RatingSummary::from_raw(5.0, 0), RatingSummary::default());
}

#[test]
fn test_normalize_name_matches_ascii_spelling() {
    assert_eq!(normalize_name("Şanlıurfa"), normalize_name("Sanliurfa"));
    assert_eq!(normalize_name("Gümüşhane İli"), "gumushane");
}
