// Integration tests for Nearest Tow

use async_trait::async_trait;
use nearest_tow::config::MatchingSettings;
use nearest_tow::models::{
    CandidateKind, Company, CompanyContact, GeoPoint, NearestQuery, OperatingArea, RatingSummary,
    ResolvedArea, TowTruck,
};
use nearest_tow::routes::{search, SearchError};
use nearest_tow::services::{GeoResolver, GeocodeError, InMemoryPool, NoopGeoResolver, StaticRatings};
use std::collections::HashSet;

const USER: (f64, f64) = (39.9334, 32.8597); // Kızılay, Ankara

/// Tow truck whose company sits `km` kilometers north of the user
fn create_tow_truck(id: i32, province_id: i32, district_id: i32, km: Option<f64>) -> TowTruck {
    TowTruck {
        id,
        company_id: 100 + id,
        license_plate: format!("06 TR {:03}", id),
        driver_name: format!("Driver {}", id),
        driver_photo_url: None,
        operating_areas: vec![OperatingArea {
            province_id,
            district_id,
            city: "Ankara".to_string(),
            district: String::new(),
        }],
        is_active: true,
        company: CompanyContact {
            name: format!("Kurtarma {}", id),
            phone: "03120000000".to_string(),
            location: km.and_then(|km| GeoPoint::new(USER.0 + km / 111.195, USER.1)),
            ..Default::default()
        },
        updated_at: None,
    }
}

fn create_company(id: i32, province_id: i32, district_id: i32, km: f64) -> Company {
    let lat = USER.0 + km / 111.195;
    Company {
        id,
        first_name: "Ayşe".to_string(),
        last_name: "Yılmaz".to_string(),
        province_id,
        district_id,
        latitude: Some(lat),
        longitude: Some(USER.1),
        service_city: "Ankara".to_string(),
        service_district: None,
        is_active: true,
        contact: CompanyContact {
            name: format!("Firma {}", id),
            phone: "03121111111".to_string(),
            location: GeoPoint::new(lat, USER.1),
            ..Default::default()
        },
        areas: vec![],
    }
    .with_home_area()
}

fn query(limit: Option<i64>, province_id: Option<i32>, district_id: Option<i32>) -> NearestQuery {
    NearestQuery {
        latitude: Some(USER.0),
        longitude: Some(USER.1),
        limit,
        province_id,
        district_id,
    }
}

/// Geo resolver that always answers with the same area
struct FixedArea(ResolvedArea);

#[async_trait]
impl GeoResolver for FixedArea {
    async fn resolve(&self, _point: GeoPoint) -> Result<ResolvedArea, GeocodeError> {
        Ok(self.0)
    }
}

/// Geo resolver that always fails
struct Unreachable;

#[async_trait]
impl GeoResolver for Unreachable {
    async fn resolve(&self, _point: GeoPoint) -> Result<ResolvedArea, GeocodeError> {
        Err(GeocodeError::ApiError("service unavailable".to_string()))
    }
}

#[derive(Debug)]
struct StoreDown;

impl std::fmt::Display for StoreDown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store unavailable")
    }
}

impl std::error::Error for StoreDown {}

/// Provider whose every query fails
struct BrokenPool;

#[async_trait]
impl nearest_tow::CandidateProvider for BrokenPool {
    type Candidate = TowTruck;
    type Error = StoreDown;

    async fn by_district(&self, _: i32, _: &[i32]) -> Result<Vec<TowTruck>, StoreDown> {
        Err(StoreDown)
    }

    async fn by_province(&self, _: i32, _: &[i32]) -> Result<Vec<TowTruck>, StoreDown> {
        Err(StoreDown)
    }

    async fn all(&self, _: &[i32]) -> Result<Vec<TowTruck>, StoreDown> {
        Err(StoreDown)
    }

    async fn random_sample(&self, _: usize, _: &[i32]) -> Result<Vec<TowTruck>, StoreDown> {
        Err(StoreDown)
    }
}

#[tokio::test]
async fn test_district_tier_fills_small_quota() {
    let mut trucks = vec![
        create_tow_truck(1, 6, 601, Some(2.0)),
        create_tow_truck(2, 6, 601, Some(5.0)),
        create_tow_truck(3, 6, 601, Some(1.0)),
    ];
    trucks.extend((10..20).map(|id| create_tow_truck(id, 6, 602, Some(30.0 + id as f64))));
    let pool = InMemoryPool::new(trucks);

    let results = search(
        &query(Some(2), Some(6), Some(601)),
        &MatchingSettings::default(),
        &NoopGeoResolver,
        &pool,
        &StaticRatings::default(),
    )
    .await
    .unwrap();

    let ids: Vec<i32> = results.iter().map(|r| r.candidate.id).collect();
    assert_eq!(ids, vec![3, 1]);
    assert!((results[0].distance.unwrap() - 1.0).abs() < 0.05);
    assert!((results[1].distance.unwrap() - 2.0).abs() < 0.05);
}

#[tokio::test]
async fn test_nationwide_fallback_finds_distant_truck() {
    let pool = InMemoryPool::new(vec![create_tow_truck(7, 34, 3401, Some(50.0))]);

    let results = search(
        &query(Some(5), Some(6), Some(601)),
        &MatchingSettings::default(),
        &NoopGeoResolver,
        &pool,
        &StaticRatings::default(),
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].candidate.id, 7);
    assert!((results[0].distance.unwrap() - 50.0).abs() < 0.5);
}

#[tokio::test]
async fn test_without_coordinates_returns_random_sample() {
    let pool = InMemoryPool::new((1..=30).map(|id| create_tow_truck(id, 6, 601, Some(1.0))).collect());

    let no_geo = NearestQuery {
        latitude: None,
        longitude: None,
        limit: Some(20),
        province_id: None,
        district_id: None,
    };

    let results = search(
        &no_geo,
        &MatchingSettings::default(),
        &NoopGeoResolver,
        &pool,
        &StaticRatings::default(),
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 20);
    let unique: HashSet<i32> = results.iter().map(|r| r.candidate.id).collect();
    assert_eq!(unique.len(), 20);
    assert!(results.iter().all(|r| r.distance.is_none()));
}

#[tokio::test]
async fn test_zero_zero_means_no_coordinates() {
    let pool = InMemoryPool::new((1..=5).map(|id| create_tow_truck(id, 6, 601, Some(id as f64))).collect());

    let null_island = NearestQuery {
        latitude: Some(0.0),
        longitude: Some(0.0),
        limit: Some(3),
        province_id: None,
        district_id: None,
    };

    // Would fill province 6 if the origin were treated as real
    let geo = FixedArea(ResolvedArea {
        province_id: Some(99),
        district_id: None,
    });

    let results = search(&null_island, &MatchingSettings::default(), &geo, &pool, &StaticRatings::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.distance.is_none()));
}

#[tokio::test]
async fn test_default_limits_per_variant() {
    let trucks = InMemoryPool::new((1..=40).map(|id| create_tow_truck(id, 6, 601, Some(id as f64))).collect());
    let companies = InMemoryPool::new((1..=40).map(|id| create_company(id, 6, 601, id as f64)).collect());
    let matching = MatchingSettings::default();
    let ratings = StaticRatings::default();

    let truck_results = search(&query(None, None, None), &matching, &NoopGeoResolver, &trucks, &ratings)
        .await
        .unwrap();
    let company_results = search(&query(None, None, None), &matching, &NoopGeoResolver, &companies, &ratings)
        .await
        .unwrap();

    assert_eq!(truck_results.len(), 20);
    assert_eq!(company_results.len(), 10);

    // Nearest first
    assert_eq!(company_results[0].candidate.id, 1);
    assert!(company_results
        .windows(2)
        .all(|w| w[0].distance.unwrap() <= w[1].distance.unwrap()));
}

#[tokio::test]
async fn test_invalid_limit_is_rejected() {
    let pool = InMemoryPool::new(vec![create_tow_truck(1, 6, 601, Some(1.0))]);

    for limit in [0, 51, -1] {
        let result = search(
            &query(Some(limit), None, None),
            &MatchingSettings::default(),
            &NoopGeoResolver,
            &pool,
            &StaticRatings::default(),
        )
        .await;

        assert!(matches!(result, Err(SearchError::InvalidQuery(_))), "limit {}", limit);
    }
}

#[tokio::test]
async fn test_geo_resolver_fills_missing_area() {
    let pool = InMemoryPool::new(vec![
        create_tow_truck(1, 6, 601, Some(40.0)),
        create_tow_truck(2, 6, 602, Some(3.0)),
        create_tow_truck(3, 6, 603, Some(1.0)),
    ]);

    let geo = FixedArea(ResolvedArea {
        province_id: Some(6),
        district_id: Some(601),
    });

    // Quota of one is satisfied by the resolved district alone
    let results = search(&query(Some(1), None, None), &MatchingSettings::default(), &geo, &pool, &StaticRatings::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].candidate.id, 1);
}

#[tokio::test]
async fn test_explicit_area_wins_over_geo_resolver() {
    let pool = InMemoryPool::new(vec![
        create_tow_truck(1, 6, 601, Some(40.0)),
        create_tow_truck(2, 6, 602, Some(3.0)),
    ]);

    let geo = FixedArea(ResolvedArea {
        province_id: Some(6),
        district_id: Some(601),
    });

    let results = search(
        &query(Some(1), Some(6), Some(602)),
        &MatchingSettings::default(),
        &geo,
        &pool,
        &StaticRatings::default(),
    )
    .await
    .unwrap();

    assert_eq!(results[0].candidate.id, 2);
}

#[tokio::test]
async fn test_geocoded_district_outside_requested_province_is_ignored() {
    let pool = InMemoryPool::new(vec![
        create_tow_truck(1, 34, 3401, Some(333.0)),
        create_tow_truck(2, 6, 601, Some(5.5)),
    ]);

    let geo = FixedArea(ResolvedArea {
        province_id: Some(34),
        district_id: Some(3401),
    });

    let results = search(&query(Some(1), Some(6), None), &MatchingSettings::default(), &geo, &pool, &StaticRatings::default())
        .await
        .unwrap();

    let ids: Vec<i32> = results.iter().map(|r| r.candidate.id).collect();
    assert_eq!(ids, vec![2]);
    assert!((results[0].distance.unwrap() - 5.5).abs() < 0.1);
}

#[tokio::test]
async fn test_geo_failure_degrades_to_distance_search() {
    let pool = InMemoryPool::new(vec![
        create_tow_truck(1, 6, 601, Some(8.0)),
        create_tow_truck(2, 34, 3401, Some(2.0)),
    ]);

    let results = search(&query(Some(5), None, None), &MatchingSettings::default(), &Unreachable, &pool, &StaticRatings::default())
        .await
        .unwrap();

    let ids: Vec<i32> = results.iter().map(|r| r.candidate.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn test_store_failure_fails_request() {
    let result = search(
        &query(Some(5), Some(6), Some(601)),
        &MatchingSettings::default(),
        &NoopGeoResolver,
        &BrokenPool,
        &StaticRatings::default(),
    )
    .await;

    match result {
        Err(SearchError::Candidates(e)) => assert_eq!(e.to_string(), "store unavailable"),
        other => panic!("expected candidate failure, got {:?}", other.map(|r| r.len())),
    }
}

#[tokio::test]
async fn test_results_carry_ratings_and_contact() {
    let pool = InMemoryPool::new(vec![
        create_tow_truck(1, 6, 601, Some(1.0)),
        create_tow_truck(2, 6, 601, Some(2.0)),
    ]);
    let ratings = StaticRatings::default().with(
        CandidateKind::TowTruck,
        2,
        RatingSummary::from_raw(4.666, 3),
    );

    let results = search(&query(Some(5), Some(6), Some(601)), &MatchingSettings::default(), &NoopGeoResolver, &pool, &ratings)
        .await
        .unwrap();

    assert_eq!(results[0].review_count, 0);
    assert_eq!(results[0].average_rating, 0.0);
    assert_eq!(results[1].average_rating, 4.7);
    assert_eq!(results[1].review_count, 3);
    assert_eq!(results[1].company_name, "Kurtarma 2");

    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json[1]["companyPhone"], "03120000000");
    assert_eq!(json[1]["licensePlate"], "06 TR 002");
    assert_eq!(json[1]["operatingAreas"][0]["districtId"], 601);
}

#[tokio::test]
async fn test_empty_pool_returns_empty_list() {
    let pool: InMemoryPool<Company> = InMemoryPool::new(vec![]);

    let results = search(&query(None, Some(6), Some(601)), &MatchingSettings::default(), &NoopGeoResolver, &pool, &StaticRatings::default())
        .await
        .unwrap();

    assert!(results.is_empty());
    assert_eq!(serde_json::to_string(&results).unwrap(), "[]");
}
