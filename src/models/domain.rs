use serde::{Deserialize, Serialize};

/// A validated latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self { lat, lon })
    }

    /// Interpret coordinates as they arrive on the wire.
    ///
    /// The public API inherited two absence sentinels: `NaN` and the `0, 0`
    /// pair. Both, as well as missing or invalid values, mean "no origin".
    pub fn from_wire(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        let (lat, lon) = (lat?, lon?);
        if lat == 0.0 && lon == 0.0 {
            return None;
        }
        Self::new(lat, lon)
    }

    /// Build a point from nullable columns
    pub fn from_columns(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        Self::new(lat?, lon?)
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// Which kind of entity a candidate pool contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    TowTruck,
    Company,
}

/// A (province, district) pair a candidate declares as serviceable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingArea {
    pub province_id: i32,
    pub district_id: i32,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub district: String,
}

/// Company display fields attached to every search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyContact {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub location: Option<GeoPoint>,
}

/// A matchable unit the resolver can rank
pub trait Candidate {
    /// Ratings and logging use this to tell pools apart
    const KIND: CandidateKind;

    fn id(&self) -> i32;
    fn is_active(&self) -> bool;
    fn location(&self) -> Option<GeoPoint>;
    fn operating_areas(&self) -> &[OperatingArea];
    fn contact(&self) -> &CompanyContact;

    fn serves_district(&self, district_id: i32) -> bool {
        self.operating_areas().iter().any(|a| a.district_id == district_id)
    }

    fn serves_province(&self, province_id: i32) -> bool {
        self.operating_areas().iter().any(|a| a.province_id == province_id)
    }
}

/// Tow truck registered by a company.
///
/// Trucks have no coordinates of their own; they are ranked by the
/// coordinates of the owning company.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowTruck {
    pub id: i32,
    pub company_id: i32,
    pub license_plate: String,
    pub driver_name: String,
    pub driver_photo_url: Option<String>,
    pub operating_areas: Vec<OperatingArea>,
    #[serde(skip)]
    pub is_active: bool,
    #[serde(skip)]
    pub company: CompanyContact,
    #[serde(skip)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Candidate for TowTruck {
    const KIND: CandidateKind = CandidateKind::TowTruck;

    fn id(&self) -> i32 {
        self.id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn location(&self) -> Option<GeoPoint> {
        self.company.location
    }

    fn operating_areas(&self) -> &[OperatingArea] {
        &self.operating_areas
    }

    fn contact(&self) -> &CompanyContact {
        &self.company
    }
}

/// Towing company, matched directly in the company-search variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub province_id: i32,
    pub district_id: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub service_city: String,
    pub service_district: Option<String>,
    #[serde(skip)]
    pub is_active: bool,
    #[serde(skip)]
    pub contact: CompanyContact,
    #[serde(skip)]
    pub areas: Vec<OperatingArea>,
}

impl Company {
    /// Derive the single operating area from the company's own address
    pub fn with_home_area(mut self) -> Self {
        self.areas = vec![OperatingArea {
            province_id: self.province_id,
            district_id: self.district_id,
            city: self.contact.city.clone().unwrap_or_default(),
            district: self.contact.district.clone().unwrap_or_default(),
        }];
        self
    }
}

impl Candidate for Company {
    const KIND: CandidateKind = CandidateKind::Company;

    fn id(&self) -> i32 {
        self.id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn location(&self) -> Option<GeoPoint> {
        self.contact.location
    }

    fn operating_areas(&self) -> &[OperatingArea] {
        &self.areas
    }

    fn contact(&self) -> &CompanyContact {
        &self.contact
    }
}

/// Input bundle for one search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchContext {
    pub origin: Option<GeoPoint>,
    pub province_id: Option<i32>,
    pub district_id: Option<i32>,
    pub limit: usize,
}

impl SearchContext {
    pub fn new(origin: Option<GeoPoint>, limit: usize) -> Self {
        Self {
            origin,
            province_id: None,
            district_id: None,
            limit,
        }
    }

    pub fn with_area(mut self, province_id: Option<i32>, district_id: Option<i32>) -> Self {
        self.province_id = province_id;
        self.district_id = district_id;
        self
    }

    /// Whether usable user coordinates were supplied
    pub fn has_geo(&self) -> bool {
        self.origin.is_some()
    }
}

/// A candidate with its distance from the user, when one could be computed
#[derive(Debug, Clone)]
pub struct RankedResult<C> {
    pub candidate: C,
    pub distance_km: Option<f64>,
}

/// Province/district pair produced by reverse geocoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedArea {
    pub province_id: Option<i32>,
    pub district_id: Option<i32>,
}

impl ResolvedArea {
    pub fn is_empty(&self) -> bool {
        self.province_id.is_none() && self.district_id.is_none()
    }
}

/// Average rating and review count for one candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub review_count: i64,
}

impl RatingSummary {
    /// Build a summary from a raw average, rounding to one decimal
    pub fn from_raw(average: f64, review_count: i64) -> Self {
        if review_count == 0 {
            return Self::default();
        }
        Self {
            average_rating: (average * 10.0).round() / 10.0,
            review_count,
        }
    }
}

/// Province entry of the local reference dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Province {
    pub province_id: i32,
    pub name: String,
}

/// District entry of the local reference dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub district_id: i32,
    pub province_id: i32,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_sentinels() {
        assert!(GeoPoint::from_wire(Some(f64::NAN), Some(29.0)).is_none());
        assert!(GeoPoint::from_wire(Some(41.0), Some(f64::NAN)).is_none());
        assert!(GeoPoint::from_wire(Some(0.0), Some(0.0)).is_none());
        assert!(GeoPoint::from_wire(None, Some(29.0)).is_none());
        assert!(GeoPoint::from_wire(Some(91.0), Some(29.0)).is_none());
        assert!(GeoPoint::from_wire(Some(41.0), Some(181.0)).is_none());
        assert!(GeoPoint::from_wire(Some(41.0), Some(f64::INFINITY)).is_none());

        // Only the exact 0,0 pair is a sentinel
        assert!(GeoPoint::from_wire(Some(0.0), Some(29.0)).is_some());
        assert!(GeoPoint::from_wire(Some(51.4779), Some(0.0)).is_some());
    }

    #[test]
    fn test_company_home_area() {
        let company = Company {
            id: 7,
            first_name: "Ayse".to_string(),
            last_name: "Yilmaz".to_string(),
            province_id: 34,
            district_id: 1421,
            latitude: None,
            longitude: None,
            service_city: "Istanbul".to_string(),
            service_district: None,
            is_active: true,
            contact: CompanyContact {
                city: Some("Istanbul".to_string()),
                district: Some("Kadikoy".to_string()),
                ..Default::default()
            },
            areas: vec![],
        }
        .with_home_area();

        assert!(company.serves_district(1421));
        assert!(company.serves_province(34));
        assert!(!company.serves_province(6));
        assert_eq!(company.operating_areas()[0].district, "Kadikoy");
    }

    #[test]
    fn test_rating_rounding() {
        let summary = RatingSummary::from_raw(4.26, 3);
        assert_eq!(summary.average_rating, 4.3);
        assert_eq!(summary.review_count, 3);

        assert_eq!(RatingSummary::from_raw(3.0, 0), RatingSummary::default());
    }
}
