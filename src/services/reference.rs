use std::collections::HashMap;

use crate::models::{District, Province, ResolvedArea};
use crate::services::postgres::{PostgresClient, PostgresError};

/// In-memory index over the province/district reference tables
///
/// Loaded once at startup. Reverse geocoding results are matched against it
/// by normalized name.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    provinces: Vec<Province>,
    districts: HashMap<i32, Vec<District>>,
    province_by_name: HashMap<String, i32>,
}

impl ReferenceIndex {
    pub fn new(provinces: Vec<Province>, districts: Vec<District>) -> Self {
        let province_by_name = provinces
            .iter()
            .map(|p| (normalize_name(&p.name), p.province_id))
            .collect();

        let mut by_province: HashMap<i32, Vec<District>> = HashMap::new();
        for district in districts {
            by_province
                .entry(district.province_id)
                .or_default()
                .push(district);
        }

        Self {
            provinces,
            districts: by_province,
            province_by_name,
        }
    }

    /// Load the index from the database
    pub async fn load(db: &PostgresClient) -> Result<Self, PostgresError> {
        let provinces = db.fetch_provinces().await?;
        let districts = db.fetch_districts().await?;

        tracing::info!(
            "Loaded reference data: {} provinces, {} districts",
            provinces.len(),
            districts.len()
        );

        Ok(Self::new(provinces, districts))
    }

    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    pub fn districts_of(&self, province_id: i32) -> &[District] {
        self.districts
            .get(&province_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn province_id(&self, name: &str) -> Option<i32> {
        self.province_by_name.get(&normalize_name(name)).copied()
    }

    /// Match geocoder place names to reference ids
    ///
    /// The district is looked up only within the matched province; the first
    /// district name that matches wins.
    pub fn lookup<'a, I>(&self, province_name: Option<&str>, district_names: I) -> ResolvedArea
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(province_id) = province_name.and_then(|name| self.province_id(name)) else {
            return ResolvedArea::default();
        };

        let candidates = self.districts_of(province_id);
        let district_id = district_names.into_iter().find_map(|name| {
            let wanted = normalize_name(name);
            candidates
                .iter()
                .find(|d| normalize_name(&d.name) == wanted)
                .map(|d| d.district_id)
        });

        ResolvedArea {
            province_id: Some(province_id),
            district_id,
        }
    }
}

const NAME_SUFFIXES: [&str; 5] = [" ili", " ilçesi", " ilcesi", " province", " district"];

/// Normalize a place name for matching
///
/// Lowercases with Turkish dotted/dotless i handled, folds Turkish letters
/// to ASCII and strips administrative suffixes.
pub fn normalize_name(name: &str) -> String {
    let mut lowered: String = name
        .trim()
        .chars()
        .flat_map(|c| match c {
            'I' => vec!['ı'],
            'İ' => vec!['i'],
            _ => c.to_lowercase().collect(),
        })
        .collect();

    for suffix in NAME_SUFFIXES {
        if let Some(stripped) = lowered.strip_suffix(suffix) {
            lowered = stripped.to_string();
            break;
        }
    }

    lowered
        .chars()
        .filter(|c| *c != '\u{307}')
        .map(|c| match c {
            'ı' => 'i',
            'ş' => 's',
            'ğ' => 'g',
            'ü' => 'u',
            'ö' => 'o',
            'ç' => 'c',
            'â' => 'a',
            'î' => 'i',
            'û' => 'u',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
