use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::models::{
    CandidateKind, Company, CompanyContact, District, GeoPoint, OperatingArea, Province,
    RatingSummary, TowTruck,
};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Which slice of a candidate table a query reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    District(i32),
    Province(i32),
    All,
    Random(usize),
}

const TOW_TRUCK_COLUMNS: &str = r#"
    t.id, t.company_id, t.license_plate, t.driver_name, t.driver_photo_url,
    t.is_active, t.updated_at,
    c.company_name, c.phone_number, c.email, c.full_address, c.city, c.district,
    c.latitude, c.longitude
"#;

const COMPANY_COLUMNS: &str = r#"
    id, first_name, last_name, company_name, phone_number, email, full_address,
    city, district, province_id, district_id, latitude, longitude,
    service_city, service_district, is_active
"#;

/// PostgreSQL client for the directory tables
///
/// Owns the connection pool and every query the service runs: candidate
/// pools, review aggregates and the province/district reference data.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Active tow trucks in the given scope, with their company and areas
    pub async fn fetch_tow_trucks(
        &self,
        scope: Scope,
        exclude: &[i32],
    ) -> Result<Vec<TowTruck>, PostgresError> {
        let (filter, order) = tow_truck_clauses(scope);

        let query = format!(
            "SELECT {} FROM tow_trucks t JOIN companies c ON c.id = t.company_id \
             WHERE t.is_active AND NOT (t.id = ANY($1)) {} {}",
            TOW_TRUCK_COLUMNS, filter, order
        );

        let rows = bind_scope(sqlx::query(&query).bind(exclude), scope)
            .fetch_all(&self.pool)
            .await?;

        let mut trucks = rows
            .iter()
            .map(tow_truck_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let ids: Vec<i32> = trucks.iter().map(|t| t.id).collect();
        let mut areas = self.fetch_areas(&ids).await?;
        for truck in &mut trucks {
            truck.operating_areas = areas.remove(&truck.id).unwrap_or_default();
        }

        tracing::debug!("Fetched {} tow trucks ({:?})", trucks.len(), scope);

        Ok(trucks)
    }

    /// Operating areas of the given tow trucks, grouped by truck id
    async fn fetch_areas(
        &self,
        tow_truck_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<OperatingArea>>, PostgresError> {
        if tow_truck_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = r#"
            SELECT tow_truck_id, province_id, district_id, city, district
            FROM tow_truck_areas
            WHERE tow_truck_id = ANY($1)
            ORDER BY id
        "#;

        let rows = sqlx::query(query)
            .bind(tow_truck_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut areas: HashMap<i32, Vec<OperatingArea>> = HashMap::new();
        for row in &rows {
            areas
                .entry(row.try_get("tow_truck_id")?)
                .or_default()
                .push(OperatingArea {
                    province_id: row.try_get("province_id")?,
                    district_id: row.try_get("district_id")?,
                    city: row.try_get("city")?,
                    district: row.try_get("district")?,
                });
        }

        Ok(areas)
    }

    /// Active companies in the given scope
    pub async fn fetch_companies(
        &self,
        scope: Scope,
        exclude: &[i32],
    ) -> Result<Vec<Company>, PostgresError> {
        let (filter, order) = company_clauses(scope);

        let query = format!(
            "SELECT {} FROM companies WHERE is_active AND NOT (id = ANY($1)) {} {}",
            COMPANY_COLUMNS, filter, order
        );

        let rows = bind_scope(sqlx::query(&query).bind(exclude), scope)
            .fetch_all(&self.pool)
            .await?;

        let companies = rows
            .iter()
            .map(company_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Fetched {} companies ({:?})", companies.len(), scope);

        Ok(companies)
    }

    /// Rating aggregates over visible, approved reviews
    ///
    /// Company ratings aggregate the reviews of all the company's trucks.
    pub async fn fetch_rating_stats(
        &self,
        kind: CandidateKind,
        ids: &[i32],
    ) -> Result<HashMap<i32, RatingSummary>, PostgresError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = match kind {
            CandidateKind::TowTruck => {
                r#"
                SELECT r.tow_truck_id AS id,
                       AVG(r.rating)::float8 AS average_rating,
                       COUNT(*) AS review_count
                FROM reviews r
                WHERE r.is_visible AND r.is_approved AND r.tow_truck_id = ANY($1)
                GROUP BY r.tow_truck_id
                "#
            }
            CandidateKind::Company => {
                r#"
                SELECT t.company_id AS id,
                       AVG(r.rating)::float8 AS average_rating,
                       COUNT(*) AS review_count
                FROM reviews r
                JOIN tow_trucks t ON t.id = r.tow_truck_id
                WHERE r.is_visible AND r.is_approved AND t.company_id = ANY($1)
                GROUP BY t.company_id
                "#
            }
        };

        let rows = sqlx::query(query).bind(ids).fetch_all(&self.pool).await?;

        let mut stats = HashMap::with_capacity(rows.len());
        for row in &rows {
            let average: Option<f64> = row.try_get("average_rating")?;
            let count: i64 = row.try_get("review_count")?;
            stats.insert(
                row.try_get("id")?,
                RatingSummary::from_raw(average.unwrap_or(0.0), count),
            );
        }

        Ok(stats)
    }

    /// Rating summary of a single tow truck, `NotFound` if it does not exist
    pub async fn tow_truck_rating(&self, tow_truck_id: i32) -> Result<RatingSummary, PostgresError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tow_trucks WHERE id = $1)")
                .bind(tow_truck_id)
                .fetch_one(&self.pool)
                .await?;

        if !exists {
            return Err(PostgresError::NotFound(format!(
                "Tow truck {} not found",
                tow_truck_id
            )));
        }

        let stats = self
            .fetch_rating_stats(CandidateKind::TowTruck, &[tow_truck_id])
            .await?;

        Ok(stats.get(&tow_truck_id).copied().unwrap_or_default())
    }

    /// Every province of the reference dataset
    pub async fn fetch_provinces(&self) -> Result<Vec<Province>, PostgresError> {
        let rows = sqlx::query("SELECT province_id, city_name FROM cities ORDER BY province_id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<Province, PostgresError> {
                Ok(Province {
                    province_id: row.try_get("province_id")?,
                    name: row.try_get("city_name")?,
                })
            })
            .collect()
    }

    /// Every district of the reference dataset with its province
    pub async fn fetch_districts(&self) -> Result<Vec<District>, PostgresError> {
        let query = r#"
            SELECT d.district_id, c.province_id, d.district_name
            FROM city_districts cd
            JOIN cities c ON c.id = cd.city_id
            JOIN districts d ON d.id = cd.district_id
            ORDER BY c.province_id, d.district_name
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<District, PostgresError> {
                Ok(District {
                    district_id: row.try_get("district_id")?,
                    province_id: row.try_get("province_id")?,
                    name: row.try_get("district_name")?,
                })
            })
            .collect()
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Filter and ordering clauses of a tow truck query
///
/// Trucks never updated sort after every updated one.
fn tow_truck_clauses(scope: Scope) -> (&'static str, &'static str) {
    match scope {
        Scope::District(_) => (
            "AND EXISTS (SELECT 1 FROM tow_truck_areas a WHERE a.tow_truck_id = t.id AND a.district_id = $2)",
            "",
        ),
        Scope::Province(_) => (
            "AND EXISTS (SELECT 1 FROM tow_truck_areas a WHERE a.tow_truck_id = t.id AND a.province_id = $2)",
            "",
        ),
        Scope::All => ("", "ORDER BY t.updated_at DESC NULLS LAST, t.id"),
        Scope::Random(_) => ("", "ORDER BY random() LIMIT $2"),
    }
}

/// Filter and ordering clauses of a company query
fn company_clauses(scope: Scope) -> (&'static str, &'static str) {
    match scope {
        Scope::District(_) => ("AND district_id = $2", ""),
        Scope::Province(_) => ("AND province_id = $2", ""),
        Scope::All => ("", "ORDER BY updated_at DESC NULLS LAST, id"),
        Scope::Random(_) => ("", "ORDER BY random() LIMIT $2"),
    }
}

/// Bind the scope parameter, if the scope has one, as `$2`
fn bind_scope<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    scope: Scope,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    match scope {
        Scope::District(id) | Scope::Province(id) => query.bind(id),
        Scope::Random(n) => query.bind(i64::try_from(n).unwrap_or(i64::MAX)),
        Scope::All => query,
    }
}

fn company_contact(row: &PgRow) -> Result<CompanyContact, sqlx::Error> {
    Ok(CompanyContact {
        name: row.try_get("company_name")?,
        phone: row.try_get("phone_number")?,
        email: row.try_get("email")?,
        address: row.try_get("full_address")?,
        city: row.try_get("city")?,
        district: row.try_get("district")?,
        location: GeoPoint::from_columns(row.try_get("latitude")?, row.try_get("longitude")?),
    })
}

fn tow_truck_from_row(row: &PgRow) -> Result<TowTruck, sqlx::Error> {
    Ok(TowTruck {
        id: row.try_get("id")?,
        company_id: row.try_get("company_id")?,
        license_plate: row.try_get("license_plate")?,
        driver_name: row.try_get("driver_name")?,
        driver_photo_url: row.try_get("driver_photo_url")?,
        operating_areas: Vec::new(),
        is_active: row.try_get("is_active")?,
        company: company_contact(row)?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn company_from_row(row: &PgRow) -> Result<Company, sqlx::Error> {
    let company = Company {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        province_id: row.try_get("province_id")?,
        district_id: row.try_get("district_id")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        service_city: row.try_get("service_city")?,
        service_district: row.try_get("service_district")?,
        is_active: row.try_get("is_active")?,
        contact: company_contact(row)?,
        areas: Vec::new(),
    };

    Ok(company.with_home_area())
}
