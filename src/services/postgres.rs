use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use crate::models::{CandidateBatch, CandidateQuery, Coordinates, Cursor, FeatureCode, Property, QualityGrade};
use crate::services::source::{CandidateSource, SourceError};

/// Shared projection: the parcel, its first active residential building and
/// its active extra-feature codes
const PROPERTY_SELECT: &str = r#"
    SELECT
        p.id::int8 AS id,
        p.account_number,
        NULLIF(TRIM(CONCAT_WS(' ', p.street_number, p.street_name)), '') AS address,
        p.latitude::float8 AS latitude,
        p.longitude::float8 AS longitude,
        p.land_area::float8 AS lot_area,
        b.heat_area::float8 AS heated_area,
        b.year_built,
        b.quality_code,
        b.bedrooms,
        b.bathrooms::float8 AS bathrooms,
        COALESCE(f.codes, ARRAY[]::text[]) AS feature_codes
    FROM data_propertyrecord p
    LEFT JOIN LATERAL (
        SELECT bd.heat_area, bd.year_built, bd.quality_code, bd.bedrooms, bd.bathrooms
        FROM data_buildingdetail bd
        WHERE bd.property_id = p.id AND bd.is_active
        ORDER BY bd.building_number NULLS LAST, bd.id
        LIMIT 1
    ) b ON TRUE
    LEFT JOIN LATERAL (
        SELECT ARRAY_AGG(DISTINCT ef.feature_code::text) AS codes
        FROM data_extrafeature ef
        WHERE ef.property_id = p.id AND ef.is_active
    ) f ON TRUE
"#;

/// PostgreSQL-backed candidate source over the appraisal district tables
///
/// Batches are keyset-paginated on the parcel's primary key, so each pull is
/// an index range scan regardless of how deep into the corpus the search is.
/// A bounding box that wraps the antimeridian becomes two longitude ranges.
/// The schema is owned by the ingestion pipeline; this client only reads.
#[derive(Clone)]
pub struct PgCandidateSource {
    pool: PgPool,
}

impl PgCandidateSource {
    /// Create a new PostgreSQL source from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, SourceError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL source from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
    ) -> Result<Self, SourceError> {
        tracing::info!("Connecting to PostgreSQL (max {} connections)", max_connections.unwrap_or(10));

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
        )
        .await
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, SourceError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl CandidateSource for PgCandidateSource {
    async fn get_target_by_id(&self, account_number: &str) -> Result<Option<Property>, SourceError> {
        let query = format!(
            "{} WHERE p.account_number = $1 ORDER BY p.id LIMIT 1",
            PROPERTY_SELECT
        );

        let row = sqlx::query(&query)
            .bind(account_number)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(property_from_row)
            .transpose()
            .map_err(Into::into)
    }

    async fn query_candidates(
        &self,
        query: &CandidateQuery,
        cursor: Option<Cursor>,
    ) -> Result<CandidateBatch, SourceError> {
        let sql = format!(
            r#"{}
            WHERE p.latitude BETWEEN $1::numeric AND $2::numeric
              AND (
                    ($3::float8 <= $4::float8 AND p.longitude BETWEEN $3::numeric AND $4::numeric)
                 OR ($3::float8 > $4::float8 AND (p.longitude >= $3::numeric OR p.longitude <= $4::numeric))
              )
              AND p.latitude IS NOT NULL
              AND p.longitude IS NOT NULL
              AND NOT (p.account_number = ANY($5))
              AND p.id > $6
              AND ($7::float8 IS NULL OR b.heat_area::float8 BETWEEN $7 AND $8)
            ORDER BY p.id
            LIMIT $9"#,
            PROPERTY_SELECT
        );

        let bbox = &query.bounding_box;
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);

        let rows = sqlx::query(&sql)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .bind(query.exclude_ids.as_slice())
            .bind(cursor.map(|c| c.0).unwrap_or(0))
            .bind(query.size_range.map(|r| r.min))
            .bind(query.size_range.map(|r| r.max))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let last_id: Option<i64> = match rows.last() {
            Some(row) => Some(row.try_get("id")?),
            None => None,
        };

        let candidates = rows
            .iter()
            .map(property_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        // A short page means the keyset range is drained
        let next_cursor = if candidates.len() as i64 == limit {
            last_id.map(Cursor)
        } else {
            None
        };

        tracing::debug!(
            "Fetched {} candidates after cursor {:?}",
            candidates.len(),
            cursor
        );

        Ok(CandidateBatch {
            candidates,
            next_cursor,
        })
    }
}

/// Map a row of [`PROPERTY_SELECT`] onto a [`Property`]
///
/// Zero bedroom and bathroom counts are how the district encodes "unknown",
/// so they become `None`.
fn property_from_row(row: &PgRow) -> Result<Property, sqlx::Error> {
    let latitude: Option<f64> = row.try_get("latitude")?;
    let longitude: Option<f64> = row.try_get("longitude")?;
    let quality_code: Option<String> = row.try_get("quality_code")?;
    let bedrooms: Option<i32> = row.try_get("bedrooms")?;
    let bathrooms: Option<f64> = row.try_get("bathrooms")?;
    let feature_codes: Vec<String> = row.try_get("feature_codes")?;

    Ok(Property {
        account_number: row.try_get("account_number")?,
        address: row.try_get("address")?,
        coordinates: latitude.zip(longitude).map(|(lat, lon)| Coordinates::new(lat, lon)),
        heated_area: row.try_get("heated_area")?,
        lot_area: row.try_get("lot_area")?,
        year_built: row.try_get("year_built")?,
        quality: quality_code.as_deref().and_then(QualityGrade::from_code),
        bedrooms: bedrooms
            .filter(|b| *b > 0)
            .and_then(|b| u32::try_from(b).ok()),
        bathrooms: bathrooms.filter(|b| *b > 0.0),
        features: feature_codes.into_iter().map(FeatureCode::active).collect(),
    })
}
