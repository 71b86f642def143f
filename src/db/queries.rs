use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::QueryStore;
use crate::models::query::{NewWeatherQuery, QueryPatch, WeatherQuery, WeatherQueryRow};

const QUERY_COLS: &str = "id, location_input, normalized_name, lat, lon, date_from, date_to, snapshots, created_at";

#[derive(Clone)]
pub struct PgQueryStore {
    pool: PgPool,
}

impl PgQueryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryStore for PgQueryStore {
    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, query: NewWeatherQuery) -> anyhow::Result<WeatherQuery> {
        let row = sqlx::query_as::<_, WeatherQueryRow>(&format!(
            "INSERT INTO weather_queries
             (id, location_input, normalized_name, lat, lon, date_from, date_to, snapshots)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {QUERY_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&query.location_input)
        .bind(&query.normalized_location.name)
        .bind(query.normalized_location.lat)
        .bind(query.normalized_location.lon)
        .bind(query.date_from)
        .bind(query.date_to)
        .bind(Json(&query.snapshots))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn latest(&self, limit: i64) -> anyhow::Result<Vec<WeatherQuery>> {
        let rows = sqlx::query_as::<_, WeatherQueryRow>(&format!(
            "SELECT {QUERY_COLS} FROM weather_queries
             ORDER BY created_at DESC
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(WeatherQuery::from).collect())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<WeatherQuery>> {
        let row = sqlx::query_as::<_, WeatherQueryRow>(&format!(
            "SELECT {QUERY_COLS} FROM weather_queries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(WeatherQuery::from))
    }

    async fn update(&self, id: Uuid, patch: QueryPatch) -> anyhow::Result<Option<WeatherQuery>> {
        let location = patch.normalized_location.as_ref();
        let row = sqlx::query_as::<_, WeatherQueryRow>(&format!(
            "UPDATE weather_queries
             SET location_input  = COALESCE($1, location_input),
                 normalized_name = COALESCE($2, normalized_name),
                 lat             = COALESCE($3, lat),
                 lon             = COALESCE($4, lon),
                 date_from       = COALESCE($5, date_from),
                 date_to         = COALESCE($6, date_to),
                 snapshots       = COALESCE($7, snapshots)
             WHERE id = $8
             RETURNING {QUERY_COLS}"
        ))
        .bind(&patch.location_input)
        .bind(location.map(|l| l.name.as_str()))
        .bind(location.map(|l| l.lat))
        .bind(location.map(|l| l.lon))
        .bind(patch.date_from)
        .bind(patch.date_to)
        .bind(patch.snapshots.as_ref().map(Json))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(WeatherQuery::from))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM weather_queries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
