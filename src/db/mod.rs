pub mod queries;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::query::{NewWeatherQuery, QueryPatch, WeatherQuery};

pub use queries::PgQueryStore;

pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Run the migrations embedded in ./migrations/
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Persistence for saved weather queries.
#[async_trait]
pub trait QueryStore: Send + Sync {
    async fn ping(&self) -> anyhow::Result<()>;

    async fn insert(&self, query: NewWeatherQuery) -> anyhow::Result<WeatherQuery>;

    /// Newest first, at most `limit` entries.
    async fn latest(&self, limit: i64) -> anyhow::Result<Vec<WeatherQuery>>;

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<WeatherQuery>>;

    /// Returns `None` when no query has this id.
    async fn update(&self, id: Uuid, patch: QueryPatch) -> anyhow::Result<Option<WeatherQuery>>;

    /// Returns whether a query was removed.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
