pub mod models;

use leadbase_db::{DbResult, SupabaseClient};

pub use models::{NewScraperRun, RunStatus, ScraperRun};

pub const TABLE: &str = "scraper_runs";

/// Record a scraper run and return the stored row.
pub async fn create(client: &SupabaseClient, run: &NewScraperRun) -> DbResult<ScraperRun> {
    client.table(TABLE).insert(run).execute().await?.first()
}
