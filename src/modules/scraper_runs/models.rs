use leadbase_db::RecordId;
use serde::{Deserialize, Serialize};

/// Outcome of a scraper run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Partial,
    Failed,
}

/// A row of the `scraper_runs` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperRun {
    pub id: RecordId,
    #[serde(default)]
    pub leads_found: i64,
    #[serde(default)]
    pub leads_enriched: i64,
    /// Leads pushed to the downstream CRM
    #[serde(default)]
    pub leads_sent_to_ghl: i64,
    /// Kept as text; the column is not constrained to [`RunStatus`] values.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Request model for recording a scraper run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewScraperRun {
    pub leads_found: i64,
    pub leads_enriched: i64,
    pub leads_sent_to_ghl: i64,
    pub status: RunStatus,
    pub errors: Vec<String>,
}
