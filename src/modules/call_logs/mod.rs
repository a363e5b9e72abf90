pub mod models;

use leadbase_db::{DbResult, SupabaseClient};

pub use models::{CallLog, NewCallLog};

pub const TABLE: &str = "call_logs";

/// Insert a call log and return the stored row.
pub async fn create(client: &SupabaseClient, log: &NewCallLog) -> DbResult<CallLog> {
    client.table(TABLE).insert(log).execute().await?.first()
}
