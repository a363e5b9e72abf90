//! Supabase client factory: credential loading, the process-wide client
//! handle, and table queries over the REST surface.

use once_cell::sync::OnceCell;

pub mod client;
pub mod credentials;
pub mod error;
pub mod query;
pub mod record;

pub use client::{ClientOptions, SupabaseClient};
pub use credentials::Credentials;
pub use error::{DbError, DbResult};
pub use query::{FilterBuilder, QueryResponse, TableQuery};
pub use record::RecordId;

static CLIENT: OnceCell<SupabaseClient> = OnceCell::new();

/// Install the process-wide client handle, building it on first call.
///
/// Later calls return the handle built by the first successful call and
/// ignore their arguments.
pub fn init(credentials: &Credentials, options: ClientOptions) -> DbResult<&'static SupabaseClient> {
    CLIENT.get_or_try_init(|| {
        tracing::info!(target: "leadbase-db", url = %credentials.url(), "initializing client handle");
        SupabaseClient::new(credentials, options)
    })
}

/// The installed client handle, if [`init`] has succeeded.
pub fn client() -> Option<&'static SupabaseClient> {
    CLIENT.get()
}
