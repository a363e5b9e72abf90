//! leadbase application library
//!
//! Table models for the leads database and the smoke-test runner that
//! exercises them.

use anyhow::Context;
use leadbase_db::{ClientOptions, Credentials, SupabaseClient};
use leadbase_kernel::Settings;

pub mod modules;
pub mod smoke;

pub use smoke::{SmokeReport, SmokeRunner, Step};

/// Resolve credentials and install the process-wide client handle.
///
/// Fails before any request is sent if a credential is missing or malformed.
pub fn connect(settings: &Settings) -> anyhow::Result<&'static SupabaseClient> {
    let credentials = Credentials::resolve(&settings.supabase)
        .with_context(|| "failed to resolve database credentials")?;

    leadbase_db::init(&credentials, ClientOptions::from(&settings.supabase))
        .with_context(|| "failed to initialize database client")
}
