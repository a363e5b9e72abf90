//! Settings shared by the leadbase binaries and libraries.

pub mod settings;

pub use settings::{Environment, LogFormat, Settings, SupabaseSettings, TelemetrySettings};
