pub mod call_logs;
pub mod leads;
pub mod scraper_runs;

/// Tables the smoke test touches, in the order it first writes to them.
pub const TABLES: &[&str] = &[leads::TABLE, call_logs::TABLE, scraper_runs::TABLE];
