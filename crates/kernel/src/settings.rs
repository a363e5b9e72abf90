use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "LEADBASE_ENV";
const CONFIG_DIR_ENV: &str = "LEADBASE_CONFIG_DIR";
const ENV_PREFIX: &str = "LEADBASE";

/// Deployment environment the tooling is pointed at.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Default to repo root `config` directory.
                std::env::current_dir()
                    .map(|cwd| cwd.join("config"))
                    .unwrap_or_else(|_| PathBuf::from("config"))
            });

        Self::load_from(&config_dir, &environment)
    }

    /// Load configuration from an explicit directory and environment name.
    pub fn load_from(config_dir: &Path, environment: &str) -> anyhow::Result<Self> {
        Self::build(config_dir, environment, None)
    }

    /// Like [`Settings::load_from`], but `LEADBASE_*` overrides are read from
    /// `env_vars` instead of the process environment.
    pub fn load_with_env(
        config_dir: &Path,
        environment: &str,
        env_vars: HashMap<String, String>,
    ) -> anyhow::Result<Self> {
        Self::build(config_dir, environment, Some(env_vars))
    }

    fn build(
        config_dir: &Path,
        environment: &str,
        env_vars: Option<HashMap<String, String>>,
    ) -> anyhow::Result<Self> {
        let parsed_environment = Environment::parse(environment)?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env_vars.map(|vars| vars.into_iter().collect())),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        // The selected environment always wins over any file value.
        settings.environment = parsed_environment;

        Ok(settings)
    }
}

/// Connection settings for the hosted database.
///
/// `url` and `service_key` are fallbacks only: `SUPABASE_URL` and
/// `SUPABASE_SERVICE_KEY` take precedence when set.
#[derive(Clone, Deserialize)]
pub struct SupabaseSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub service_key: Option<String>,
    #[serde(default = "SupabaseSettings::default_schema")]
    pub schema: String,
    #[serde(default = "SupabaseSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl SupabaseSettings {
    fn default_schema() -> String {
        "public".to_string()
    }

    fn default_request_timeout_ms() -> u64 {
        30000
    }
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            service_key: None,
            schema: Self::default_schema(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

impl std::fmt::Debug for SupabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseSettings")
            .field("url", &self.url)
            .field("service_key", &self.service_key.as_ref().map(|_| "<redacted>"))
            .field("schema", &self.schema)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "leadbase-settings-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn load_isolated(dir: &Path, environment: &str) -> anyhow::Result<Settings> {
        Settings::load_with_env(dir, environment, HashMap::new())
    }

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_supabase_section_has_no_credentials() {
        let settings = Settings::default();
        assert!(settings.supabase.url.is_none());
        assert!(settings.supabase.service_key.is_none());
        assert_eq!(settings.supabase.schema, "public");
        assert_eq!(settings.supabase.request_timeout_ms, 30000);
    }

    #[test]
    fn missing_config_dir_yields_defaults() {
        let settings =
            load_isolated(Path::new("/nonexistent/leadbase/config"), "staging").unwrap();
        assert_eq!(settings.environment, Environment::Staging);
        assert_eq!(settings.telemetry.log_format, LogFormat::Pretty);
        assert_eq!(settings.telemetry.filter, "info");
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = load_isolated(Path::new("/nonexistent"), "qa").unwrap_err();
        assert!(err.to_string().contains("unsupported environment 'qa'"));
    }

    #[test]
    fn environment_file_overrides_base_file() {
        let dir = scratch_dir("layering");
        std::fs::write(
            dir.join("base.toml"),
            "[supabase]\nurl = \"https://base.supabase.co\"\nschema = \"leads\"\n\n[telemetry]\nlog_format = \"json\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("production.toml"),
            "[supabase]\nurl = \"https://prod.supabase.co\"\nrequest_timeout_ms = 5000\n",
        )
        .unwrap();

        let settings = load_isolated(&dir, "production").unwrap();
        assert_eq!(settings.environment, Environment::Production);
        assert_eq!(
            settings.supabase.url.as_deref(),
            Some("https://prod.supabase.co")
        );
        assert_eq!(settings.supabase.schema, "leads");
        assert_eq!(settings.supabase.request_timeout_ms, 5000);
        assert_eq!(settings.telemetry.log_format, LogFormat::Json);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn prefixed_env_vars_override_both_files() {
        let dir = scratch_dir("env-overrides");
        std::fs::write(
            dir.join("base.toml"),
            "[supabase]\nschema = \"leads\"\nrequest_timeout_ms = 10000\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("staging.toml"),
            "[supabase]\nschema = \"staging\"\nrequest_timeout_ms = 5000\n",
        )
        .unwrap();

        let env_vars = HashMap::from([
            ("LEADBASE_SUPABASE__SCHEMA".to_string(), "crm".to_string()),
            (
                "LEADBASE_SUPABASE__REQUEST_TIMEOUT_MS".to_string(),
                "1234".to_string(),
            ),
            ("SUPABASE_URL".to_string(), "https://ignored.supabase.co".to_string()),
        ]);
        let settings = Settings::load_with_env(&dir, "staging", env_vars).unwrap();
        assert_eq!(settings.supabase.schema, "crm");
        assert_eq!(settings.supabase.request_timeout_ms, 1234);
        // Unprefixed variables are not a settings source.
        assert!(settings.supabase.url.is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn debug_output_redacts_service_key() {
        let supabase = SupabaseSettings {
            service_key: Some("super-secret".to_string()),
            ..SupabaseSettings::default()
        };
        let rendered = format!("{:?}", supabase);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
