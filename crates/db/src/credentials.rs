//! Credential resolution for the hosted database.

use leadbase_kernel::SupabaseSettings;
use url::Url;

use crate::error::{DbError, DbResult};

pub const URL_VAR: &str = "SUPABASE_URL";
pub const SERVICE_KEY_VAR: &str = "SUPABASE_SERVICE_KEY";

/// Validated service URL and access key.
#[derive(Clone)]
pub struct Credentials {
    url: Url,
    /// The URL exactly as supplied, minus surrounding whitespace.
    configured_url: String,
    service_key: String,
}

impl Credentials {
    /// Resolve from the process environment, falling back to settings values.
    pub fn resolve(settings: &SupabaseSettings) -> DbResult<Self> {
        Self::resolve_with(settings, |name| std::env::var(name).ok())
    }

    /// Resolve from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> DbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve_with(&SupabaseSettings::default(), lookup)
    }

    /// Resolve using `lookup` first and `settings` as the fallback layer.
    pub fn resolve_with<F>(settings: &SupabaseSettings, lookup: F) -> DbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = non_blank(lookup(URL_VAR)).or_else(|| non_blank(settings.url.clone()));
        let service_key =
            non_blank(lookup(SERVICE_KEY_VAR)).or_else(|| non_blank(settings.service_key.clone()));

        let (url, service_key) = match (url, service_key) {
            (Some(url), Some(key)) => (url, key),
            (url, key) => {
                let mut missing = Vec::new();
                if url.is_none() {
                    missing.push(URL_VAR);
                }
                if key.is_none() {
                    missing.push(SERVICE_KEY_VAR);
                }
                return Err(DbError::missing_credentials(missing));
            }
        };

        Self::new(&url, service_key)
    }

    /// Build credentials from explicit values.
    pub fn new(url: &str, service_key: impl Into<String>) -> DbResult<Self> {
        let service_key = service_key.into();
        if service_key.trim().is_empty() {
            return Err(DbError::missing_credentials(vec![SERVICE_KEY_VAR]));
        }

        let configured_url = url.trim();
        let parsed =
            Url::parse(configured_url).map_err(|e| DbError::invalid_url(url, e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(DbError::invalid_url(
                    url,
                    format!("unsupported scheme '{}'", other),
                ))
            }
        }
        if parsed.host_str().is_none() {
            return Err(DbError::invalid_url(url, "missing host"));
        }

        Ok(Self {
            url: parsed,
            configured_url: configured_url.to_string(),
            service_key: service_key.trim().to_string(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The URL as it was configured, without the normalization `url()` applies.
    pub fn configured_url(&self) -> &str {
        &self.configured_url
    }

    pub fn service_key(&self) -> &str {
        &self.service_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url.as_str())
            .field("service_key", &"<redacted>")
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn missing_names(err: DbError) -> Vec<&'static str> {
        match err {
            DbError::MissingCredentials { names } => names,
            other => panic!("Expected MissingCredentials, got {other:?}"),
        }
    }

    #[test]
    fn both_variables_present() {
        let creds = Credentials::from_lookup(lookup_from(&[
            (URL_VAR, "https://abc.supabase.co"),
            (SERVICE_KEY_VAR, "service-key"),
        ]))
        .unwrap();
        assert_eq!(creds.url().as_str(), "https://abc.supabase.co/");
        assert_eq!(creds.service_key(), "service-key");
    }

    #[test]
    fn every_missing_combination_fails() {
        let cases: Vec<(Vec<(&str, &str)>, Vec<&str>)> = vec![
            (vec![], vec![URL_VAR, SERVICE_KEY_VAR]),
            (vec![(URL_VAR, "https://abc.supabase.co")], vec![SERVICE_KEY_VAR]),
            (vec![(SERVICE_KEY_VAR, "key")], vec![URL_VAR]),
            (
                vec![(URL_VAR, ""), (SERVICE_KEY_VAR, "key")],
                vec![URL_VAR],
            ),
            (
                vec![(URL_VAR, "https://abc.supabase.co"), (SERVICE_KEY_VAR, "   ")],
                vec![SERVICE_KEY_VAR],
            ),
        ];

        for (vars, expected) in cases {
            let err = Credentials::from_lookup(lookup_from(&vars)).unwrap_err();
            assert_eq!(missing_names(err), expected, "vars: {vars:?}");
        }
    }

    #[test]
    fn environment_wins_over_settings() {
        let settings = SupabaseSettings {
            url: Some("https://from-file.supabase.co".to_string()),
            service_key: Some("file-key".to_string()),
            ..SupabaseSettings::default()
        };
        let creds = Credentials::resolve_with(
            &settings,
            lookup_from(&[(URL_VAR, "https://from-env.supabase.co")]),
        )
        .unwrap();
        assert_eq!(creds.url().host_str(), Some("from-env.supabase.co"));
        assert_eq!(creds.service_key(), "file-key");
    }

    #[test]
    fn malformed_url_is_rejected() {
        let err = Credentials::new("not a url", "key").unwrap_err();
        assert!(matches!(err, DbError::InvalidUrl { .. }));

        let err = Credentials::new("ftp://abc.supabase.co", "key").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn configured_url_keeps_the_given_form() {
        let creds = Credentials::new("  https://abc.supabase.co  ", "key").unwrap();
        assert_eq!(creds.configured_url(), "https://abc.supabase.co");
        assert_eq!(creds.url().as_str(), "https://abc.supabase.co/");
    }

    #[test]
    fn debug_hides_service_key() {
        let creds = Credentials::new("https://abc.supabase.co", "very-secret").unwrap();
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("very-secret"));
    }
}
