//! REST client handle for the hosted database.

use std::time::Duration;

use leadbase_kernel::SupabaseSettings;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use tracing::info;
use url::Url;

use crate::credentials::Credentials;
use crate::error::{DbError, DbResult};
use crate::query::TableQuery;

const REST_PATH: &str = "rest/v1/";

/// Tunables applied when the handle is built.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub schema: String,
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::from(&SupabaseSettings::default())
    }
}

impl From<&SupabaseSettings> for ClientOptions {
    fn from(settings: &SupabaseSettings) -> Self {
        Self {
            schema: settings.schema.clone(),
            request_timeout: Duration::from_millis(settings.request_timeout_ms),
        }
    }
}

/// Long-lived handle used for every table operation.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    project_url: Url,
    configured_url: String,
    rest_url: Url,
    options: ClientOptions,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("project_url", &self.project_url.as_str())
            .field("schema", &self.options.schema)
            .field("request_timeout", &self.options.request_timeout)
            .finish()
    }
}

impl SupabaseClient {
    /// Build the handle. No request is sent.
    pub fn new(credentials: &Credentials, options: ClientOptions) -> DbResult<Self> {
        let project_url = credentials.url().clone();
        let rest_url = rest_base(&project_url)?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            HeaderName::from_static("apikey"),
            header_value("apikey", credentials.service_key(), true)?,
        );
        default_headers.insert(
            AUTHORIZATION,
            header_value(
                "authorization",
                &format!("Bearer {}", credentials.service_key()),
                true,
            )?,
        );
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(
            HeaderName::from_static("accept-profile"),
            header_value("accept-profile", &options.schema, false)?,
        );
        default_headers.insert(
            HeaderName::from_static("content-profile"),
            header_value("content-profile", &options.schema, false)?,
        );

        let http = Client::builder()
            .timeout(options.request_timeout)
            .user_agent(format!("leadbase/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers)
            .build()?;

        info!(
            url = %project_url,
            schema = %options.schema,
            timeout_ms = u64::try_from(options.request_timeout.as_millis()).unwrap_or(u64::MAX),
            "created database client"
        );

        Ok(Self {
            http,
            project_url,
            configured_url: credentials.configured_url().to_string(),
            rest_url,
            options,
        })
    }

    /// Start a query against `table`.
    pub fn table(&self, table: impl Into<String>) -> TableQuery<'_> {
        TableQuery::new(self, table.into())
    }

    pub fn project_url(&self) -> &Url {
        &self.project_url
    }

    /// The project URL in the form it was configured.
    pub fn configured_url(&self) -> &str {
        &self.configured_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn table_url(&self, table: &str) -> DbResult<Url> {
        self.rest_url
            .join(table)
            .map_err(|e| DbError::invalid_url(format!("{}{}", self.rest_url, table), e.to_string()))
    }
}

fn rest_base(project_url: &Url) -> DbResult<Url> {
    let mut base = project_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(REST_PATH)
        .map_err(|e| DbError::invalid_url(project_url.as_str(), e.to_string()))
}

fn header_value(header: &'static str, value: &str, sensitive: bool) -> DbResult<HeaderValue> {
    let mut value = HeaderValue::from_str(value).map_err(|_| DbError::InvalidHeader { header })?;
    value.set_sensitive(sensitive);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(url: &str) -> Credentials {
        Credentials::new(url, "service-key").unwrap()
    }

    #[test]
    fn table_url_is_under_rest_prefix() {
        let client =
            SupabaseClient::new(&credentials("https://abc.supabase.co"), ClientOptions::default())
                .unwrap();
        assert_eq!(
            client.table_url("leads").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/leads"
        );
    }

    #[test]
    fn project_path_is_preserved() {
        let client = SupabaseClient::new(
            &credentials("http://127.0.0.1:54321/proxy"),
            ClientOptions::default(),
        )
        .unwrap();
        assert_eq!(
            client.table_url("call_logs").unwrap().as_str(),
            "http://127.0.0.1:54321/proxy/rest/v1/call_logs"
        );
    }

    #[test]
    fn options_follow_settings() {
        let settings = SupabaseSettings {
            schema: "crm".to_string(),
            request_timeout_ms: 1500,
            ..SupabaseSettings::default()
        };
        let options = ClientOptions::from(&settings);
        assert_eq!(options.schema, "crm");
        assert_eq!(options.request_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn configured_url_has_no_added_slash() {
        let client =
            SupabaseClient::new(&credentials("http://127.0.0.1:9"), ClientOptions::default())
                .unwrap();
        assert_eq!(client.configured_url(), "http://127.0.0.1:9");
        assert_eq!(client.project_url().as_str(), "http://127.0.0.1:9/");
    }

    #[test]
    fn only_credential_headers_are_sensitive() {
        assert!(header_value("apikey", "key", true).unwrap().is_sensitive());
        assert!(header_value("authorization", "Bearer key", true)
            .unwrap()
            .is_sensitive());
        assert!(!header_value("accept-profile", "public", false)
            .unwrap()
            .is_sensitive());
    }

    #[test]
    fn key_with_newline_is_rejected() {
        let creds = Credentials::new("https://abc.supabase.co", "bad\nkey").unwrap();
        let err = SupabaseClient::new(&creds, ClientOptions::default()).unwrap_err();
        assert!(matches!(err, DbError::InvalidHeader { header: "apikey" }));
    }
}
