//! Async client for the gateway's admin REST API.
//!
//! A thin, mechanical wrapper: it assembles URLs and query strings, sends
//! requests through a conventional HTTP client, and feeds decoded response
//! bodies to the [`crate::schema`] engine. Retry, failover, and signature
//! algorithms deliberately live outside this crate; see [`AuthProvider`] for
//! the authentication seam.

mod auth;
mod errors;
mod query;

pub use auth::{AuthProvider, RequestSigner};
pub use errors::{ClientError, ClientResult};

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::models::{bucket_list, key_entry_list, Bucket, KeyEntry, Usage, User};
use crate::schema::{from_value, from_value_as, list_of, StringKind};

use query::Query;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one gateway admin endpoint.
///
/// Cheap to clone; all clones share the underlying connection pool.
///
/// # Examples
///
/// ```rust,no_run
/// use rgw_admin::client::{AdminClient, AuthProvider};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = AdminClient::builder()
///     .endpoint("http://gateway.example.com/admin/")
///     .auth(AuthProvider::bearer("token"))
///     .build()?;
///
/// let user = client.get_user("ops").await?;
/// println!("{} has {} keys", user.user_id, user.keys.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    endpoint: Url,
    auth: AuthProvider,
}

/// Builder for [`AdminClient`].
#[derive(Debug, Default)]
pub struct AdminClientBuilder {
    endpoint: Option<String>,
    auth: AuthProvider,
    timeout: Option<Duration>,
}

impl AdminClientBuilder {
    /// Base URL of the admin API, e.g. `http://gateway.example.com/admin/`.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn auth(mut self, auth: AuthProvider) -> Self {
        self.auth = auth;
        self
    }

    /// Overall per-request timeout; 30 seconds unless set.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ClientResult<AdminClient> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| ClientError::Config("no endpoint configured".to_owned()))?;
        let mut endpoint = Url::parse(&endpoint)?;

        // Joining relative paths replaces the last segment unless the base
        // path ends with a slash.
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(concat!("rgw-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(AdminClient {
            http,
            endpoint,
            auth: self.auth,
        })
    }
}

impl AdminClient {
    pub fn builder() -> AdminClientBuilder {
        AdminClientBuilder::default()
    }

    fn url_for(&self, path: &str, query: &Query) -> ClientResult<Url> {
        let mut url = self.endpoint.join(path)?;
        if !query.is_empty() {
            url.set_query(Some(&query.encode()));
        }
        Ok(url)
    }

    /// Sends one request and returns the decoded body, or `None` when the
    /// gateway answers with an empty body (deletes, unknown buckets).
    async fn send(&self, method: Method, path: &str, query: Query) -> ClientResult<Option<Value>> {
        let url = self.url_for(path, &query)?;
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();

        tracing::debug!(method = %method, url = %url, "admin request");

        let mut request = self.http.request(method.clone(), url.clone()).header("Date", &date);
        if let Some(authorization) = self.auth.authorization(&method, &url, &date) {
            request = request.header("Authorization", authorization);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if status >= 400 {
            tracing::warn!(status, path, "admin request failed");
            return Err(ClientError::http(status, &body));
        }

        if body.is_empty() {
            return Ok(None);
        }
        let value = serde_json::from_str(&body)
            .map_err(|err| ClientError::UnexpectedBody(err.to_string()))?;
        Ok(Some(value))
    }

    async fn send_expecting_body(
        &self,
        method: Method,
        path: &str,
        query: Query,
    ) -> ClientResult<Value> {
        self.send(method, path, query).await?.ok_or_else(|| {
            ClientError::UnexpectedBody("empty body where a value was required".to_owned())
        })
    }

    /// All user ids known to the gateway.
    pub async fn list_user_ids(&self) -> ClientResult<Vec<String>> {
        let body = self
            .send_expecting_body(Method::GET, "metadata/user", Query::new())
            .await?;
        Ok(from_value_as("UserIds", &list_of(StringKind), &body)?)
    }

    /// The gateway's effective configuration, untyped.
    pub async fn get_config(&self) -> ClientResult<Value> {
        self.send_expecting_body(Method::GET, "config", Query::new())
            .await
    }

    /// The current realm period, untyped.
    pub async fn get_period(&self) -> ClientResult<Value> {
        self.send_expecting_body(Method::GET, "realm/period", Query::new())
            .await
    }

    /// The zonegroup map of the current period, untyped.
    pub async fn get_zone_groups(&self) -> ClientResult<Value> {
        let period = self.get_period().await?;
        zone_groups_from(&period)
    }

    pub async fn get_user(&self, user_id: &str) -> ClientResult<User> {
        let body = self
            .send_expecting_body(Method::GET, "user", Query::new().pair("uid", user_id))
            .await?;
        Ok(from_value(&body)?)
    }

    /// Creates a user.
    ///
    /// `user_caps` entries are `(capability, rights)` pairs, e.g.
    /// `("usage", "read,write")`.
    pub async fn create_user(
        &self,
        user_id: &str,
        display_name: &str,
        user_caps: &[(&str, &str)],
    ) -> ClientResult<User> {
        let mut query = Query::new()
            .pair("uid", user_id)
            .pair("display-name", display_name);
        if !user_caps.is_empty() {
            let caps = user_caps
                .iter()
                .map(|(capability, rights)| format!("{capability}={rights}"))
                .collect::<Vec<_>>()
                .join(";");
            query = query.pair("user-caps", caps);
        }

        let body = self.send_expecting_body(Method::PUT, "user", query).await?;
        Ok(from_value(&body)?)
    }

    pub async fn update_user(
        &self,
        user_id: &str,
        display_name: Option<&str>,
    ) -> ClientResult<User> {
        let query = Query::new()
            .pair("uid", user_id)
            .pair_opt("display-name", display_name);
        let body = self.send_expecting_body(Method::POST, "user", query).await?;
        Ok(from_value(&body)?)
    }

    pub async fn delete_user(&self, user_id: &str, purge_data: bool) -> ClientResult<()> {
        let query = Query::new()
            .pair("uid", user_id)
            .pair_bool("purge-data", purge_data);
        self.send(Method::DELETE, "user", query).await?;
        Ok(())
    }

    /// Stats for one bucket, or `None` when the bucket does not exist (the
    /// gateway answers those lookups with an empty body).
    pub async fn get_bucket_stats(&self, name: &str) -> ClientResult<Option<Bucket>> {
        let query = Query::new().pair_bool("stats", true).pair("bucket", name);
        match self.send(Method::GET, "bucket", query).await? {
            Some(body) if !body.is_null() => Ok(Some(from_value(&body)?)),
            _ => Ok(None),
        }
    }

    /// Names of all buckets, optionally restricted to one owner.
    pub async fn list_bucket_names(&self, user_id: Option<&str>) -> ClientResult<Vec<String>> {
        let query = Query::new().pair_bool("stats", false).pair_opt("uid", user_id);
        let body = self.send_expecting_body(Method::GET, "bucket", query).await?;
        Ok(from_value_as("BucketNames", &list_of(StringKind), &body)?)
    }

    /// Stats for all buckets, optionally restricted to one owner.
    pub async fn list_bucket_stats(&self, user_id: Option<&str>) -> ClientResult<Vec<Bucket>> {
        let query = Query::new().pair_bool("stats", true).pair_opt("uid", user_id);
        let body = self.send_expecting_body(Method::GET, "bucket", query).await?;
        Ok(bucket_list(&body)?)
    }

    pub async fn delete_bucket(&self, name: &str, purge_objects: bool) -> ClientResult<()> {
        let query = Query::new()
            .pair("bucket", name)
            .pair_bool("purge-objects", purge_objects);
        self.send(Method::DELETE, "bucket", query).await?;
        Ok(())
    }

    /// Creates a key pair for a user; the gateway picks the access key unless
    /// one is supplied. Returns the user's full key ring.
    pub async fn create_key(
        &self,
        user_id: &str,
        access_key: Option<&str>,
    ) -> ClientResult<Vec<KeyEntry>> {
        let query = Query::new()
            .flag("key")
            .pair("uid", user_id)
            .pair_opt("access-key", access_key);
        let body = self.send_expecting_body(Method::PUT, "user", query).await?;
        Ok(key_entry_list(&body)?)
    }

    /// Replaces the secret of an existing access key. Returns the user's full
    /// key ring.
    pub async fn generate_new_secret_key(
        &self,
        user_id: &str,
        access_key: &str,
    ) -> ClientResult<Vec<KeyEntry>> {
        let query = Query::new()
            .flag("key")
            .pair("uid", user_id)
            .pair("access-key", access_key);
        let body = self.send_expecting_body(Method::PUT, "user", query).await?;
        Ok(key_entry_list(&body)?)
    }

    pub async fn delete_key(&self, user_id: &str, access_key: &str) -> ClientResult<()> {
        let query = Query::new()
            .flag("key")
            .pair("uid", user_id)
            .pair("access-key", access_key);
        self.send(Method::DELETE, "user", query).await?;
        Ok(())
    }

    /// Usage statistics, optionally restricted to one user and a reporting
    /// window.
    pub async fn get_usage(
        &self,
        user_id: Option<&str>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> ClientResult<Usage> {
        let query = Query::new()
            .pair_opt("uid", user_id)
            .pair_opt("start", start.map(format_window_bound))
            .pair_opt("end", end.map(format_window_bound))
            .pair_bool("show-summary", false);
        let body = self.send_expecting_body(Method::GET, "usage", query).await?;
        Ok(from_value(&body)?)
    }

    /// Drops usage statistics recorded before `until`.
    pub async fn delete_usage(&self, until: NaiveDate) -> ClientResult<()> {
        let query = Query::new()
            .pair("end", until.format("%Y-%m-%d").to_string())
            .pair_bool("remove-all", true);
        self.send(Method::DELETE, "usage", query).await?;
        Ok(())
    }
}

/// The timestamp form the usage endpoint accepts for window bounds.
fn format_window_bound(bound: DateTime<Utc>) -> String {
    bound.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn zone_groups_from(period: &Value) -> ClientResult<Value> {
    period
        .pointer("/period_map/zonegroups")
        .cloned()
        .ok_or_else(|| {
            ClientError::UnexpectedBody("period response lacks period_map.zonegroups".to_owned())
        })
}
