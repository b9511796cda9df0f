//! Authentication seam for the admin client.
//!
//! The client attaches whatever `Authorization` value the configured provider
//! yields; it implements no signature algorithm itself. Deployments fronted
//! by an authenticating proxy use [`AuthProvider::Basic`] or
//! [`AuthProvider::Bearer`]; direct gateway access supplies an external
//! signature implementation through [`RequestSigner`].

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use reqwest::Method;
use url::Url;

/// Produces `Authorization` header values for outgoing requests.
///
/// Implementations receive the request method, the fully assembled URL, and
/// the `Date` header value the client is about to send, which is everything a
/// conventional S3-style signer consumes.
pub trait RequestSigner: Send + Sync {
    fn authorization(&self, method: &Method, url: &Url, date: &str) -> String;
}

/// Authentication configuration for [`super::AdminClient`].
#[derive(Clone, Default)]
pub enum AuthProvider {
    /// No `Authorization` header.
    #[default]
    None,

    /// HTTP Basic Auth (RFC 7617).
    Basic { user: String, password: String },

    /// Bearer token.
    Bearer(String),

    /// Caller-supplied signer.
    Signer(Arc<dyn RequestSigner>),
}

impl AuthProvider {
    pub fn basic(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    pub fn signer(signer: Arc<dyn RequestSigner>) -> Self {
        Self::Signer(signer)
    }

    /// The `Authorization` value for one request, if any.
    pub(crate) fn authorization(&self, method: &Method, url: &Url, date: &str) -> Option<String> {
        match self {
            Self::None => None,
            Self::Basic { user, password } => {
                let credentials = general_purpose::STANDARD.encode(format!("{user}:{password}"));
                Some(format!("Basic {credentials}"))
            }
            Self::Bearer(token) => Some(format!("Bearer {token}")),
            Self::Signer(signer) => Some(signer.authorization(method, url, date)),
        }
    }
}

// Hand-written so secrets never end up in logs.
impl fmt::Debug for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("AuthProvider::None"),
            Self::Basic { user, .. } => write!(f, "AuthProvider::Basic({user}:***)"),
            Self::Bearer(_) => f.write_str("AuthProvider::Bearer(***)"),
            Self::Signer(_) => f.write_str("AuthProvider::Signer(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> (Method, Url, &'static str) {
        (
            Method::GET,
            Url::parse("http://gateway.example.com/admin/user").unwrap(),
            "Thu, 04 May 2023 09:00:00 GMT",
        )
    }

    #[test]
    fn none_yields_no_header() {
        let (method, url, date) = request();
        assert_eq!(AuthProvider::None.authorization(&method, &url, date), None);
    }

    #[test]
    fn basic_encodes_rfc7617() {
        let (method, url, date) = request();
        let header = AuthProvider::basic("ops", "secret")
            .authorization(&method, &url, date)
            .unwrap();
        assert_eq!(header, "Basic b3BzOnNlY3JldA==");
    }

    #[test]
    fn bearer_prefixes_the_token() {
        let (method, url, date) = request();
        let header = AuthProvider::bearer("tok")
            .authorization(&method, &url, date)
            .unwrap();
        assert_eq!(header, "Bearer tok");
    }

    #[test]
    fn signer_receives_the_request_context() {
        struct Recorder;

        impl RequestSigner for Recorder {
            fn authorization(&self, method: &Method, url: &Url, date: &str) -> String {
                format!("TEST {method} {} {date}", url.path())
            }
        }

        let (method, url, date) = request();
        let header = AuthProvider::signer(Arc::new(Recorder))
            .authorization(&method, &url, date)
            .unwrap();
        assert_eq!(header, "TEST GET /admin/user Thu, 04 May 2023 09:00:00 GMT");
    }

    #[test]
    fn debug_redacts_secrets() {
        let rendered = format!("{:?}", AuthProvider::basic("ops", "secret"));
        assert!(!rendered.contains("secret"));
    }
}
