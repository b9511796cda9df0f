//! Query-string assembly for the admin endpoints.
//!
//! The key subresource uses bare flags (`user?key&uid=…`), which pair-only
//! serializers cannot express, so queries are assembled here and attached to
//! the URL verbatim.

use url::form_urlencoded;

/// An ordered set of bare flags and encoded key/value pairs.
#[derive(Debug, Default)]
pub(crate) struct Query {
    flags: Vec<&'static str>,
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bare flag (`key` in `user?key&uid=…`).
    pub fn flag(mut self, name: &'static str) -> Self {
        self.flags.push(name);
        self
    }

    pub fn pair(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.pairs.push((name, value.into()));
        self
    }

    /// Appends the pair only when a value is present.
    pub fn pair_opt(self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.pair(name, value),
            None => self,
        }
    }

    /// Appends a boolean in the lowercase form the gateway parses.
    pub fn pair_bool(self, name: &'static str, value: bool) -> Self {
        self.pair(name, if value { "true" } else { "false" })
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.pairs.is_empty()
    }

    /// Encodes flags first, then percent-encoded pairs.
    pub fn encode(&self) -> String {
        let mut parts: Vec<String> = self.flags.iter().map(|flag| (*flag).to_owned()).collect();

        if !self.pairs.is_empty() {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for (name, value) in &self.pairs {
                serializer.append_pair(name, value);
            }
            parts.push(serializer.finish());
        }

        parts.join("&")
    }
}
