//! Request type definitions
//!
//! RequestDescriptor is the structured form of one cell's request text.
//! Descriptors are built exclusively by the parser, so an instance with an
//! invalid URL or an unsupported method cannot exist.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP method set accepted in request cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    /// All methods the parser recognizes.
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Head,
        Method::Options,
    ];

    /// Canonical upper-case token for the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// Look up a method token (case-insensitive).
    pub fn from_token(token: &str) -> Option<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(token))
    }
}

impl Default for Method {
    fn default() -> Self {
        Method::Get
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insertion-ordered header mapping.
///
/// Names compare case-insensitively and a repeated name overwrites the
/// earlier value in place (last write wins), matching how a single header
/// object represents the block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMap(Vec<(String, String)>);

impl HeaderMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing the value of an existing name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .0
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Look up a header value by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// Raw request payload taken verbatim from the cell text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Payload text, unmodified.
    pub text: String,
    /// Content type from an explicit Content-Type header, when present.
    pub content_type: Option<String>,
}

/// Redirect handling requested for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectPolicy {
    /// Follow redirects with the transport's default hop limit.
    Follow,
    /// Follow at most this many redirects.
    Limited(usize),
    /// Do not follow redirects.
    None,
}

/// Auxiliary transport settings. An absent value means "transport default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Per-request timeout.
    #[serde(default, with = "optional_duration_serde")]
    pub timeout: Option<Duration>,
    /// Redirect policy override.
    #[serde(default)]
    pub redirect: Option<RedirectPolicy>,
}

/// Structured request produced from one cell's text, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Absolute URL; scheme is guaranteed to be http or https.
    pub url: String,
    pub headers: HeaderMap,
    #[serde(default)]
    pub body: Option<RequestBody>,
    #[serde(default)]
    pub options: RequestOptions,
}

impl RequestDescriptor {
    /// Override transport options after parsing.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// Serde support for Option<Duration> as milliseconds
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => d.as_millis().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis: Option<u64> = Option::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_token_lookup_is_case_insensitive() {
        assert_eq!(Method::from_token("get"), Some(Method::Get));
        assert_eq!(Method::from_token("Patch"), Some(Method::Patch));
        assert_eq!(Method::from_token("TRACE"), None);
    }

    #[test]
    fn test_header_map_last_write_wins_in_place() {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", "text/plain");
        headers.insert("X-Token", "one");
        headers.insert("accept", "application/json");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("ACCEPT"), Some("application/json"));
        // The overwritten name keeps its original position.
        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Accept", "X-Token"]);
    }

    #[test]
    fn test_header_map_from_iter_deduplicates() {
        let headers: HeaderMap = vec![
            ("A".to_string(), "1".to_string()),
            ("a".to_string(), "2".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("A"), Some("2"));
    }
}
