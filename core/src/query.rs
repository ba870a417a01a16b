//! URL assembly for dispatched requests.
//!
//! A parameter is appended when its value is present. Falsy values such as
//! `false`, `0` and `""` are sent; only `None` is skipped.

use std::fmt;

use url::Url;

use crate::error::Result;

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<String>),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Ordered query parameters. Insertion order is the order on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    params: Vec<(String, Option<QueryValue>)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter that is always sent.
    pub fn param(self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.maybe(key, Some(value))
    }

    /// Adds a parameter that is sent only when `value` is `Some`.
    pub fn maybe<V: Into<QueryValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.params.push((key.into(), value.map(Into::into)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameters that will be sent, in order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.params
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }
}

/// Joins `base` and `path` with a single `/` and appends the present
/// parameters of `query`.
///
/// `path` may already carry a query, as the OData paths do; it is parsed as
/// written, so `$`, `(`, `)` and `,` stay literal and only characters a URL
/// cannot hold are escaped. Parameters are form-encoded after it.
pub fn build_url(base: &str, path: &str, query: &Query) -> Result<String> {
    let mut url = Url::parse(&format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))?;

    let mut params = query.present().peekable();
    if params.peek().is_some() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, &value.to_string());
        }
    }
    Ok(url.into())
}
