//! Insured resource: listing through the OData `InsuredList` endpoint and
//! inserting new records.

use serde_json::Value;

use crate::client::{FireOptions, NowCerts};
use crate::error::{Error, Result};
use crate::http::{HttpMethod, RequestBody};
use crate::json::remove_empty;
use crate::types::InsuredInfo;

const INSERT_PATH: &str = "Insured/Insert";

/// Options for `InsuredApi::get`.
///
/// Each filter is a `[field, value]` pair rendered as `field eq value`.
/// Only equality filters are modeled; `and`/`or` combinations and other
/// operators cannot be expressed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetInsuredsOptions {
    pub id: Option<String>,
    pub properties: Vec<String>,
    pub filters: Vec<Vec<String>>,
    pub order_by: Option<String>,
}

impl GetInsuredsOptions {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn select<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(vec![field.into(), value.into()]);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }
}

/// Insured endpoints of a `NowCerts` client.
#[derive(Debug, Clone, Copy)]
pub struct InsuredApi<'a> {
    client: &'a NowCerts,
}

impl<'a> InsuredApi<'a> {
    pub fn new(client: &'a NowCerts) -> Self {
        Self { client }
    }

    /// Lists insureds, optionally scoped to one id, with `$select`,
    /// `$filter` and `$orderby` applied.
    pub fn get(&self, options: &GetInsuredsOptions) -> Result<Vec<InsuredInfo>> {
        let path = build_list_path(options);
        let fired = self.client.fire_json(&path, FireOptions::default())?;
        let items = list_items(fired.payload);
        let insureds =
            serde_json::from_value::<Vec<InsuredInfo>>(items).map_err(|source| Error::decode(fired.response, source))?;
        log::debug!(target: "insured", "listed {} insured(s)", insureds.len());
        Ok(insureds)
    }

    /// Creates an insured. Empty fields are stripped before sending.
    pub fn insert(&self, insured: &InsuredInfo) -> Result<InsuredInfo> {
        let body = remove_empty(serde_json::to_value(insured)?);
        let options = FireOptions::new(HttpMethod::Post).body(RequestBody::Json(body));
        let fired = self.client.fire::<InsuredInfo>(INSERT_PATH, options)?;
        Ok(fired.payload)
    }
}

impl NowCerts {
    pub fn insureds(&self) -> InsuredApi<'_> {
        InsuredApi::new(self)
    }
}

/// `InsuredList` answers either with a bare array or an OData envelope whose
/// `value` holds the array. Anything else is handed on as is, so decoding
/// reports what was actually received.
fn list_items(payload: Value) -> Value {
    match payload {
        Value::Object(mut envelope) if envelope.get("value").is_some_and(Value::is_array) => {
            envelope.remove("value").unwrap_or_default()
        }
        other => other,
    }
}

/// Builds the relative `InsuredList` path.
///
/// Segments are concatenated directly, without `&` between them, and every
/// filter pair ends with a `,`.
pub fn build_list_path(options: &GetInsuredsOptions) -> String {
    let mut path = format!("InsuredList({})?", options.id.as_deref().unwrap_or(""));

    if !options.properties.is_empty() {
        path.push_str("$select=");
        path.push_str(&options.properties.join(","));
    }

    if !options.filters.is_empty() {
        path.push_str("$filter=");
        for pair in &options.filters {
            path.push_str(&pair.join(" eq "));
            path.push(',');
        }
    }

    if let Some(field) = options.order_by.as_deref().filter(|f| !f.is_empty()) {
        path.push_str("$orderby=");
        path.push_str(field);
    }

    path
}
