//! Blocking client for the NowCerts agency-management REST API.
//!
//! # Overview
//! `NowCerts` exchanges a username and password for a short-lived bearer
//! token, keeps it cached, and dispatches JSON or multipart requests through
//! a pluggable `Transport`. Resource wrappers such as `InsuredApi` shape
//! typed options into OData paths and decode typed records.
//!
//! # Design
//! - `fire` is the single dispatch path: URL, token, headers, body, decode.
//! - The token is refreshed under a lock, so concurrent callers wait for one
//!   refresh instead of racing.
//! - Remote error statuses come back as data; `Error` only covers invalid
//!   URLs, transport failures, failed authentication and undecodable bodies.
//!
//! ```rust,no_run
//! use nowcerts_client::{GetInsuredsOptions, NowCerts, NowCertsOptions};
//!
//! # fn main() -> nowcerts_client::Result<()> {
//! let client = NowCerts::new("user", "pass", NowCertsOptions::default());
//! let options = GetInsuredsOptions::default().select(["id", "commercialName"]).filter("state", "CA");
//! for insured in client.insureds().get(&options)? {
//!     println!("{:?}", insured.commercial_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod insured;
pub mod json;
pub mod query;
pub mod token;
pub mod types;

pub use client::{FireOptions, Fired, NowCerts};
pub use config::{KeyInflection, NowCertsOptions, USER_AGENT};
pub use error::{Error, Result};
pub use http::{Form, HttpMethod, HttpRequest, HttpResponse, Part, RequestBody, Transport, UreqTransport};
pub use insured::{build_list_path, GetInsuredsOptions, InsuredApi};
pub use json::{is_empty, remove_empty};
pub use query::{Query, QueryValue};
pub use token::{is_token_expired, TokenResponse};
pub use types::{AgentInfo, DateAndLineOfBusinessInfo, InsuredInfo, InsuredType, ProspectType};
