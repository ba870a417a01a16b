//! NowCerts resource DTOs.
//!
//! # Design
//! Every scalar is optional because `$select` lets the caller ask for any
//! subset of fields. Nested lists read as empty when absent or `null`.
//! Collections the client does not model (contacts, policies, claims, tags,
//! locations) stay as raw JSON. Dates are kept as the strings the API sends; NowCerts mixes
//! offset and offset-less timestamps.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Personal (0) or commercial (1) insured.
///
/// Codes this client does not know are kept as `Unknown` and written back
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum InsuredType {
    Personal,
    Commercial,
    Unknown(u8),
}

impl From<u8> for InsuredType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Personal,
            1 => Self::Commercial,
            other => Self::Unknown(other),
        }
    }
}

impl From<InsuredType> for u8 {
    fn from(value: InsuredType) -> Self {
        match value {
            InsuredType::Personal => 0,
            InsuredType::Commercial => 1,
            InsuredType::Unknown(code) => code,
        }
    }
}

/// Trucking company prospect classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ProspectType {
    Prospect,
    Client,
    Other,
    Unknown(u8),
}

impl From<u8> for ProspectType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Prospect,
            1 => Self::Client,
            2 => Self::Other,
            other => Self::Unknown(other),
        }
    }
}

impl From<ProspectType> for u8 {
    fn from(value: ProspectType) -> Self {
        match value {
            ProspectType::Prospect => 0,
            ProspectType::Client => 1,
            ProspectType::Other => 2,
            ProspectType::Unknown(code) => code,
        }
    }
}

/// NowCerts sends `null` for collections an insured has none of.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Agent or CSR assigned to an insured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    pub database_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// X-date for a line of business.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateAndLineOfBusinessInfo {
    pub xdate: Option<String>,
    pub line_of_business_name: Option<String>,
}

/// An insured record as returned by `InsuredList`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuredInfo {
    pub id: Option<String>,
    pub commercial_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    #[serde(rename = "type")]
    pub insured_type: Option<InsuredType>,
    pub dba: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    #[serde(rename = "eMail")]
    pub email: Option<String>,
    #[serde(rename = "eMail2")]
    pub email2: Option<String>,
    #[serde(rename = "eMail3")]
    pub email3: Option<String>,
    pub fax: Option<String>,
    pub phone: Option<String>,
    pub cell_phone: Option<String>,
    pub sms_phone: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    pub website: Option<String>,
    pub fein: Option<String>,
    pub customer_id: Option<String>,
    pub insured_id: Option<String>,
    pub referral_source_company_name: Option<String>,
    pub change_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub agents: Vec<AgentInfo>,
    #[serde(default, rename = "csRs", deserialize_with = "null_as_empty")]
    pub csrs: Vec<AgentInfo>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub x_dates_and_lines_of_business: Vec<DateAndLineOfBusinessInfo>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub insured_contacts: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub policies: Vec<Value>,
    pub create_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub agency_location: Vec<Value>,
    pub co_insured_first_name: Option<String>,
    pub co_insured_middle_name: Option<String>,
    pub co_insured_last_name: Option<String>,
    pub co_insured_date_of_birth: Option<String>,
    #[serde(rename = "insuredType")]
    pub insured_kind: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub applied_tags: Vec<Value>,
    pub prospect_type: Option<ProspectType>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub claims: Vec<Value>,
    pub acquisition_date: Option<String>,
}
