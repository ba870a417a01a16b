use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const USERNAME: &str = "agent@agency.test";
pub const PASSWORD: &str = "hunter2";
const SECRET: &[u8] = b"mock-nowcerts-signing-key";

#[derive(Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct Claims {
    pub unique_name: String,
    pub exp: u64,
}

/// Shared server state. Tests keep a handle to read the counters.
pub struct Mock {
    pub token_ttl_secs: u64,
    token_requests: AtomicUsize,
    insureds: RwLock<Vec<Value>>,
    queries: RwLock<Vec<String>>,
}

impl Mock {
    pub fn new(token_ttl_secs: u64) -> Arc<Self> {
        Arc::new(Self {
            token_ttl_secs,
            token_requests: AtomicUsize::new(0),
            insureds: RwLock::new(seed()),
            queries: RwLock::new(Vec::new()),
        })
    }

    /// Number of calls made to the token endpoint.
    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    /// Raw query strings received by `InsuredList`, in order.
    pub async fn queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }
}

fn seed() -> Vec<Value> {
    vec![
        json!({
            "id": "123",
            "firstName": "Ann",
            "lastName": "Lee",
            "type": 0,
            "state": "CA",
            "city": "Fresno",
            "active": true,
            "agents": [{"databaseId": "a-1", "firstName": "Sam", "lastName": "Ortiz"}]
        }),
        json!({
            "id": "456",
            "commercialName": "Acme Hauling",
            "type": 1,
            "state": "TX",
            "city": "Austin",
            "active": true,
            "prospectType": 1
        }),
        json!({
            "id": "789",
            "firstName": "Bo",
            "lastName": "Park",
            "type": 0,
            "state": "CA",
            "city": "Oakland",
            "active": false
        }),
    ]
}

pub type Db = Arc<Mock>;

pub fn app() -> Router {
    app_with(Mock::new(3600))
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/api/token", post(issue_token))
        .route("/api/Insured/Insert", post(insert_insured))
        .route("/api/{resource}", get(list_resource))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db)).await
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

async fn issue_token(State(db): State<Db>, Json(input): Json<TokenRequest>) -> (StatusCode, Json<Value>) {
    db.token_requests.fetch_add(1, Ordering::SeqCst);

    if input.grant_type != "password" || input.client_id != "ngAuthApp" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_client", "error_description": "Client is not allowed."})),
        );
    }
    if input.username != USERNAME || input.password != PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "The user name or password is incorrect."
            })),
        );
    }

    let claims = Claims {
        unique_name: input.username,
        exp: now_secs() + db.token_ttl_secs,
    };
    match jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)) {
        Ok(token) => (
            StatusCode::OK,
            Json(json!({
                "access_token": token,
                "token_type": "bearer",
                "expires_in": db.token_ttl_secs
            })),
        ),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "server_error"}))),
    }
}

/// Accepts any bearer token signed by this server, with jsonwebtoken's
/// default leeway on `exp`.
fn authorize(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let denied = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Authorization has been denied for this request."})),
        )
    };
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(denied)?;
    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(SECRET), &Validation::default())
        .map(|_| ())
        .map_err(|_| denied())
}

async fn list_resource(
    State(db): State<Db>,
    Path(resource): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorize(&headers)?;

    let id = resource
        .strip_prefix("InsuredList(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"message": format!("No HTTP resource was found for {resource}")})),
            )
        })?;

    let raw = query.unwrap_or_default();
    db.queries.write().await.push(raw.clone());
    let odata = ODataQuery::parse(&percent_decode(&raw));

    let insureds = db.insureds.read().await;
    let mut matched: Vec<&Value> = insureds
        .iter()
        .filter(|row| id.is_empty() || row["id"] == id)
        .filter(|row| odata.matches(row))
        .collect();
    if let Some(field) = &odata.order_by {
        matched.sort_by_key(|row| row[field].to_string());
    }
    let rows = matched.into_iter().map(|row| odata.project(row)).collect();
    Ok(Json(Value::Array(rows)))
}

async fn insert_insured(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(mut input): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorize(&headers)?;

    let Some(obj) = input.as_object_mut() else {
        return Err((StatusCode::BAD_REQUEST, Json(json!({"message": "expected an object"}))));
    };
    obj.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    db.insureds.write().await.push(input.clone());
    Ok(Json(input))
}

/// The `$select`/`$filter`/`$orderby` segments as the client concatenates
/// them: no `&` between segments, each filter pair ending with `,`.
#[derive(Debug, Default, PartialEq)]
pub struct ODataQuery {
    pub select: Vec<String>,
    pub filters: Vec<(String, String)>,
    pub order_by: Option<String>,
}

impl ODataQuery {
    pub fn parse(raw: &str) -> Self {
        let mut query = Self::default();
        for segment in raw.split('$').filter(|s| !s.is_empty()) {
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };
            match key {
                "select" => {
                    query.select = value
                        .split(',')
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "filter" => {
                    query.filters = value
                        .split(',')
                        .filter_map(|pair| pair.split_once(" eq "))
                        .map(|(f, v)| (f.to_string(), v.to_string()))
                        .collect();
                }
                "orderby" => query.order_by = Some(value.to_string()),
                _ => {}
            }
        }
        query
    }

    fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|(field, expected)| match &row[field] {
            Value::String(s) => s == expected,
            Value::Null => false,
            other => other.to_string() == *expected,
        })
    }

    fn project(&self, row: &Value) -> Value {
        if self.select.is_empty() {
            return row.clone();
        }
        let mut out = Map::new();
        for field in &self.select {
            if let Some(v) = row.get(field) {
                out.insert(field.clone(), v.clone());
            }
        }
        Value::Object(out)
    }
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(b) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_style_query() {
        let q = ODataQuery::parse("$select=a,b$filter=state eq CA,");
        assert_eq!(q.select, vec!["a", "b"]);
        assert_eq!(q.filters, vec![("state".to_string(), "CA".to_string())]);
        assert!(q.order_by.is_none());
    }

    #[test]
    fn parses_multiple_filters_and_order() {
        let q = ODataQuery::parse("$filter=state eq CA,city eq Fresno,$orderby=lastName");
        assert_eq!(q.filters.len(), 2);
        assert_eq!(q.order_by.as_deref(), Some("lastName"));
    }

    #[test]
    fn empty_query_selects_everything() {
        assert_eq!(ODataQuery::parse(""), ODataQuery::default());
    }

    #[test]
    fn decodes_percent_escapes() {
        assert_eq!(percent_decode("state%20eq%20CA,"), "state eq CA,");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("a%2"), "a%2");
    }

    #[test]
    fn filter_and_projection() {
        let q = ODataQuery::parse("$select=id$filter=state eq CA,");
        let rows: Vec<Value> = seed()
            .iter()
            .filter(|r| q.matches(r))
            .map(|r| q.project(r))
            .collect();
        assert_eq!(rows, vec![json!({"id": "123"}), json!({"id": "789"})]);
    }

    #[test]
    fn token_request_requires_all_fields() {
        let result: Result<TokenRequest, _> = serde_json::from_str(r#"{"grant_type":"password"}"#);
        assert!(result.is_err());
    }
}
