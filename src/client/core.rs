// File: src/client/core.rs
use crate::client::auth::{BearerAuthLayer, BearerAuthService};
use crate::client::middleware::{DefaultHeadersLayer, DefaultHeadersService};
use crate::client::types::{ItemDraft, LoginRequest, MultipartForm, ImageUpload, Registration};
use crate::config::Config;
use crate::model::{DeliveryAgent, DeliveryItem, DeliveryStatus, StatusCounts};
use crate::session::{Session, SharedSession};

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tower::ServiceExt;
use tower_layer::Layer;

type HttpsClient = BearerAuthService<
    DefaultHeadersService<Client<hyper_rustls::HttpsConnector<HttpConnector>, Full<Bytes>>>,
>;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Image links stored by older server builds use plain http.
pub fn ensure_https(url: &str) -> String {
    match url.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("http://") => {
            format!("https://{}", &url[7..])
        }
        _ => url.to_string(),
    }
}

/// Prefers the server's `{"error": "..."}` message, then a plain-text body,
/// then `fallback`.
fn error_message(status: StatusCode, body: &[u8], fallback: &str) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body)
        && let Some(msg) = value.get("error").and_then(|e| e.as_str())
    {
        return msg.to_string();
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() && !text.starts_with('{') && !text.starts_with('<') {
        return text.to_string();
    }
    format!("{} (HTTP {})", fallback, status.as_u16())
}

fn tidy_items(mut items: Vec<DeliveryItem>) -> Vec<DeliveryItem> {
    for item in &mut items {
        item.image_url = item.image_url.as_deref().map(ensure_https);
        item.delivered_image_url = item.delivered_image_url.as_deref().map(ensure_https);
    }
    items
}

fn tls_config() -> rustls::ClientConfig {
    let mut root_store = rustls::RootCertStore::empty();

    #[cfg(not(target_os = "android"))]
    {
        let result = rustls_native_certs::load_native_certs();
        root_store.add_parsable_certificates(result.certs);
    }

    #[cfg(target_os = "android")]
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    if root_store.is_empty() {
        // Plain http endpoints still work; https ones will fail the handshake.
        log::warn!("No valid system certificates found.");
    }
    rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}

enum Payload {
    Empty,
    Json(Vec<u8>),
    Form(String, Bytes),
}

impl Payload {
    fn json<T: Serialize>(value: &T) -> Result<Self, String> {
        serde_json::to_vec(value)
            .map(Payload::Json)
            .map_err(|e| e.to_string())
    }

    fn form(form: MultipartForm) -> Self {
        let (content_type, body) = form.finish();
        Payload::Form(content_type, body)
    }
}

/// Client for the dispatch REST API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    http: HttpsClient,
    session: SharedSession,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, user_agent: &str, session: SharedSession) -> Result<Self, String> {
        let base_url = base_url.trim_end_matches('/').to_string();
        base_url
            .parse::<http::Uri>()
            .map_err(|e| format!("Invalid API url '{}': {}", base_url, e))?;

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config())
            .https_or_http()
            .enable_http1()
            .build();

        let http_client = Client::builder(TokioExecutor::new()).build(https_connector);
        let with_headers = DefaultHeadersLayer::new(user_agent.to_string()).layer(http_client);
        let http = BearerAuthLayer::new(session.clone()).layer(with_headers);

        Ok(Self {
            base_url,
            http,
            session,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn from_config(config: &Config, session: SharedSession) -> Result<Self, String> {
        Ok(Self::new(&config.api_base_url, &config.user_agent, session)?
            .with_timeout(Duration::from_secs(config.request_timeout_secs)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    // --- TRANSPORT ---

    async fn execute(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<(StatusCode, Bytes), String> {
        let uri = format!("{}{}", self.base_url, path);
        let mut builder = Request::builder().method(method.clone()).uri(&uri);
        let body = match payload {
            Payload::Empty => Full::new(Bytes::new()),
            Payload::Json(bytes) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Full::new(Bytes::from(bytes))
            }
            Payload::Form(content_type, bytes) => {
                builder = builder.header(CONTENT_TYPE, content_type);
                Full::new(bytes)
            }
        };
        let req = builder.body(body).map_err(|e| e.to_string())?;

        log::debug!("{} {}", method, uri);
        let resp = tokio::time::timeout(self.timeout, self.http.clone().oneshot(req))
            .await
            .map_err(|_| format!("Request timed out: {} {}", method, path))?
            .map_err(|e| format!("Request failed: {} {}: {}", method, path, e))?;

        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| format!("Failed to read response body: {}", e))?
            .to_bytes();
        Ok((status, body))
    }

    async fn request_bytes(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
        fallback: &str,
    ) -> Result<Bytes, String> {
        let (status, body) = self.execute(method.clone(), path, payload).await?;
        if !status.is_success() {
            let msg = error_message(status, &body, fallback);
            log::warn!("{} {} failed: {}", method, path, msg);
            return Err(msg);
        }
        Ok(body)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
        fallback: &str,
    ) -> Result<T, String> {
        let body = self.request_bytes(method, path, payload, fallback).await?;
        serde_json::from_slice(&body).map_err(|e| format!("Invalid response from {}: {}", path, e))
    }

    // --- ACCOUNT ---

    /// Signs in and stores the returned credentials in the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, String> {
        let payload = Payload::json(&LoginRequest { username, password })?;
        let session: Session = self
            .request_json(Method::POST, "/login", payload, "Login failed")
            .await?;
        log::info!("Signed in as {}", session.username);
        self.session.set(session.clone());
        Ok(session)
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    /// Self-registration always creates an agent account.
    pub async fn register(&self, registration: &Registration) -> Result<(), String> {
        registration.validate()?;

        #[derive(Serialize)]
        struct RegisterBody<'a> {
            #[serde(flatten)]
            registration: &'a Registration,
            #[serde(rename = "isAdmin")]
            is_admin: bool,
        }

        let payload = Payload::json(&RegisterBody {
            registration,
            is_admin: false,
        })?;
        self.request_bytes(Method::POST, "/register", payload, "Registration failed")
            .await
            .map(|_| ())
    }

    fn current_user_id(&self) -> Result<String, String> {
        self.session
            .get()
            .map(|s| s.user_id)
            .ok_or_else(|| "Not signed in".to_string())
    }

    // --- ITEM LISTS ---

    pub async fn items_by_status(&self, status: DeliveryStatus) -> Result<Vec<DeliveryItem>, String> {
        let path = format!("/delivery-items/status/{}", status.wire_name());
        self.request_json(Method::GET, &path, Payload::Empty, "Failed to fetch items")
            .await
            .map(tidy_items)
    }

    /// Items of the signed-in agent in `status`.
    pub async fn agent_items(&self, status: DeliveryStatus) -> Result<Vec<DeliveryItem>, String> {
        let user_id = self.current_user_id()?;
        let path = format!("/delivery-boys/{}/items/{}", user_id, status.wire_name());
        self.request_json(Method::GET, &path, Payload::Empty, "Failed to fetch items")
            .await
            .map(tidy_items)
    }

    pub async fn pending_items(&self) -> Result<Vec<DeliveryItem>, String> {
        self.request_json(
            Method::GET,
            "/delivery-items/pending",
            Payload::Empty,
            "Failed to fetch pending items",
        )
        .await
        .map(tidy_items)
    }

    pub async fn all_items(&self) -> Result<Vec<DeliveryItem>, String> {
        self.request_json(
            Method::GET,
            "/delivery-items",
            Payload::Empty,
            "Failed to fetch items",
        )
        .await
        .map(tidy_items)
    }

    // --- ITEM EDITS (admin) ---

    fn draft_form(draft: &ItemDraft) -> Result<Payload, String> {
        draft.validate()?;
        let mut form = draft
            .fields()
            .iter()
            .fold(MultipartForm::new(), |form, (key, value)| form.text(key, value));
        if let Some(image) = &draft.image {
            form = form.file("image", image);
        }
        Ok(Payload::form(form))
    }

    pub async fn create_item(&self, draft: &ItemDraft) -> Result<(), String> {
        let payload = Self::draft_form(draft)?;
        self.request_bytes(
            Method::POST,
            "/delivery-items",
            payload,
            "An unknown error occurred during item creation.",
        )
        .await?;
        log::info!("Created item '{}'", draft.name.trim());
        Ok(())
    }

    pub async fn update_item(&self, item_id: &str, draft: &ItemDraft) -> Result<(), String> {
        let payload = Self::draft_form(draft)?;
        let path = format!("/delivery-items/{}", item_id);
        self.request_bytes(Method::PUT, &path, payload, "Failed to update item")
            .await
            .map(|_| ())
    }

    pub async fn delete_item(&self, item_id: &str) -> Result<(), String> {
        let path = format!("/delivery-items/{}", item_id);
        self.request_bytes(Method::DELETE, &path, Payload::Empty, "Failed to delete item")
            .await
            .map(|_| ())
    }

    pub async fn assign_item(&self, item_id: &str, agent_id: &str) -> Result<(), String> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct AssignBody<'a> {
            delivery_boy_id: &'a str,
        }

        let payload = Payload::json(&AssignBody {
            delivery_boy_id: agent_id,
        })?;
        let path = format!("/delivery-items/{}/assign", item_id);
        self.request_bytes(Method::PUT, &path, payload, "Failed to assign item")
            .await
            .map(|_| ())
    }

    /// Agent self-assignment of a pending item.
    pub async fn pick_item(&self, item_id: &str) -> Result<(), String> {
        let user_id = self.current_user_id()?;
        self.assign_item(item_id, &user_id).await
    }

    pub async fn unassign_item(&self, item_id: &str) -> Result<(), String> {
        let path = format!("/delivery-items/{}/unassign", item_id);
        self.request_bytes(Method::PUT, &path, Payload::Empty, "Failed to unassign item")
            .await
            .map(|_| ())
    }

    // --- STATUS (agent) ---

    /// Moves `item` to `target`. The lifecycle is checked locally first, and a
    /// delivered item needs its proof photo.
    pub async fn update_status(
        &self,
        item: &DeliveryItem,
        target: DeliveryStatus,
        proof: Option<&ImageUpload>,
    ) -> Result<(), String> {
        let current = item
            .status
            .ok_or_else(|| format!("Item {} has no status", item.id))?;
        if !current.can_transition_to(target) {
            return Err(format!(
                "Cannot move item {} from {} to {}",
                item.id, current, target
            ));
        }
        if DeliveryStatus::requires_proof_image(target) && proof.is_none() {
            return Err("A proof-of-delivery photo is required".to_string());
        }

        let mut form = MultipartForm::new().text("status", target.wire_name());
        if let Some(image) = proof {
            form = form.file("delivered_image", image);
        }
        let path = format!("/delivery-items/{}/status", item.id);
        self.request_bytes(Method::PUT, &path, Payload::form(form), "Failed to update status")
            .await?;
        log::info!("Item {} moved {} -> {}", item.id, current, target);
        Ok(())
    }

    // --- COUNTS & AGENTS ---

    pub async fn status_counts(&self) -> Result<StatusCounts, String> {
        self.request_json(
            Method::GET,
            "/delivery-items/counts/status",
            Payload::Empty,
            "Failed to fetch status counts",
        )
        .await
    }

    pub async fn agent_status_counts(&self, agent_id: &str) -> Result<StatusCounts, String> {
        let path = format!("/delivery-boys/{}/counts/status", agent_id);
        self.request_json(
            Method::GET,
            &path,
            Payload::Empty,
            "Failed to fetch status counts",
        )
        .await
    }

    pub async fn agents(&self) -> Result<Vec<DeliveryAgent>, String> {
        self.request_json(
            Method::GET,
            "/delivery-boys",
            Payload::Empty,
            "Failed to fetch delivery agents",
        )
        .await
    }
}
