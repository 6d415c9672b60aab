use crate::application::ports::{CredentialStore, DeliveryApi, LoginSession, PreferenceRemote};
use crate::domain::entities::{
    Attachment, Driver, ErpDocument, LocationPing, Order, Partner, ProofOfDelivery, Route,
    Settings, UserProfile, Vehicle,
};
use crate::domain::value_objects::{AccessToken, DocumentType, StopStatus};
use crate::infrastructure::http::dto::{
    ChangePasswordRequest, DutyStatusRequest, ErpStatusRequest, ListEnvelope, LoginRequest,
    LoginResponse, PreferenceResponse, PreferenceWriteRequest, RecordEnvelope,
    ReorderStopsRequest, StopStatusRequest,
};
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Form),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, AppError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| AppError::SerializationError(e.to_string()))
    }
}

/// HTTP client for the backend. Attaches the bearer token, maps 401 to a
/// cleared session and non-2xx responses to [`AppError::Http`].
pub struct ApiClient {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, AppError> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigurationError(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::ConfigurationError("API base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: RequestBody,
    ) -> Result<T, AppError> {
        let started = Instant::now();
        let mut builder = self
            .client
            .request(method.clone(), url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = self.credentials.load().await? {
            builder = builder.bearer_auth(token.as_str());
        }

        builder = match body {
            RequestBody::Empty => {
                builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            }
            RequestBody::Json(value) => builder.json(&value),
            // reqwest sets the multipart boundary content type itself
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(|e| {
            debug!(
                "{method} {url} failed after {}ms: {e}",
                started.elapsed().as_millis()
            );
            AppError::Network(e.to_string())
        })?;
        let status = response.status();
        debug!(
            "{method} {url} -> {} ({}ms)",
            status.as_u16(),
            started.elapsed().as_millis()
        );

        if status == StatusCode::UNAUTHORIZED {
            if let Err(e) = self.credentials.clear().await {
                warn!("Failed to clear access token after 401: {e}");
            }
            return Err(AppError::Unauthorized("UNAUTHORIZED".to_string()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(AppError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let payload = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(payload)
            .map_err(|e| AppError::DeserializationError(format!("{method} {url}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, AppError> {
        let url = self.endpoint(segments)?;
        self.request_json(Method::GET, url, RequestBody::Empty).await
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, AppError> {
        let url = self.endpoint(segments)?;
        self.request_json(method, url, RequestBody::json(body)?)
            .await
    }

    async fn list<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>, AppError> {
        let envelope: ListEnvelope<T> = self.get(segments).await?;
        Ok(envelope.into_items())
    }
}

#[async_trait]
impl DeliveryApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AppError> {
        let response: LoginResponse = self
            .send(
                Method::POST,
                &["auth", "login"],
                &LoginRequest { email, password },
            )
            .await?;
        let access_token = AccessToken::new(response.access_token)
            .map_err(AppError::DeserializationError)?;
        Ok(LoginSession {
            access_token,
            user: response.user,
        })
    }

    async fn logout(&self) -> Result<(), AppError> {
        let url = self.endpoint(&["auth", "logout"])?;
        let _: IgnoredAny = self
            .request_json(Method::POST, url, RequestBody::Empty)
            .await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<UserProfile, AppError> {
        let user: RecordEnvelope<UserProfile> = self.get(&["auth", "me"]).await?;
        Ok(user.into_record())
    }

    async fn set_duty_status(&self, on_duty: bool) -> Result<UserProfile, AppError> {
        let user: RecordEnvelope<UserProfile> = self
            .send(
                Method::PUT,
                &["drivers", "me", "duty"],
                &DutyStatusRequest { on_duty },
            )
            .await?;
        Ok(user.into_record())
    }

    async fn change_password(&self, current: &str, new: &str) -> Result<(), AppError> {
        let _: IgnoredAny = self
            .send(
                Method::POST,
                &["auth", "change-password"],
                &ChangePasswordRequest {
                    current_password: current,
                    new_password: new,
                },
            )
            .await?;
        Ok(())
    }

    async fn list_routes(&self) -> Result<Vec<Route>, AppError> {
        self.list(&["routes"]).await
    }

    async fn get_route(&self, route_id: &str) -> Result<Route, AppError> {
        match self.get::<RecordEnvelope<Route>>(&["routes", route_id]).await {
            Ok(route) => Ok(route.into_record()),
            Err(AppError::Http { status: 404, .. }) => {
                Err(AppError::NotFound(format!("Route {route_id}")))
            }
            Err(e) => Err(e),
        }
    }

    async fn update_stop_status(&self, stop_id: &str, status: StopStatus) -> Result<(), AppError> {
        let _: IgnoredAny = self
            .send(
                Method::PUT,
                &["stops", stop_id, "status"],
                &StopStatusRequest { status },
            )
            .await?;
        Ok(())
    }

    async fn reorder_stops(&self, route_id: &str, stop_ids: &[String]) -> Result<(), AppError> {
        let _: IgnoredAny = self
            .send(
                Method::PUT,
                &["routes", route_id, "sequence"],
                &ReorderStopsRequest { stop_ids },
            )
            .await?;
        Ok(())
    }

    async fn submit_pod(&self, pod: &ProofOfDelivery) -> Result<(), AppError> {
        let url = self.endpoint(&["stops", &pod.stop_id, "pod"])?;
        let form = pod_form(pod)?;
        let _: IgnoredAny = self
            .request_json(Method::POST, url, RequestBody::Multipart(form))
            .await?;
        Ok(())
    }

    async fn send_location(&self, ping: &LocationPing) -> Result<(), AppError> {
        let _: IgnoredAny = self
            .send(Method::POST, &["tracking", "location"], ping)
            .await?;
        Ok(())
    }

    async fn fetch_erp_document(
        &self,
        document_type: DocumentType,
        barcode: &str,
    ) -> Result<ErpDocument, AppError> {
        match self
            .get::<RecordEnvelope<ErpDocument>>(&["erp", "documents", document_type.as_str(), barcode])
            .await
        {
            Ok(document) => Ok(document.into_record()),
            Err(AppError::Http { status: 404, .. }) => Err(AppError::NotFound(format!(
                "{document_type} document {barcode}"
            ))),
            Err(AppError::Http { status, body }) if status >= 500 || status == 422 => {
                Err(AppError::Upstream(body))
            }
            Err(e) => Err(e),
        }
    }

    async fn push_erp_status(
        &self,
        document_type: DocumentType,
        barcode: &str,
        status: &str,
    ) -> Result<(), AppError> {
        let result: Result<IgnoredAny, AppError> = self
            .send(
                Method::PUT,
                &["erp", "documents", document_type.as_str(), barcode, "status"],
                &ErpStatusRequest { status },
            )
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(AppError::Http { status, body }) if status >= 500 || status == 422 => {
                Err(AppError::Upstream(body))
            }
            Err(e) => Err(e),
        }
    }

    async fn get_settings(&self) -> Result<Settings, AppError> {
        let settings: RecordEnvelope<Settings> = self.get(&["settings"]).await?;
        Ok(settings.into_record())
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        self.list(&["vehicles"]).await
    }

    async fn list_drivers(&self) -> Result<Vec<Driver>, AppError> {
        self.list(&["drivers"]).await
    }

    async fn list_partners(&self) -> Result<Vec<Partner>, AppError> {
        self.list(&["partners"]).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        self.list(&["orders"]).await
    }
}

#[async_trait]
impl PreferenceRemote for ApiClient {
    async fn get_preference(&self, key: &str) -> Result<Option<Value>, AppError> {
        match self.get::<PreferenceResponse>(&["preferences", key]).await {
            Ok(response) => Ok(response.value),
            Err(AppError::Http { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set_preference(&self, key: &str, value: &Value) -> Result<(), AppError> {
        let _: IgnoredAny = self
            .send(
                Method::PUT,
                &["preferences", key],
                &PreferenceWriteRequest { value },
            )
            .await?;
        Ok(())
    }
}

fn normalize_base_url(raw: &str) -> Result<Url, AppError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|err| AppError::ConfigurationError(format!("Invalid API URL: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(AppError::ConfigurationError(
            "API URL scheme must be http or https".to_string(),
        )),
    }
}

fn pod_form(pod: &ProofOfDelivery) -> Result<Form, AppError> {
    let mut form = Form::new().text("recipient_name", pod.recipient_name.clone());
    if let Some(comment) = &pod.comment {
        form = form.text("comment", comment.clone());
    }
    if let Some(location) = &pod.location {
        form = form
            .text("latitude", location.latitude.to_string())
            .text("longitude", location.longitude.to_string());
    }
    if let Some(signature) = &pod.signature {
        form = form.part("signature", attachment_part(signature)?);
    }
    for photo in &pod.photos {
        form = form.part("photos", attachment_part(photo)?);
    }
    Ok(form)
}

fn attachment_part(attachment: &Attachment) -> Result<Part, AppError> {
    Part::bytes(attachment.bytes.clone())
        .file_name(attachment.file_name.clone())
        .mime_str(&attachment.content_type)
        .map_err(|e| {
            AppError::validation(format!(
                "Invalid content type {} for {}: {e}",
                attachment.content_type, attachment.file_name
            ))
        })
}
