// src/services/api_server.rs
//! API Server for the credential registry
//!
//! REST interface over the registry, built on Axum. The host in front of
//! this server authenticates callers and passes the caller identity in the
//! `x-caller-identity` header; mutating routes trust it as-is.
//!
//! Endpoints:
//! - issuer administration and the pause switch (owner only)
//! - credential issuance, with or without a document upload
//! - verification, status and document retrieval (always available)
//! - revocation
//! - per-subject and per-issuer listings, and per-subject reports
//! - the committed event feed

use crate::contracts::credential_registry::RegistryService;
use crate::contracts::error::RegistryError;
use crate::models::credential::{CredentialStatus, VerificationResult};
use crate::models::event::EventRecord;
use crate::models::identity::{CredentialId, Identity};
use crate::models::issuer::Issuer;
use crate::services::credential_issuer::{CredentialIssuer, IssuedCredential};
use crate::services::verifier::{VerificationReport, Verifier};
use crate::services::ServiceError;
use crate::storage::ipfs_client::{ContentStorage, StorageError};
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Header carrying the authenticated caller identity.
pub const CALLER_HEADER: &str = "x-caller-identity";

// API request and response structures

/// Request payload for registering an issuer
#[derive(Serialize, Deserialize)]
pub struct AddIssuerRequest {
    pub id: Identity,
    pub name: String,
    pub country: String,
}

/// Request payload for handing over the owner role
#[derive(Serialize, Deserialize)]
pub struct TransferOwnershipRequest {
    pub new_owner: Identity,
}

/// Request payload for issuing a credential over an existing content reference
#[derive(Serialize, Deserialize)]
pub struct IssueCredentialRequest {
    pub subject: Identity,
    pub content_ref: String,
    pub credential_type: String,
    #[serde(default)]
    pub expiry: u64,
}

/// Response for credential issuance
#[derive(Serialize, Deserialize)]
pub struct IssueCredentialResponse {
    pub credential_id: CredentialId,
}

/// Request payload for storing a document and issuing a credential for it
#[derive(Serialize, Deserialize)]
pub struct IssueDocumentRequest {
    pub document: serde_json::Value,
    pub subject: Identity,
    pub credential_type: String,
    #[serde(default)]
    pub expiry: u64,
}

/// Response listing credential IDs in issuance order
#[derive(Serialize, Deserialize)]
pub struct CredentialListResponse {
    pub credentials: Vec<CredentialId>,
}

/// Response for the status endpoint
#[derive(Serialize, Deserialize)]
pub struct CredentialStatusResponse {
    pub credential_id: CredentialId,
    pub status: CredentialStatus,
}

/// Response describing the registry as a whole
#[derive(Serialize, Deserialize)]
pub struct RegistryInfoResponse {
    pub owner: Identity,
    pub paused: bool,
    pub total_credentials: u64,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub since: u64,
}

/// Error body returned by every failing route.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(message: String) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_input",
            message,
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        let status = match err {
            RegistryError::Unauthorized(_) => StatusCode::FORBIDDEN,
            RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::AlreadyExists(_) | RegistryError::AlreadyRevoked(_) => StatusCode::CONFLICT,
            RegistryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RegistryError::SystemPaused => StatusCode::SERVICE_UNAVAILABLE,
        };
        ApiError {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Registry(e) => e.into(),
            ServiceError::Storage(StorageError::NotFound(r)) => ApiError {
                status: StatusCode::NOT_FOUND,
                kind: "content_not_found",
                message: format!("content not found: {}", r),
            },
            ServiceError::Storage(e) => ApiError {
                status: StatusCode::BAD_GATEWAY,
                kind: "storage_error",
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            log::error!("request failed: {}", self.message);
        }
        (self.status, Json(json!({"error": self.kind, "message": self.message}))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn caller(headers: &HeaderMap) -> Result<Identity, ApiError> {
    let raw = headers
        .get(CALLER_HEADER)
        .ok_or_else(|| ApiError {
            status: StatusCode::UNAUTHORIZED,
            kind: "missing_caller",
            message: format!("{} header is required", CALLER_HEADER),
        })?
        .to_str()
        .map_err(|_| ApiError::bad_request(format!("{} header is not valid text", CALLER_HEADER)))?;
    parse_param(raw)
}

fn parse_param<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ApiError::bad_request(format!("invalid identifier {}: {}", raw, e)))
}

/// API server state containing all service dependencies
pub struct ApiServer<S> {
    /// The registry state machine
    registry: RegistryService,

    /// Service for issuing and revoking credentials
    credential_issuer: CredentialIssuer<S>,

    /// Service for verifying credentials
    verifier: Verifier<S>,
}

impl<S: ContentStorage> ApiServer<S> {
    /// Creates a new instance of the API server
    ///
    /// # Arguments
    /// * `registry` - Registry the server operates on
    /// * `storage` - Backend for credential documents
    pub fn new(registry: RegistryService, storage: Arc<S>) -> Self {
        ApiServer {
            credential_issuer: CredentialIssuer::new(registry.clone(), storage.clone()),
            verifier: Verifier::new(registry.clone(), storage),
            registry,
        }
    }

    /// Builds the router with all API routes
    pub fn router(self) -> Router {
        Router::new()
            .route("/registry", get(Self::registry_info_handler))
            .route("/issuers", post(Self::add_issuer_handler).get(Self::list_issuers_handler))
            .route("/issuers/:id", get(Self::get_issuer_handler).delete(Self::remove_issuer_handler))
            .route("/issuers/:id/credentials", get(Self::list_by_issuer_handler))
            .route("/pause", post(Self::pause_handler))
            .route("/unpause", post(Self::unpause_handler))
            .route("/ownership", post(Self::transfer_ownership_handler))
            .route("/credentials", post(Self::issue_credential_handler))
            .route("/documents", post(Self::issue_document_handler))
            .route("/credentials/:id", get(Self::verify_credential_handler))
            .route("/credentials/:id/status", get(Self::credential_status_handler))
            .route("/credentials/:id/report", get(Self::report_handler))
            .route("/credentials/:id/document", get(Self::document_handler))
            .route("/credentials/:id/revoke", post(Self::revoke_credential_handler))
            .route("/subjects/:id/credentials", get(Self::list_by_subject_handler))
            .route("/subjects/:id/reports", get(Self::subject_reports_handler))
            .route("/events", get(Self::events_handler))
            .route("/health", get(|| async { "ok" }))
            .layer(CorsLayer::permissive())
            .with_state(Arc::new(self))
    }

    /// Starts the API server and begins listening for requests
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3000")
    pub async fn run(self, addr: SocketAddr) -> std::io::Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("API server listening on http://{}", addr);
        axum::serve(listener, app).await
    }

    // =====================
    // Administration Handlers
    // =====================

    async fn registry_info_handler(State(state): State<Arc<Self>>) -> Json<RegistryInfoResponse> {
        Json(RegistryInfoResponse {
            owner: state.registry.owner(),
            paused: state.registry.is_paused(),
            total_credentials: state.registry.total_credentials(),
        })
    }

    /// Registers a new issuer
    ///
    /// # Endpoint
    /// POST /issuers
    ///
    /// # Responses
    /// - 200 OK: Returns the new issuer record
    /// - 403 Forbidden: Caller is not the owner
    /// - 409 Conflict: Issuer already registered
    async fn add_issuer_handler(
        State(state): State<Arc<Self>>,
        headers: HeaderMap,
        payload: Result<Json<AddIssuerRequest>, JsonRejection>,
    ) -> ApiResult<Issuer> {
        let Json(payload) = payload?;
        let caller = caller(&headers)?;
        let issuer = state
            .registry
            .add_issuer(caller, payload.id, &payload.name, &payload.country)?;
        Ok(Json(issuer))
    }

    async fn list_issuers_handler(State(state): State<Arc<Self>>) -> Json<Vec<Issuer>> {
        Json(state.registry.list_issuers())
    }

    async fn get_issuer_handler(State(state): State<Arc<Self>>, Path(id): Path<String>) -> ApiResult<Issuer> {
        Ok(Json(state.registry.get_issuer(parse_param(&id)?)?))
    }

    /// Deactivates an issuer
    ///
    /// # Endpoint
    /// DELETE /issuers/:id
    async fn remove_issuer_handler(
        State(state): State<Arc<Self>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<StatusCode, ApiError> {
        let caller = caller(&headers)?;
        state.registry.remove_issuer(caller, parse_param(&id)?)?;
        Ok(StatusCode::NO_CONTENT)
    }

    async fn pause_handler(State(state): State<Arc<Self>>, headers: HeaderMap) -> Result<StatusCode, ApiError> {
        state.registry.pause(caller(&headers)?)?;
        Ok(StatusCode::NO_CONTENT)
    }

    async fn unpause_handler(State(state): State<Arc<Self>>, headers: HeaderMap) -> Result<StatusCode, ApiError> {
        state.registry.unpause(caller(&headers)?)?;
        Ok(StatusCode::NO_CONTENT)
    }

    async fn transfer_ownership_handler(
        State(state): State<Arc<Self>>,
        headers: HeaderMap,
        payload: Result<Json<TransferOwnershipRequest>, JsonRejection>,
    ) -> Result<StatusCode, ApiError> {
        let Json(payload) = payload?;
        state.registry.transfer_ownership(caller(&headers)?, payload.new_owner)?;
        Ok(StatusCode::NO_CONTENT)
    }

    // =====================
    // Credential Handlers
    // =====================

    /// Issues a credential for an already stored document
    ///
    /// # Endpoint
    /// POST /credentials
    ///
    /// # Responses
    /// - 200 OK: Returns the credential ID
    /// - 403 Forbidden: Caller is not an active issuer
    /// - 503 Service Unavailable: Registry is paused
    async fn issue_credential_handler(
        State(state): State<Arc<Self>>,
        headers: HeaderMap,
        payload: Result<Json<IssueCredentialRequest>, JsonRejection>,
    ) -> ApiResult<IssueCredentialResponse> {
        let Json(payload) = payload?;
        let caller = caller(&headers)?;
        let credential_id = state.credential_issuer.issue_credential(
            caller,
            payload.subject,
            &payload.content_ref,
            &payload.credential_type,
            payload.expiry,
        )?;
        Ok(Json(IssueCredentialResponse { credential_id }))
    }

    /// Stores a document and issues a credential for it
    ///
    /// # Endpoint
    /// POST /documents
    async fn issue_document_handler(
        State(state): State<Arc<Self>>,
        headers: HeaderMap,
        payload: Result<Json<IssueDocumentRequest>, JsonRejection>,
    ) -> ApiResult<IssuedCredential> {
        let Json(payload) = payload?;
        let caller = caller(&headers)?;
        let issued = state
            .credential_issuer
            .issue_document(
                caller,
                payload.subject,
                &payload.document,
                &payload.credential_type,
                payload.expiry,
            )
            .await?;
        Ok(Json(issued))
    }

    /// Verifies a credential
    ///
    /// # Endpoint
    /// GET /credentials/:id
    ///
    /// # Responses
    /// - 200 OK: Returns the live verification result
    /// - 404 Not Found: Unknown credential
    async fn verify_credential_handler(
        State(state): State<Arc<Self>>,
        Path(id): Path<String>,
    ) -> ApiResult<VerificationResult> {
        Ok(Json(state.verifier.verify_credential(parse_param(&id)?)?))
    }

    async fn credential_status_handler(
        State(state): State<Arc<Self>>,
        Path(id): Path<String>,
    ) -> ApiResult<CredentialStatusResponse> {
        let credential_id = parse_param(&id)?;
        let status = state.registry.credential_status(credential_id)?;
        Ok(Json(CredentialStatusResponse { credential_id, status }))
    }

    async fn report_handler(State(state): State<Arc<Self>>, Path(id): Path<String>) -> ApiResult<VerificationReport> {
        Ok(Json(state.verifier.report(parse_param(&id)?)?))
    }

    async fn document_handler(
        State(state): State<Arc<Self>>,
        Path(id): Path<String>,
    ) -> ApiResult<serde_json::Value> {
        Ok(Json(state.verifier.fetch_document(parse_param(&id)?).await?))
    }

    /// Revokes a credential
    ///
    /// # Endpoint
    /// POST /credentials/:id/revoke
    ///
    /// # Responses
    /// - 204 No Content: Credential revoked
    /// - 403 Forbidden: Caller is neither the issuer nor the owner
    /// - 409 Conflict: Credential already revoked
    async fn revoke_credential_handler(
        State(state): State<Arc<Self>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<StatusCode, ApiError> {
        let caller = caller(&headers)?;
        state.credential_issuer.revoke_credential(caller, parse_param(&id)?)?;
        Ok(StatusCode::NO_CONTENT)
    }

    async fn list_by_subject_handler(
        State(state): State<Arc<Self>>,
        Path(id): Path<String>,
    ) -> ApiResult<CredentialListResponse> {
        let credentials = state.registry.list_by_subject(parse_param(&id)?);
        Ok(Json(CredentialListResponse { credentials }))
    }

    /// Re-verifies every credential held by a subject
    ///
    /// # Endpoint
    /// GET /subjects/:id/reports
    async fn subject_reports_handler(
        State(state): State<Arc<Self>>,
        Path(id): Path<String>,
    ) -> ApiResult<Vec<VerificationReport>> {
        Ok(Json(state.verifier.verify_subject(parse_param(&id)?)?))
    }

    async fn list_by_issuer_handler(
        State(state): State<Arc<Self>>,
        Path(id): Path<String>,
    ) -> ApiResult<CredentialListResponse> {
        let credentials = state.registry.list_by_issuer(parse_param(&id)?);
        Ok(Json(CredentialListResponse { credentials }))
    }

    async fn events_handler(
        State(state): State<Arc<Self>>,
        query: Result<Query<EventsQuery>, QueryRejection>,
    ) -> ApiResult<Vec<EventRecord>> {
        let Query(query) = query?;
        Ok(Json(state.registry.events_since(query.since)))
    }
}
