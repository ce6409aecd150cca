//! Axum router and all HTTP handlers for convoy-daemon.
//!
//! `build_router` is the single entry point; `main.rs` attaches middleware
//! after this call so the scenario tests can drive the bare router.
//! Handlers stay thin: extract, call the dispatcher, map the error taxonomy
//! onto status codes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use convoy_dispatch::DispatchError;
use convoy_domain::{
    Cargo, CreateCargoRequest, CreateTransportRequest, Driver, DriverStatus, StatusHistoryEntry,
    Trailer, TrailerStatus, Transport, UpdateCargoRequest, Vehicle, VehicleStatus,
};

use crate::api_types::{
    ActorKind, AssignDriverBody, ChangeStatusBody, CreateTransportBody, DbHealth, ErrorBody,
    HealthResponse, StatusBody, StatusResponse,
};
use crate::state::{uptime_secs, AppState};

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Wrapper so `?` folds a [`DispatchError`] straight into a response.
pub struct ApiError(DispatchError);

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self.0 {
            DispatchError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            DispatchError::BusinessRule(_) => (StatusCode::CONFLICT, "BUSINESS_RULE"),
            DispatchError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION"),
            DispatchError::Backend(_) => (StatusCode::INTERNAL_SERVER_ERROR, "BACKEND"),
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed on the store");
        }
        let body = ErrorBody {
            error: kind,
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status_handler))
        .route("/api/transports", post(create_transport))
        .route(
            "/api/transports/:id",
            get(get_transport)
                .put(update_transport)
                .delete(delete_transport),
        )
        .route("/api/transports/:id/assign-driver", post(assign_driver))
        .route("/api/transports/:id/status", post(change_transport_status))
        .route("/api/transports/:id/history", get(transport_history))
        .route(
            "/api/transports/:id/cargo",
            get(list_cargo).post(create_cargo),
        )
        .route("/api/cargo/:id", put(update_cargo).delete(delete_cargo))
        .route("/api/drivers/:id/transports", get(driver_transports))
        .route("/api/drivers/:id/timeline", get(driver_timeline))
        .route("/api/vehicles/available", get(available_vehicles))
        .route("/api/trailers/available", get(available_trailers))
        .route("/api/drivers/available", get(available_drivers))
        .route("/api/vehicles/:id/status", post(set_vehicle_status))
        .route("/api/trailers/:id/status", post(set_trailer_status))
        .route("/api/drivers/:id/status", post(set_driver_status))
        .route("/api/vehicles/:id", delete(remove_vehicle))
        .route("/api/trailers/:id", delete(remove_trailer))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

pub(crate) async fn status_handler(
    State(st): State<Arc<AppState>>,
) -> ApiResult<Json<StatusResponse>> {
    let db = match &st.db_pool {
        None => None,
        Some(pool) => {
            let s = convoy_db::status(pool)
                .await
                .map_err(|e| ApiError(DispatchError::Backend(e.to_string())))?;
            Some(DbHealth {
                ok: s.ok,
                has_transports_table: s.has_transports_table,
            })
        }
    };
    Ok(Json(StatusResponse {
        daemon_uptime_secs: uptime_secs(),
        store: st.store_backend.as_str(),
        config_hash: st.config_hash.clone(),
        db,
    }))
}

// ---------------------------------------------------------------------------
// Transports
// ---------------------------------------------------------------------------

pub(crate) async fn create_transport(
    State(st): State<Arc<AppState>>,
    Json(body): Json<CreateTransportBody>,
) -> ApiResult<(StatusCode, Json<Transport>)> {
    let t = st
        .dispatcher
        .create_transport(&body.transport, body.acting_user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(t)))
}

pub(crate) async fn get_transport(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Transport>> {
    Ok(Json(st.dispatcher.get_transport(id).await?))
}

pub(crate) async fn update_transport(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateTransportRequest>,
) -> ApiResult<Json<Transport>> {
    Ok(Json(st.dispatcher.update_transport(id, &body).await?))
}

pub(crate) async fn delete_transport(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    st.dispatcher.delete_transport(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn assign_driver(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignDriverBody>,
) -> ApiResult<Json<Transport>> {
    Ok(Json(st.dispatcher.assign_driver(id, body.driver_id).await?))
}

pub(crate) async fn change_transport_status(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ChangeStatusBody>,
) -> ApiResult<Json<Transport>> {
    let t = match body.actor {
        ActorKind::Admin => {
            st.dispatcher
                .change_status_as_admin(id, body.status, body.user_id)
                .await?
        }
        ActorKind::Driver => {
            st.dispatcher
                .change_status_as_driver(id, body.user_id, body.status)
                .await?
        }
    };
    Ok(Json(t))
}

pub(crate) async fn transport_history(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<StatusHistoryEntry>>> {
    Ok(Json(st.dispatcher.status_history(id).await?))
}

// ---------------------------------------------------------------------------
// Cargo
// ---------------------------------------------------------------------------

pub(crate) async fn list_cargo(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Cargo>>> {
    Ok(Json(st.dispatcher.cargo_for_transport(id).await?))
}

pub(crate) async fn create_cargo(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateCargoRequest>,
) -> ApiResult<(StatusCode, Json<Cargo>)> {
    let cargo = st.dispatcher.create_cargo(id, &body).await?;
    Ok((StatusCode::CREATED, Json(cargo)))
}

pub(crate) async fn update_cargo(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCargoRequest>,
) -> ApiResult<Json<Cargo>> {
    Ok(Json(st.dispatcher.update_cargo(id, &body).await?))
}

pub(crate) async fn delete_cargo(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    st.dispatcher.delete_cargo(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Driver reads
// ---------------------------------------------------------------------------

pub(crate) async fn driver_transports(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Transport>>> {
    Ok(Json(st.dispatcher.transports_for_driver(id).await?))
}

pub(crate) async fn driver_timeline(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<StatusHistoryEntry>>> {
    Ok(Json(st.dispatcher.driver_timeline(id).await?))
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

pub(crate) async fn available_vehicles(
    State(st): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Vehicle>>> {
    Ok(Json(st.dispatcher.available_vehicles().await?))
}

pub(crate) async fn available_trailers(
    State(st): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Trailer>>> {
    Ok(Json(st.dispatcher.available_trailers().await?))
}

pub(crate) async fn available_drivers(
    State(st): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Driver>>> {
    Ok(Json(st.dispatcher.available_drivers().await?))
}

pub(crate) async fn set_vehicle_status(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody<VehicleStatus>>,
) -> ApiResult<Json<Vehicle>> {
    Ok(Json(st.dispatcher.set_vehicle_status(id, body.status).await?))
}

pub(crate) async fn set_trailer_status(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody<TrailerStatus>>,
) -> ApiResult<Json<Trailer>> {
    Ok(Json(st.dispatcher.set_trailer_status(id, body.status).await?))
}

pub(crate) async fn set_driver_status(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody<DriverStatus>>,
) -> ApiResult<Json<Driver>> {
    Ok(Json(st.dispatcher.set_driver_status(id, body.status).await?))
}

pub(crate) async fn remove_vehicle(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    st.dispatcher.remove_vehicle(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn remove_trailer(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    st.dispatcher.remove_trailer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
