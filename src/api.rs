// Account Service - REST API with Axum

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::dto::{
    AccountInfo, CreateAccountRequest, CreateAccountResponse, DeleteAccountRequest,
    DeleteAccountResponse, ErrorResponse,
};
use crate::error::AccountError;
use crate::repository::UnitOfWork;
use crate::service::AccountService;

/// Shared application state
pub struct AppState<S> {
    pub service: Arc<AccountService<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: i64,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

/// `AccountError` rendered as `{error_code, error_message}`.
pub struct ApiError(pub AccountError);

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            e if e.is_business_rule() => StatusCode::BAD_REQUEST,
            e => {
                error!(error = %e, "account request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /health
async fn health_check() -> impl IntoResponse {
    Json(Health { status: "OK" })
}

/// Run a service call on the blocking pool; stores do synchronous I/O.
async fn run_blocking<S, T, F>(state: &AppState<S>, work: F) -> Result<T, ApiError>
where
    S: UnitOfWork + Send + Sync + 'static,
    T: Send + 'static,
    F: FnOnce(&AccountService<S>) -> Result<T, AccountError> + Send + 'static,
{
    let service = Arc::clone(&state.service);
    let outcome = tokio::task::spawn_blocking(move || work(&*service))
        .await
        .map_err(|e| AccountError::Storage(format!("service task failed: {e}")))?;
    Ok(outcome?)
}

/// POST /account - Open an account
async fn create_account<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<Json<CreateAccountResponse>, ApiError>
where
    S: UnitOfWork + Send + Sync + 'static,
{
    let view = run_blocking(&state, move |service| {
        service.create_account(request.user_id, request.initial_balance)
    })
    .await?;
    Ok(Json(view.into()))
}

/// DELETE /account - Unregister an account
async fn delete_account<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<DeleteAccountRequest>,
) -> Result<Json<DeleteAccountResponse>, ApiError>
where
    S: UnitOfWork + Send + Sync + 'static,
{
    let view = run_blocking(&state, move |service| {
        service.delete_account(request.user_id, &request.account_number)
    })
    .await?;
    Ok(Json(view.into()))
}

/// GET /account?user_id=N - List a user's accounts
async fn list_accounts<S>(
    State(state): State<AppState<S>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<AccountInfo>>, ApiError>
where
    S: UnitOfWork + Send + Sync + 'static,
{
    let views = run_blocking(&state, move |service| {
        service.get_accounts_by_user_id(query.user_id)
    })
    .await?;
    Ok(Json(views.into_iter().map(AccountInfo::from).collect()))
}

/// GET /account/:id - Full account record
async fn get_account<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<crate::entities::Account>, ApiError>
where
    S: UnitOfWork + Send + Sync + 'static,
{
    let account = run_blocking(&state, move |service| service.get_account(id)).await?;
    Ok(Json(account))
}

pub fn router<S>(service: Arc<AccountService<S>>) -> Router
where
    S: UnitOfWork + Send + Sync + 'static,
{
    let state = AppState { service };

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/account",
            get(list_accounts::<S>)
                .post(create_account::<S>)
                .delete(delete_account::<S>),
        )
        .route("/account/:id", get(get_account::<S>))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
