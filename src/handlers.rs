use crate::customers::CustomerService;
use crate::errors::AppError;
use crate::models::{
    CustomerPatchPayload, CustomerPayload, CustomerResponse, Page, PageParams, SimulationResponse,
};
use crate::reports;
use crate::simulations::SimulationService;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
}

impl AppState {
    fn customers(&self) -> CustomerService {
        CustomerService::new(self.db.clone())
    }

    fn simulations(&self) -> SimulationService {
        SimulationService::new(self.db.clone())
    }
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "loan-simulation-api",
            "version": "0.1.0"
        })),
    )
}

// ============ Customers ============

/// POST /customers
///
/// Creates a customer (with its address when supplied). 409 on duplicate CPF.
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CustomerPayload>,
) -> Result<(StatusCode, Json<CustomerResponse>), AppError> {
    tracing::info!("POST /customers - cpf: {}", payload.cpf);
    let created = state.customers().create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /customers
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CustomerResponse>>, AppError> {
    Ok(Json(state.customers().list_all().await?))
}

/// GET /customers/:id
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerResponse>, AppError> {
    Ok(Json(state.customers().get_by_id(id).await?))
}

/// GET /customers/cpf/:cpf
pub async fn get_customer_by_cpf(
    State(state): State<Arc<AppState>>,
    Path(cpf): Path<String>,
) -> Result<Json<CustomerResponse>, AppError> {
    Ok(Json(state.customers().get_by_cpf(&cpf).await?))
}

/// PUT /customers/:id
///
/// Full update. 404 when absent, 409 when the new CPF belongs to another
/// customer.
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerPayload>,
) -> Result<Json<CustomerResponse>, AppError> {
    tracing::info!("PUT /customers/{}", id);
    Ok(Json(state.customers().update(id, payload).await?))
}

/// PATCH /customers/:id
///
/// Partial update; only the fields present in the payload are touched.
pub async fn patch_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerPatchPayload>,
) -> Result<Json<CustomerResponse>, AppError> {
    tracing::info!("PATCH /customers/{}", id);
    Ok(Json(state.customers().partial_update(id, payload).await?))
}

/// DELETE /customers/:id
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    tracing::info!("DELETE /customers/{}", id);
    state.customers().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /customers
pub async fn delete_all_customers(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    tracing::info!("DELETE /customers");
    state.customers().delete_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /customers/:id/exists
pub async fn customer_exists(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(state.customers().exists(id).await?))
}

/// GET /customers/count
pub async fn count_customers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<i64>, AppError> {
    Ok(Json(state.customers().count().await?))
}

// ============ Simulations ============

/// GET /simulations/customer/:customer_id?page&size&sortBy&direction
pub async fn list_simulations_by_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<SimulationResponse>>, AppError> {
    Ok(Json(
        state
            .simulations()
            .list_by_customer(customer_id, &params)
            .await?,
    ))
}

/// GET /simulations
pub async fn list_simulations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SimulationResponse>>, AppError> {
    Ok(Json(state.simulations().list_all().await?))
}

/// GET /simulations/:id
pub async fn get_simulation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SimulationResponse>, AppError> {
    Ok(Json(state.simulations().get_by_id(id).await?))
}

/// POST /simulations/customer/:customer_id/simulacao-especifica
///
/// Creates the fixed demo simulation for the customer. 404 when the customer
/// does not exist.
pub async fn create_specific_simulation(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
) -> Result<(StatusCode, Json<SimulationResponse>), AppError> {
    tracing::info!("POST /simulations/customer/{}/simulacao-especifica", customer_id);
    let created = state
        .simulations()
        .create_specific_simulation(customer_id)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /simulations/customer/:customer_id/export/txt
///
/// Plain-text report download. 404 for an unknown customer, 204 when the
/// customer has no simulations.
pub async fn export_simulations_txt(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
) -> Result<Response, AppError> {
    tracing::info!("Exporting simulations for customer id: {} as TXT", customer_id);

    let rows = state.simulations().list_by_customer_id(customer_id).await?;
    let Some(report) = reports::render_txt_report(&rows) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"simulacoes_cliente_{}.txt\"", customer_id),
            ),
        ],
        report,
    )
        .into_response())
}

/// GET /simulations/customer/:customer_id/export/csv
pub async fn export_simulations_csv(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
) -> Result<Response, AppError> {
    tracing::info!("Exporting simulations for customer id: {} as CSV", customer_id);

    let rows = state.simulations().list_by_customer_id(customer_id).await?;
    if rows.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let report = reports::render_csv_report(&rows);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"simulacoes_cliente_{}.csv\"", customer_id),
            ),
        ],
        report,
    )
        .into_response())
}
