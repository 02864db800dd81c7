use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::{Page, PageParams, SimulationExportRow, SimulationResponse, SimulationRow};

const DEFAULT_PAGE_SIZE: i64 = 10;
const DEFAULT_SORT_FIELD: &str = "dataHora";

const SELECT_COLUMNS: &str = "id, customer_id, recorded_at, requested_amount, \
     collateral_amount, term_months, monthly_interest_rate";

/// Service over the simulation ledger: creation, paged queries by customer,
/// and the unpaged listing feeding the report exports.
pub struct SimulationService {
    pool: PgPool,
}

impl SimulationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns one page of the customer's simulations.
    ///
    /// Fails with `NotFound` when the customer does not exist, and with
    /// `BadRequest` for a negative page, non-positive size, or unknown sort
    /// field.
    pub async fn list_by_customer(
        &self,
        customer_id: i64,
        params: &PageParams,
    ) -> Result<Page<SimulationResponse>, AppError> {
        let page = params.page.unwrap_or(0);
        let size = params.size.unwrap_or(DEFAULT_PAGE_SIZE);
        tracing::info!(
            "Listing simulations for customer id: {} - page: {}, size: {}",
            customer_id,
            page,
            size
        );

        if page < 0 {
            return Err(AppError::BadRequest("page must not be negative".to_string()));
        }
        if size <= 0 {
            return Err(AppError::BadRequest("size must be positive".to_string()));
        }
        let offset = page
            .checked_mul(size)
            .ok_or_else(|| AppError::BadRequest("page is out of range".to_string()))?;
        let column = sort_column(params.sort_by.as_deref().unwrap_or(DEFAULT_SORT_FIELD))?;
        let direction = sort_direction(params.direction.as_deref().unwrap_or("desc"));

        self.ensure_customer_exists(customer_id).await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM simulations WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_one(&self.pool)
            .await?;

        // Column and direction come from fixed whitelists, never from raw input.
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM simulations WHERE customer_id = $1 \
             ORDER BY {column} {direction} LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, SimulationRow>(&sql)
            .bind(customer_id)
            .bind(size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            content: rows.into_iter().map(SimulationResponse::from).collect(),
            total_elements: total,
            total_pages: total_pages(total, size),
            page,
            size,
        })
    }

    /// Lists all simulations across all customers.
    pub async fn list_all(&self) -> Result<Vec<SimulationResponse>, AppError> {
        tracing::info!("Listing all simulations");
        let rows = sqlx::query_as::<_, SimulationRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM simulations"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SimulationResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<SimulationResponse, AppError> {
        tracing::info!("Fetching simulation by id: {}", id);
        let row = sqlx::query_as::<_, SimulationRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM simulations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Simulation not found with id: {}", id)))?;
        Ok(row.into())
    }

    /// The full unpaged list for one customer, joined with the customer's
    /// name and cpf. Feeds the TXT and CSV exports.
    pub async fn list_by_customer_id(
        &self,
        customer_id: i64,
    ) -> Result<Vec<SimulationExportRow>, AppError> {
        self.ensure_customer_exists(customer_id).await?;

        let rows = sqlx::query_as::<_, SimulationExportRow>(
            r#"
            SELECT s.id, s.customer_id, s.recorded_at, s.requested_amount,
                   s.collateral_amount, s.term_months, s.monthly_interest_rate,
                   c.name AS customer_name, c.cpf AS customer_cpf
            FROM simulations s
            JOIN customers c ON c.id = s.customer_id
            WHERE s.customer_id = $1
            ORDER BY s.id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Persists the fixed demo simulation for the given customer.
    ///
    /// The values are intentional literals, kept in the statement itself so
    /// the inserted row is exactly deterministic: 2024-06-15T10:30:26,
    /// 300000.00 requested against 1000000.00 collateral, 150 months at
    /// 2.00% a month.
    pub async fn create_specific_simulation(
        &self,
        customer_id: i64,
    ) -> Result<SimulationResponse, AppError> {
        tracing::info!("Creating specific simulation for customer id: {}", customer_id);
        self.ensure_customer_exists(customer_id).await?;

        let row = sqlx::query_as::<_, SimulationRow>(&format!(
            "INSERT INTO simulations \
                 (customer_id, recorded_at, requested_amount, collateral_amount, \
                  term_months, monthly_interest_rate) \
             VALUES ($1, TIMESTAMP '2024-06-15 10:30:26', 300000.00, 1000000.00, 150, 2.00) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn ensure_customer_exists(&self, customer_id: i64) -> Result<(), AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1)")
                .bind(customer_id)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Customer not found with id: {}",
                customer_id
            )))
        }
    }
}

/// Maps an API sort field to its column. Accepts the original Portuguese
/// field names alongside the camelCase response names; anything else is
/// rejected rather than interpolated into SQL.
fn sort_column(field: &str) -> Result<&'static str, AppError> {
    match field {
        "id" => Ok("id"),
        "dataHora" | "timestamp" | "recordedAt" => Ok("recorded_at"),
        "valorSolicitado" | "requestedAmount" => Ok("requested_amount"),
        "valorGarantia" | "collateralAmount" => Ok("collateral_amount"),
        "quantidadeMeses" | "termMonths" => Ok("term_months"),
        "taxaJurosMensal" | "monthlyInterestRate" => Ok("monthly_interest_rate"),
        other => Err(AppError::BadRequest(format!("Unknown sort field: {}", other))),
    }
}

/// `"desc"` case-insensitively sorts descending; anything else ascending.
fn sort_direction(direction: &str) -> &'static str {
    if direction.eq_ignore_ascii_case("desc") {
        "DESC"
    } else {
        "ASC"
    }
}

fn total_pages(total: i64, size: i64) -> i64 {
    (total + size - 1) / size
}
