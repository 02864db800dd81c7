use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;

// ============ Database Models ============

/// A customer row. The owned address and simulations live in their own
/// tables, keyed by `customer_id`, with cascading deletes enforced by the
/// store.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CustomerRow {
    /// Surrogate identifier assigned by the store.
    pub id: i64,
    /// Brazilian taxpayer registry number, exactly 11 characters, unique.
    pub cpf: String,
    /// Customer name.
    pub name: String,
}

/// A postal address row, exclusively owned by one customer.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AddressRow {
    pub id: i64,
    /// Owning customer. Relationship-only; the Rust model never traverses
    /// from an address back to its customer.
    pub customer_id: i64,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
}

/// A loan-simulation row belonging to exactly one customer.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SimulationRow {
    pub id: i64,
    pub customer_id: i64,
    /// Date and time of the simulation event.
    pub recorded_at: NaiveDateTime,
    /// Requested loan amount, NUMERIC(15,2).
    pub requested_amount: BigDecimal,
    /// Collateral amount, NUMERIC(15,2).
    pub collateral_amount: BigDecimal,
    /// Term in months.
    pub term_months: i32,
    /// Monthly interest rate in percent, NUMERIC(5,2).
    pub monthly_interest_rate: BigDecimal,
}

/// A simulation joined with its customer's name and cpf, as consumed by the
/// report renderers.
#[derive(Debug, Clone, FromRow)]
pub struct SimulationExportRow {
    pub id: i64,
    pub customer_id: i64,
    pub recorded_at: NaiveDateTime,
    pub requested_amount: BigDecimal,
    pub collateral_amount: BigDecimal,
    pub term_months: i32,
    pub monthly_interest_rate: BigDecimal,
    pub customer_name: String,
    pub customer_cpf: String,
}

// ============ API Request/Response Models ============

/// Address payload embedded in customer create/update requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
}

/// Request payload for creating or fully updating a customer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    pub cpf: String,
    pub name: String,
    pub address: Option<AddressPayload>,
}

/// Request payload for partially updating a customer. Absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatchPayload {
    pub cpf: Option<String>,
    pub name: Option<String>,
    pub address: Option<AddressPayload>,
}

/// Address as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub id: i64,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub zip_code: String,
    pub city: String,
    pub state: String,
}

impl From<AddressRow> for AddressResponse {
    fn from(row: AddressRow) -> Self {
        Self {
            id: row.id,
            street: row.street,
            number: row.number,
            neighborhood: row.neighborhood,
            zip_code: row.zip_code,
            city: row.city,
            state: row.state,
        }
    }
}

/// Customer as returned by the API, with its owned address embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: i64,
    pub cpf: String,
    pub name: String,
    pub address: Option<AddressResponse>,
}

/// Simulation as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    pub id: i64,
    pub customer_id: i64,
    pub timestamp: NaiveDateTime,
    pub requested_amount: BigDecimal,
    pub collateral_amount: BigDecimal,
    pub term_months: i32,
    pub monthly_interest_rate: BigDecimal,
}

impl From<SimulationRow> for SimulationResponse {
    fn from(row: SimulationRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            timestamp: row.recorded_at,
            requested_amount: row.requested_amount,
            collateral_amount: row.collateral_amount,
            term_months: row.term_months,
            monthly_interest_rate: row.monthly_interest_rate,
        }
    }
}

/// Query parameters for paged simulation listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub direction: Option<String>,
}

/// One page of results plus paging metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
    pub page: i64,
    pub size: i64,
}

// ============ Payload Validation ============

fn require_max(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    if value.chars().count() > max {
        return Err(AppError::BadRequest(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

fn validate_cpf(cpf: &str) -> Result<(), AppError> {
    if cpf.chars().count() != 11 {
        return Err(AppError::BadRequest(
            "cpf must be exactly 11 characters".to_string(),
        ));
    }
    Ok(())
}

impl AddressPayload {
    pub fn validate(&self) -> Result<(), AppError> {
        require_max("street", &self.street, 100)?;
        require_max("number", &self.number, 10)?;
        require_max("neighborhood", &self.neighborhood, 50)?;
        require_max("zipCode", &self.zip_code, 9)?;
        require_max("city", &self.city, 50)?;
        require_max("state", &self.state, 2)?;
        Ok(())
    }
}

impl CustomerPayload {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_cpf(&self.cpf)?;
        require_max("name", &self.name, 100)?;
        if let Some(address) = &self.address {
            address.validate()?;
        }
        Ok(())
    }
}

impl CustomerPatchPayload {
    /// Validates only the fields that are present.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(cpf) = &self.cpf {
            validate_cpf(cpf)?;
        }
        if let Some(name) = &self.name {
            require_max("name", name, 100)?;
        }
        if let Some(address) = &self.address {
            address.validate()?;
        }
        Ok(())
    }
}
