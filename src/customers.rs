use std::collections::HashMap;

use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::{
    AddressPayload, AddressResponse, AddressRow, CustomerPatchPayload, CustomerPayload,
    CustomerResponse, CustomerRow,
};

/// Service over the customer directory: CPF uniqueness, address ownership
/// semantics, and the trivial existence/count queries.
pub struct CustomerService {
    pool: PgPool,
}

impl CustomerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a customer, linking the address row when one is supplied.
    ///
    /// Fails with `Conflict` when the CPF is already registered. The
    /// pre-check covers the common case; a concurrent duplicate writer is
    /// caught by the UNIQUE constraint and translated to `Conflict` in
    /// `From<sqlx::Error>`.
    pub async fn create(&self, payload: CustomerPayload) -> Result<CustomerResponse, AppError> {
        tracing::info!("Creating customer: {}", payload.name);
        payload.validate()?;

        if self.exists_by_cpf(&payload.cpf).await? {
            return Err(AppError::Conflict(format!(
                "CPF already registered: {}",
                payload.cpf
            )));
        }

        let mut tx = self.pool.begin().await?;

        let customer = sqlx::query_as::<_, CustomerRow>(
            "INSERT INTO customers (cpf, name) VALUES ($1, $2) RETURNING id, cpf, name",
        )
        .bind(&payload.cpf)
        .bind(&payload.name)
        .fetch_one(&mut *tx)
        .await?;

        let address = match &payload.address {
            Some(addr) => Some(
                sqlx::query_as::<_, AddressRow>(
                    r#"
                    INSERT INTO addresses (customer_id, street, number, neighborhood, zip_code, city, state)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING *
                    "#,
                )
                .bind(customer.id)
                .bind(&addr.street)
                .bind(&addr.number)
                .bind(&addr.neighborhood)
                .bind(&addr.zip_code)
                .bind(&addr.city)
                .bind(&addr.state)
                .fetch_one(&mut *tx)
                .await?,
            ),
            None => None,
        };

        tx.commit().await?;

        Ok(CustomerResponse {
            id: customer.id,
            cpf: customer.cpf,
            name: customer.name,
            address: address.map(AddressResponse::from),
        })
    }

    /// Lists every customer with its address embedded.
    pub async fn list_all(&self) -> Result<Vec<CustomerResponse>, AppError> {
        tracing::info!("Listing all customers");

        let customers = sqlx::query_as::<_, CustomerRow>("SELECT id, cpf, name FROM customers")
            .fetch_all(&self.pool)
            .await?;

        let addresses = sqlx::query_as::<_, AddressRow>("SELECT * FROM addresses")
            .fetch_all(&self.pool)
            .await?;
        let mut by_customer: HashMap<i64, AddressRow> = addresses
            .into_iter()
            .map(|a| (a.customer_id, a))
            .collect();

        Ok(customers
            .into_iter()
            .map(|c| CustomerResponse {
                address: by_customer.remove(&c.id).map(AddressResponse::from),
                id: c.id,
                cpf: c.cpf,
                name: c.name,
            })
            .collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<CustomerResponse, AppError> {
        tracing::info!("Fetching customer by id: {}", id);
        let customer = self.fetch_customer(id).await?;
        self.with_address(customer).await
    }

    pub async fn get_by_cpf(&self, cpf: &str) -> Result<CustomerResponse, AppError> {
        tracing::info!("Fetching customer by cpf: {}", cpf);
        let customer =
            sqlx::query_as::<_, CustomerRow>("SELECT id, cpf, name FROM customers WHERE cpf = $1")
                .bind(cpf)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Customer not found with CPF: {}", cpf))
                })?;
        self.with_address(customer).await
    }

    /// Full update: cpf and name are overwritten unconditionally; when an
    /// address payload is present, the existing address row is mutated in
    /// place (same id), or a new row is attached when none existed.
    pub async fn update(
        &self,
        id: i64,
        payload: CustomerPayload,
    ) -> Result<CustomerResponse, AppError> {
        tracing::info!("Updating customer id: {}", id);
        payload.validate()?;

        let existing = self.fetch_customer(id).await?;
        if existing.cpf != payload.cpf && self.exists_by_cpf(&payload.cpf).await? {
            return Err(AppError::Conflict(format!(
                "CPF already registered: {}",
                payload.cpf
            )));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE customers SET cpf = $1, name = $2 WHERE id = $3")
            .bind(&payload.cpf)
            .bind(&payload.name)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(addr) = &payload.address {
            upsert_address(&mut tx, id, addr).await?;
        }

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Partial update: each of cpf, name, and address is applied only when
    /// present in the payload.
    pub async fn partial_update(
        &self,
        id: i64,
        payload: CustomerPatchPayload,
    ) -> Result<CustomerResponse, AppError> {
        tracing::info!("Partially updating customer id: {}", id);
        payload.validate()?;

        let existing = self.fetch_customer(id).await?;

        if let Some(cpf) = &payload.cpf {
            if existing.cpf != *cpf && self.exists_by_cpf(cpf).await? {
                return Err(AppError::Conflict(format!("CPF already registered: {}", cpf)));
            }
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE customers SET cpf = COALESCE($1, cpf), name = COALESCE($2, name) WHERE id = $3",
        )
        .bind(payload.cpf.as_deref())
        .bind(payload.name.as_deref())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(addr) = &payload.address {
            upsert_address(&mut tx, id, addr).await?;
        }

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Deletes a customer; the store cascades to its address and simulations.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        tracing::info!("Deleting customer id: {}", id);

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Customer not found with id: {}",
                id
            )));
        }
        Ok(())
    }

    /// Unconditional bulk delete of every customer (and, by cascade, every
    /// address and simulation).
    pub async fn delete_all(&self) -> Result<(), AppError> {
        tracing::warn!("Deleting ALL customers");
        sqlx::query("DELETE FROM customers")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn exists_by_cpf(&self, cpf: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customers WHERE cpf = $1)")
                .bind(cpf)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn fetch_customer(&self, id: i64) -> Result<CustomerRow, AppError> {
        sqlx::query_as::<_, CustomerRow>("SELECT id, cpf, name FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer not found with id: {}", id)))
    }

    async fn with_address(&self, customer: CustomerRow) -> Result<CustomerResponse, AppError> {
        let address =
            sqlx::query_as::<_, AddressRow>("SELECT * FROM addresses WHERE customer_id = $1")
                .bind(customer.id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(CustomerResponse {
            id: customer.id,
            cpf: customer.cpf,
            name: customer.name,
            address: address.map(AddressResponse::from),
        })
    }
}

/// Mutates the customer's address row in place when one exists (preserving
/// its id), or attaches a freshly inserted row when none did.
async fn upsert_address(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    customer_id: i64,
    addr: &AddressPayload,
) -> Result<(), AppError> {
    let updated = sqlx::query(
        r#"
        UPDATE addresses
        SET street = $1, number = $2, neighborhood = $3, zip_code = $4, city = $5, state = $6
        WHERE customer_id = $7
        "#,
    )
    .bind(&addr.street)
    .bind(&addr.number)
    .bind(&addr.neighborhood)
    .bind(&addr.zip_code)
    .bind(&addr.city)
    .bind(&addr.state)
    .bind(customer_id)
    .execute(&mut **tx)
    .await?;

    if updated.rows_affected() == 0 {
        sqlx::query(
            r#"
            INSERT INTO addresses (customer_id, street, number, neighborhood, zip_code, city, state)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(customer_id)
        .bind(&addr.street)
        .bind(&addr.number)
        .bind(&addr.neighborhood)
        .bind(&addr.zip_code)
        .bind(&addr.city)
        .bind(&addr.state)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Returns the names of the customers whose address matches the given city
/// and state, case-insensitively, in input order. Customers without an
/// address never match. Pure, no database access.
pub fn filter_names_by_city_state(
    customers: &[CustomerResponse],
    city: &str,
    state: &str,
) -> Vec<String> {
    let city = city.to_lowercase();
    let state = state.to_lowercase();
    customers
        .iter()
        .filter(|c| {
            c.address
                .as_ref()
                .is_some_and(|a| a.city.to_lowercase() == city && a.state.to_lowercase() == state)
        })
        .map(|c| c.name.clone())
        .collect()
}
