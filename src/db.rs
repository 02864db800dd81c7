use sqlx::{postgres::PgPoolOptions, PgPool};

/// Schema bootstrap, applied at startup. Cascading deletes on `addresses` and
/// `simulations` implement the customer ownership rules at the store level.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS customers (
    id BIGSERIAL PRIMARY KEY,
    cpf VARCHAR(11) NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL
);

CREATE TABLE IF NOT EXISTS addresses (
    id BIGSERIAL PRIMARY KEY,
    customer_id BIGINT NOT NULL UNIQUE REFERENCES customers(id) ON DELETE CASCADE,
    street VARCHAR(100) NOT NULL,
    number VARCHAR(10) NOT NULL,
    neighborhood VARCHAR(50) NOT NULL,
    zip_code VARCHAR(9) NOT NULL,
    city VARCHAR(50) NOT NULL,
    state VARCHAR(2) NOT NULL
);

CREATE TABLE IF NOT EXISTS simulations (
    id BIGSERIAL PRIMARY KEY,
    customer_id BIGINT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    recorded_at TIMESTAMP NOT NULL,
    requested_amount NUMERIC(15,2) NOT NULL,
    collateral_amount NUMERIC(15,2) NOT NULL,
    term_months INTEGER NOT NULL,
    monthly_interest_rate NUMERIC(5,2) NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_simulations_customer ON simulations (customer_id);
"#;

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;

        Ok(Self { pool })
    }
}
