//! Loan Simulation API Library
//!
//! This library provides the core functionality for the loan simulation API:
//! customer CRUD with CPF uniqueness and owned addresses, loan simulations
//! with paged queries, and plain-text/CSV report exports.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `customers`: Customer directory service and the city/state name filter.
//! - `db`: Database connection, pool, and schema bootstrap.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Data models and request/response payloads.
//! - `reports`: Report rendering (TXT and CSV).
//! - `simulations`: Simulation ledger service.

pub mod config;
pub mod customers;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod reports;
pub mod simulations;
