//! `PostgreSQL` storage for the event registration service.
//!
//! This crate provides [`PostgresRepository`], which implements the
//! `UserRepository` and `EventRepository` traits from `registrar-core`
//! using runtime-checked sqlx queries. It supports:
//!
//! - Connection pooling configured through [`PostgresConfig`]
//! - Embedded migrations (`users` and `events` tables)
//! - Atomic conditional registration updates
//! - Mapping of unique and check violations onto `StoreError`
//!
//! # Example
//!
//! ```no_run
//! use registrar_postgres::{PostgresConfig, PostgresRepository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PostgresConfig::new("postgres://localhost/registrar").connect().await?;
//! let repository = PostgresRepository::new(pool);
//! repository.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod repository;
mod rows;

pub use config::PostgresConfig;
pub use repository::PostgresRepository;
