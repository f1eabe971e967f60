//! Database layer
//!
//! SQLite-backed persistence for imported entities and the durable key-value
//! state used by the creation log.
//!
//! # Usage
//!
//! ```ignore
//! use demo_content::config::DatabaseConfig;
//! use demo_content::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool, SqliteDatabase};
