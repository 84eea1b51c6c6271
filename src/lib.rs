//! Garagem: a car registry REST backend over PostgreSQL.
//!
//! The data-access layer (`store`, `sql`) is generic over a compile-time
//! entity descriptor; `models` binds it to the car record. Handlers and
//! routes expose CRUD, dynamic filtering, bulk writes, and CSV/HTML
//! export on top of it.

pub mod config;
pub mod entity;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod report;
pub mod routes;
pub mod sheet;
pub mod sql;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use entity::{Entity, Field, FieldKind};
pub use error::{AppError, ConfigError, SchemaError};
pub use filter::{Comparison, Filter};
pub use migration::{ensure_database_exists, ensure_entity_table};
pub use routes::app;
pub use state::AppState;
pub use store::{CreateSummary, Store};
