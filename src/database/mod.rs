pub mod manager;
pub mod models;
pub mod query_builder;
pub mod record;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use record::Tracked;
pub use repository::{Page, Repository};
pub use store::{EntityStore, HealthCheck};
