//! Product catalog infrastructure
//!
//! In-memory and PostgreSQL product repositories plus the catalog service.

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresProductRepository;
pub use repository::InMemoryProductRepository;
pub use service::ProductService;
