//! PostgreSQL adapters for the repository ports.
//!
//! Repositories are thin: they translate between Diesel rows and domain
//! types and express guarded transitions as conditional statements. Rows and
//! the schema stay private to this module.
//!
//! ```ignore
//! use buddy_backend::outbound::persistence::{DbPool, DieselRequestRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/buddy")).await?;
//! let requests = DieselRequestRepository::new(pool.clone());
//! ```

mod diesel_chat_repository;
mod diesel_member_repository;
mod diesel_notification_repository;
mod diesel_report_repository;
mod diesel_request_repository;
mod diesel_response_repository;
pub(crate) mod error_mapping;
mod migrations;
mod models;
mod paging;
mod pool;
mod schema;

pub use diesel_chat_repository::DieselChatRepository;
pub use diesel_member_repository::DieselMemberRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_report_repository::DieselReportRepository;
pub use diesel_request_repository::DieselRequestRepository;
pub use diesel_response_repository::DieselResponseRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
