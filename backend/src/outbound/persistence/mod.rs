//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain's driven ports backed by PostgreSQL
//! via `diesel-async` with `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types; no business logic lives here.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leak to the domain layer.
//! - **Strongly typed errors**: every failure maps to a
//!   [`crate::domain::ports::RepositoryError`] variant, with unique-constraint
//!   violations preserved as `Duplicate`.

mod diesel_event_repository;
mod diesel_login_service;
mod diesel_review_repository;
mod diesel_rsvp_repository;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;
mod user_conversions;

pub use diesel_event_repository::DieselEventRepository;
pub use diesel_login_service::DieselLoginService;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_rsvp_repository::DieselRsvpRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
