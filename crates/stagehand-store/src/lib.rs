//! # Stagehand Store
//!
//! Durable record storage for all control-plane entities, backed by one
//! SQLite database. Typed CRUD plus filtered query primitives; every
//! mutating call commits as an independent transaction before returning.

mod predicate;
mod schema;
mod store;

pub use predicate::{Arg, Field, Predicate, ServiceField, SessionField, StepDescriptionField, StepField};
pub use store::Store;
