//! Trait definitions for Sakai entity operations.
//!
//! Each entity type implements the traits it supports, encapsulating
//! endpoint differences in the implementations.

mod entity;
mod get;
mod list;

pub use entity::Entity;
pub use get::Get;
pub use list::List;
