//! HTTP middleware.

pub mod cors;

pub use cors::permissive_cors;
