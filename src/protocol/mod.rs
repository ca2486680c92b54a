//! SecureSuite wire models.

pub mod models;
