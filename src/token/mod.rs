//! Token validity checks.

pub mod validator;
