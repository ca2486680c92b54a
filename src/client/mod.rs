//! HTTP transport for the SecureSuite API.

pub mod http;
