//! Human-readable reports over saved API data.

pub mod table;
