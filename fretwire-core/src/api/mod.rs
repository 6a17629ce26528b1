//! Wire-level API surface: versioned route constants and payload
//! parsing for the admin endpoints.

pub mod routes;
pub mod types;
