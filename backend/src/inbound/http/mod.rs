//! HTTP inbound adapter exposing the REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod session;
pub mod state;
pub mod tags;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
