//! Outbound adapters: concrete implementations of the domain ports.

pub mod persistence;
