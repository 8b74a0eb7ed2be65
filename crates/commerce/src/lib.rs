//! Sundry commerce library.
//!
//! This crate provides the commerce service as a library, allowing it to be
//! tested and reused. The binary in `main.rs` wires it to Postgres, sessions,
//! and the payment provider.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod graphql;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod stores;
