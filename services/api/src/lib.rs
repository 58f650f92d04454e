//! services/api/src/lib.rs
//!
//! The HTTP and WebSocket service for the doctor booking application: the
//! Postgres adapter, configuration, and the axum web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
