//! Shared utilities for storage gateway services

pub mod observability;
