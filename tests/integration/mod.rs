//! Integration tests for the Scout constraint engine

mod config_integration;
mod constraint_sync;
mod test_utils;
