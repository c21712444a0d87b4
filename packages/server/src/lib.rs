// Caregiver Resource Guide - API Core
//
// This crate answers caregiver questions with support schemes: it grounds an
// assistant run in curated resources, parses the reply into structured schemes,
// cross-checks them against the canonical store and persists new findings.
//
// Pipeline steps are organized per-domain in domains/*.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
