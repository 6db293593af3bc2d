//! Link Shepherd - a URL shortener service
//!
//! Short codes redirect to destination URLs either immediately or through a
//! countdown or advertisement interstitial. Accounts own their links and
//! advertisements; admins triage abuse reports, block links and manage site
//! settings.
//!
//! # Architecture
//! - `storage`: SeaORM backend and domain models
//! - `services`: business logic shared by HTTP and CLI
//! - `api`: actix-web handlers, middleware and JWT handling
//! - `interfaces`: operator CLI commands
//! - `config`: static configuration
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
