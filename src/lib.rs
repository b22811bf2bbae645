//! LinkAce - a self-hosted bookmark archive
//!
//! Links are saved with tags and lists, searched with filters, and kept
//! healthy by a scheduled link checker.
//!
//! # Architecture
//! - `storage`: sea-orm entities access, ownership scopes, soft deletes
//! - `services`: business operations on links, lists, tags, users and settings
//! - `scheduler`: cron-driven tasks (link checks, trash cleanup)
//! - `api`: HTTP routes, middleware, sessions and request validation
//! - `views`: Tera page rendering
//! - `interfaces`: command-line interface
//! - `config`: static configuration from TOML and environment
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod scheduler;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
pub mod views;
