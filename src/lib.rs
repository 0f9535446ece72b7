//! Google Ads Billing API Library
//!
//! This library provides the building blocks of the billing service and the
//! audience list tool: the Ads platform client, billing lookups, rule-based
//! user list construction, error taxonomy, and HTTP handlers.
//!
//! # Modules
//!
//! - `api`: API-layer namespace.
//! - `core`: Domain-layer namespace.
//! - `integrations`: External service integrations namespace.
//! - `ads_client`: Ads platform trait and Google Ads REST client.
//! - `ads_models`: Google Ads REST wire types.
//! - `app`: Router construction.
//! - `audience`: Rule-based user list builder.
//! - `billing`: Date range, billing fetch and batch orchestration.
//! - `config`: Configuration management.
//! - `docs`: OpenAPI document and Swagger UI.
//! - `errors`: Error taxonomy and vendor error classification.
//! - `handlers`: HTTP request handlers.
//! - `models`: Request/response data models.

pub mod api;
pub mod core;
pub mod integrations;

pub mod ads_client;
pub mod ads_models;
pub mod app;
pub mod audience;
pub mod billing;
pub mod config;
pub mod docs;
pub mod errors;
pub mod handlers;
pub mod models;
