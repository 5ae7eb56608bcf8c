//! Sentinel - An emergency department surveillance dashboard.
//!
//! # Overview
//!
//! Sentinel shows a regional map of hospitals, ambulances, weather hazards and
//! traffic, and for a selected hospital a short-horizon load forecast obtained
//! from an external prediction service, together with alerts and suggested
//! patient transfers. Every visible string is available in English and Arabic.
//!
//! The map data is a fixed in-memory scenario; the only live input is the
//! prediction service.
//!
//! # Modules
//!
//! - [`i18n`]: Language selection and the label catalog
//! - [`model`]: Domain entities and the prediction payload
//! - [`fixtures`]: The static regional scenario
//! - [`prediction`]: HTTP client for the prediction service
//! - [`chart`]: Forecast series and labelled history
//! - [`map`]: Map view, layers, projection and motion simulation
//! - [`detail`]: Hospital detail view and its fetch lifecycle
//! - [`dashboard`]: Session state container
//! - [`schedule`]: Cancellable repeating tasks
//! - [`config`]: Environment configuration
//! - [`api`]: Operator console HTTP handlers

pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod detail;
pub mod error;
pub mod fixtures;
pub mod i18n;
pub mod map;
pub mod model;
pub mod prediction;
pub mod schedule;
