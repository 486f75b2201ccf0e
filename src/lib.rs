//! Financial Prediction Orchestrator
//!
//! Turns one raw monthly financial profile into a consistent bundle of
//! six predictions computed by six separately trained models:
//! - expense breakdown (regressor)
//! - overspending flag (classifier)
//! - anomaly flag (outlier detector)
//! - savings-target achievement (decision tree)
//! - financial health score (regressor)
//! - personalized budget recommendation (regressor + rule table)
//!
//! PIPELINE:
//! RAW PROFILE → DERIVE RATIOS → BUILD VIEWS → FAN OUT → AGGREGATE
//!
//! Derivation and view building are request-fatal; each of the six model
//! invocations is isolated, so a single faulty model degrades exactly
//! one slot of the aggregate.

pub mod adapters;
pub mod api;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod features;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod registry;
pub mod views;

pub use error::Result;

// Re-export common types
pub use features::FinancialRatioEngine;
pub use models::*;
pub use orchestrator::PredictionOrchestrator;
pub use registry::ModelRegistry;
pub use views::FeatureViewBuilder;
