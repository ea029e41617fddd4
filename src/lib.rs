//! dxcore — diagnosis orchestration core.
//!
//! Turns a free-form symptom list into a ranked, confidence-scored list of
//! candidate conditions, and coordinates calls to independent analysis
//! providers (symptom prediction, chest X-ray classification) with per-call
//! deadlines, independent failure domains, guaranteed cleanup of uploaded
//! media, and health aggregation across providers.

pub mod api;
pub mod catalog;
pub mod config;
pub mod health;
pub mod media;
pub mod orchestrator;
pub mod provider;
pub mod scoring;
