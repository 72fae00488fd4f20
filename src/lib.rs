//! SurveyScan: collect paper-survey answers by hand entry or photo scan,
//! then export them as CSV.

pub mod config;
pub mod error;
pub mod llm;
pub mod routes;
pub mod services;
pub mod state;
pub mod survey;
