//! datalens: schema-free dataset analytics.
//!
//! Upload an arbitrary tabular dataset (JSON rows, CSV text, or a CSV
//! URL) and get an auto-generated dashboard: column roles inferred from
//! the first row, KPI summaries, time-bucketed series, and ranked
//! dimensional breakdowns. The engine is a pure function over an
//! in-memory snapshot; persistence and transport live at the edges.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
