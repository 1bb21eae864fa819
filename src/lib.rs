//! Core of the mail triage dashboard: the email tracking table, its loaders,
//! the query engine, aggregates and exports. The egui front-end lives in the
//! binary and only talks to this crate through [`state::AppState`],
//! [`data::query::QuerySpec`] and [`data::query::View`].

pub mod actions;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod state;
