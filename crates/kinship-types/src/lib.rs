//! Shared entity model, operation outcomes and wire types.

pub mod api;
pub mod models;
pub mod outcome;
