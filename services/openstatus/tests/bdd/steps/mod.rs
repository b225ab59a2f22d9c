//! BDD step definitions for the openstatus CLI

pub mod lock_steps;
pub mod normalize_steps;
pub mod reconcile_steps;
