//! The Lego model and its stage bookkeeping.
//!
//! - [`store`]: sequences, edges, user domains and the [`Model`](store::Model) itself
//! - [`component`]: components and their per-component data
//! - [`stage`]: which stages exist and whether they may be created or dropped
//! - [`file`]: saving and loading models as JSON

pub mod component;
pub mod file;
pub mod stage;
pub mod store;
