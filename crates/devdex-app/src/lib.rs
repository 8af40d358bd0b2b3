// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod controller;
pub mod error;
pub mod filter;
pub mod ids;
pub mod location;
pub mod model;
pub mod state;
pub mod suggest;
pub mod window;

pub use controller::*;
pub use error::*;
pub use filter::*;
pub use ids::*;
pub use location::*;
pub use model::*;
pub use state::*;
pub use suggest::*;
pub use window::*;

#[cfg(test)]
pub(crate) mod fixtures;
