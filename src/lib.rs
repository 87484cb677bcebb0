//! Fatia
//!
//! Fatia prices and resolves half-and-half ("meio a meio") pizzas: size resolution across
//! flavors, option-group merging, configurable price aggregation and cart line emission.

pub mod cart;
pub mod config;
pub mod fixtures;
pub mod loader;
pub mod logging;
pub mod names;
pub mod options;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod products;
pub mod quote;
pub mod selection;
pub mod session;
pub mod sizes;
pub mod store;
pub mod uuids;
pub mod wizard;
