//! Configuration validator: turns the JSON-shaped arguments a dashboard
//! script passes into a canonical, immutable [`MapConfig`].
//!
//! Everything here is pure. The same input always yields the same
//! `MapConfig` or the same [`ValidationError`].

pub mod dimension;
pub mod error;
pub mod layer_list;
pub mod map_config;
pub mod validate;

pub use dimension::*;
pub use error::*;
pub use layer_list::*;
pub use map_config::*;
pub use validate::*;
