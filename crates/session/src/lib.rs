//! Map session reconciler.
//!
//! A [`Session`] owns the configuration currently applied to one rendered
//! map and turns each new [`config::MapConfig`] into the smallest list of
//! engine [`Command`]s. Commands are dispatched asynchronously by the host
//! and acknowledged later; raw engine events flow back and are normalized
//! into [`InteractionEvent`]s. [`MapHost`] binds sessions to mount keys.

pub mod backend;
pub mod command;
pub mod diff;
pub mod error;
pub mod event;
pub mod host;
pub mod session;
pub mod settings;

pub use backend::*;
pub use command::*;
pub use diff::*;
pub use error::*;
pub use event::*;
pub use host::*;
pub use session::*;
pub use settings::*;
