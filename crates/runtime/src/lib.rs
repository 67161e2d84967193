pub mod deadline;
pub mod event_bus;
pub mod pending;
pub mod tick;

pub use deadline::*;
pub use event_bus::*;
pub use pending::*;
pub use tick::*;
