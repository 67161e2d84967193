pub mod feature;
pub mod hover;
pub mod selection;

pub use feature::*;
pub use hover::*;
pub use selection::*;
