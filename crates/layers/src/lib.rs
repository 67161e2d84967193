pub mod error;
pub mod geojson;
pub mod labels;
pub mod layer;
pub mod source;
pub mod symbology;

pub use error::*;
pub use geojson::*;
pub use labels::*;
pub use layer::*;
pub use source::*;
pub use symbology::*;
