pub mod index;
pub mod interval_map;
pub mod metadata;
pub mod model;
pub mod note_names;
pub mod position;

pub use index::*;
pub use interval_map::*;
pub use metadata::*;
pub use model::*;
pub use note_names::*;
pub use position::*;
