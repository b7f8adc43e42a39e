pub mod event;
pub mod instrument;
pub mod sequencer;
pub mod storage;
pub mod types;
pub mod viewport;

pub use event::*;
pub use instrument::*;
pub use sequencer::*;
pub use storage::*;
pub use types::*;
pub use viewport::*;
