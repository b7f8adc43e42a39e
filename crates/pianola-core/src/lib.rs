pub mod app;
pub mod audio_params;
pub mod controller;
pub mod ipc;
pub mod note_tracker;
pub mod pedal;
pub mod queue;
pub mod sequencer;
pub mod tempo;
pub mod transport;

pub use app::*;
pub use audio_params::*;
pub use controller::*;
pub use ipc::*;
pub use note_tracker::*;
pub use pedal::*;
pub use queue::*;
pub use sequencer::*;
pub use tempo::*;
pub use transport::*;
