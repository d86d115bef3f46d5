pub mod engine;
mod error;
pub mod note;
pub mod tags;
pub mod view;

pub use error::EngineError;
pub use note::{Note, NoteFlags};
pub use view::ViewKind;
