mod event;
mod reader;
mod source;

pub use event::KeyTransition;
pub use reader::ReaderHandle;
pub use source::{open_device, EventSource, Poll};
