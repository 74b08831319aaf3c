pub mod errors;
pub mod traits;
pub mod types;
pub mod watcher;
pub mod x11;

// Re-export commonly used types
pub use errors::SourceError;
pub use traits::WindowSource;
pub use types::{
    EventSender, NativeHandle, ProcessEntry, ProcessEvent, ProcessEventKind, WindowEntry,
};
pub use watcher::ProcessWatcher;
pub use x11::X11WindowSource;
