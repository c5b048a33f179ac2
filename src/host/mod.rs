mod listeners;
pub mod memory;
pub mod types;

pub use memory::MemoryDocument;
pub use types::{DocumentHost, ListenerId, VisibilityListener};

#[cfg(target_os = "linux")]
pub mod x11;

#[cfg(target_os = "linux")]
pub use x11::X11Document;
