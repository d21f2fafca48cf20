//! Buffer - fixed-capacity byte windows with independent cursors
//!
//! The core [`ByteBuffer`] type plus slicing and concatenation. Buffers are
//! produced by the loader and mapper modules and transformed here.

pub mod concat;
pub mod core;

pub use self::concat::concat;
pub use self::core::{ByteBuffer, ByteOrder};
