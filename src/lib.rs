//! Owned SSPI security buffers for NTLM handshakes.
//!
//! A [`SecurityBufferDescription`] owns a contiguous array of `SecBuffer` records and every allocation they point
//! to. Build one from a size (for output), from bytes (for input) or from several tagged buffers, hand its
//! [`raw`](SecurityBufferDescription::raw) view to the security package, read the reply back with
//! [`get_bytes`](SecurityBufferDescription::get_bytes) and let it drop.
//!
//! ```
//! use kenobi_secbuffer::{BufferKind, SecurityBufferDescription};
//!
//! let desc = SecurityBufferDescription::from_tagged_buffers(&[
//!     (&[0xAAu8][..], BufferKind::Token),
//!     (&[0xBB, 0xCC][..], BufferKind::Data),
//! ])?;
//! assert_eq!(desc.get_bytes()?, [0xAA, 0xBB, 0xCC]);
//! # Ok::<(), kenobi_secbuffer::Error>(())
//! ```
mod buffer;
mod description;
mod error;
pub mod handshake;
pub mod layout;
mod settings;
pub mod sspi;
#[cfg(windows)]
pub mod windows;

pub use buffer::{BufferKind, SecurityBuffer};
pub use description::{RawDescription, SecurityBufferDescription};
pub use error::{Error, Result};
pub use handshake::{Handshake, SecurityProvider, StepError, StepOutcome};
pub use settings::HandshakeSettings;
