use std::{ffi::c_void, ptr::NonNull};

use tracing::trace;

use crate::{
    error::{Error, Result},
    layout::{SecBufferRecord, SECBUFFER_ATTRMASK},
};

/// The `BufferType` of a security buffer.
///
/// `SECBUFFER_VERSION` and `SECBUFFER_EMPTY` share the value 0, so the version marker is [`BufferKind::VERSION`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BufferKind {
    Empty = 0,
    Data = 1,
    #[default]
    Token = 2,
}
impl BufferKind {
    pub const VERSION: BufferKind = BufferKind::Empty;

    pub const fn as_raw(self) -> u32 {
        self as u32
    }
    /// Interprets a `BufferType` written by a security package, ignoring attribute bits like `SECBUFFER_READONLY`
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw & !SECBUFFER_ATTRMASK {
            0 => Some(Self::Empty),
            1 => Some(Self::Data),
            2 => Some(Self::Token),
            _ => None,
        }
    }
}
impl TryFrom<u32> for BufferKind {
    type Error = u32;
    fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
        Self::from_raw(value).ok_or(value)
    }
}

/// A single owned, typed span of bytes.
///
/// The buffer exclusively owns its storage until [`release`](Self::release) or drop.
/// Its bytes are read back through [`SecurityBufferDescription`](crate::SecurityBufferDescription),
/// which is the only place that knows what the native package wrote into it.
#[derive(Debug)]
pub struct SecurityBuffer {
    length: u32,
    kind: BufferKind,
    storage: Option<NonNull<[u8]>>,
}

// The storage pointer is uniquely owned, moving the buffer moves that ownership.
unsafe impl Send for SecurityBuffer {}

impl SecurityBuffer {
    /// Zeroed token buffer of `size` bytes, for the package to write into
    pub fn new(size: usize) -> Result<Self> {
        Self::with_kind(size, BufferKind::Token)
    }
    pub fn with_kind(size: usize, kind: BufferKind) -> Result<Self> {
        let length = checked_length(size)?;
        let mut storage = Vec::new();
        storage.try_reserve_exact(size)?;
        storage.resize(size, 0);
        Ok(Self::from_boxed(storage.into_boxed_slice(), length, kind))
    }
    /// Token buffer holding a copy of `bytes`
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_slice_with_kind(bytes, BufferKind::Token)
    }
    pub fn from_slice_with_kind(bytes: &[u8], kind: BufferKind) -> Result<Self> {
        let length = checked_length(bytes.len())?;
        let mut storage = Vec::new();
        storage.try_reserve_exact(bytes.len())?;
        storage.extend_from_slice(bytes);
        Ok(Self::from_boxed(storage.into_boxed_slice(), length, kind))
    }
    fn from_boxed(storage: Box<[u8]>, length: u32, kind: BufferKind) -> Self {
        trace!(length, ?kind, "allocated security buffer");
        Self {
            length,
            kind,
            storage: Some(NonNull::from(Box::leak(storage))),
        }
    }
    pub fn len(&self) -> u32 {
        self.length
    }
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
    pub fn kind(&self) -> BufferKind {
        self.kind
    }
    pub fn is_released(&self) -> bool {
        self.storage.is_none()
    }
    /// Frees the storage. Calling this again is a no-op.
    pub fn release(&mut self) {
        if let Some(storage) = self.storage.take() {
            trace!(length = self.length, kind = ?self.kind, "releasing security buffer");
            // SAFETY: storage came out of Box::leak in from_boxed and was taken out of the Option above
            drop(unsafe { Box::from_raw(storage.as_ptr()) });
        }
    }

    /// The `SecBuffer` record pointing at this buffer's storage. Released buffers yield a null, zero length record.
    pub(crate) fn record(&self) -> SecBufferRecord {
        match self.storage {
            Some(storage) => SecBufferRecord {
                cb_buffer: self.length,
                buffer_type: self.kind.as_raw(),
                pv_buffer: storage.as_ptr().cast::<c_void>(),
            },
            None => SecBufferRecord {
                buffer_type: self.kind.as_raw(),
                ..SecBufferRecord::null()
            },
        }
    }
    /// Whether `pointer` is the start of this buffer's storage
    pub(crate) fn owns(&self, pointer: *const c_void) -> bool {
        self.storage
            .is_some_and(|storage| std::ptr::eq(storage.as_ptr().cast::<c_void>(), pointer))
    }
    /// The first `length` bytes of the storage, clamped to what was allocated
    pub(crate) fn valid_bytes(&self, length: usize) -> &[u8] {
        match self.storage {
            // SAFETY: storage is live and owned by self, nothing else holds a reference to it while &self is borrowed
            Some(storage) => unsafe {
                let all = storage.as_ref();
                &all[..length.min(all.len())]
            },
            None => &[],
        }
    }
}
impl Drop for SecurityBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

fn checked_length(size: usize) -> Result<u32> {
    size.try_into()
        .map_err(|_| Error::InvalidArgument("security buffer larger than u32::MAX bytes"))
}
