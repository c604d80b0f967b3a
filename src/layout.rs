//! The in-memory shapes SSPI reads and writes: `SecBuffer` records and the `SecBufferDesc` header.
//!
//! Offsets are whatever `#[repr(C)]` produces for the target, which is what the native package expects.
//! They are pinned below so a field reorder can't slip through.
use std::{
    ffi::c_void,
    mem::{offset_of, size_of},
};

/// `ulVersion` of every description this crate builds
pub const SECBUFFER_VERSION: u32 = 0;
/// Attribute bits (`SECBUFFER_READONLY` and friends) that a package may OR into `BufferType`
pub const SECBUFFER_ATTRMASK: u32 = 0xF000_0000;

/// One `SecBuffer`: `{ cbBuffer, BufferType, pvBuffer }`
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct SecBufferRecord {
    pub cb_buffer: u32,
    pub buffer_type: u32,
    pub pv_buffer: *mut c_void,
}
impl SecBufferRecord {
    pub(crate) const fn null() -> Self {
        Self {
            cb_buffer: 0,
            buffer_type: 0,
            pv_buffer: std::ptr::null_mut(),
        }
    }
}

/// `SecBufferDesc`: `{ ulVersion, cBuffers, pBuffers }`
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct SecBufferDescHeader {
    pub ul_version: u32,
    pub c_buffers: u32,
    pub p_buffers: *mut SecBufferRecord,
}

const _: () = {
    assert!(offset_of!(SecBufferRecord, cb_buffer) == 0);
    assert!(offset_of!(SecBufferRecord, buffer_type) == 4);
    assert!(offset_of!(SecBufferRecord, pv_buffer) == 8);
    assert!(offset_of!(SecBufferDescHeader, ul_version) == 0);
    assert!(offset_of!(SecBufferDescHeader, c_buffers) == 4);
    assert!(offset_of!(SecBufferDescHeader, p_buffers) == 8);
};

#[cfg(target_pointer_width = "64")]
const _: () = {
    assert!(size_of::<SecBufferRecord>() == 16);
    assert!(size_of::<SecBufferDescHeader>() == 16);
};

#[cfg(target_pointer_width = "32")]
const _: () = {
    assert!(size_of::<SecBufferRecord>() == 12);
    assert!(size_of::<SecBufferDescHeader>() == 12);
};

#[cfg(windows)]
const _: () = {
    use windows::Win32::Security::Authentication::Identity::{SecBuffer, SecBufferDesc};
    assert!(size_of::<SecBufferRecord>() == size_of::<SecBuffer>());
    assert!(offset_of!(SecBufferRecord, pv_buffer) == offset_of!(SecBuffer, pvBuffer));
    assert!(size_of::<SecBufferDescHeader>() == size_of::<SecBufferDesc>());
    assert!(offset_of!(SecBufferDescHeader, p_buffers) == offset_of!(SecBufferDesc, pBuffers));
};

/// Size of a single record inside a description's entries region
pub const RECORD_SIZE: usize = size_of::<SecBufferRecord>();
