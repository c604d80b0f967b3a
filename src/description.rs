use std::marker::PhantomData;

use tracing::{debug, trace, warn};

use crate::{
    buffer::{BufferKind, SecurityBuffer},
    error::{Error, Result},
    layout::{SecBufferDescHeader, SecBufferRecord, SECBUFFER_VERSION},
};

/// An ordered set of security buffers, laid out as the contiguous `SecBuffer` array a `SecBufferDesc` points to.
///
/// The description is the only owner of the record array and of every buffer a record points at.
/// Dropping it (or calling [`release`](Self::release)) frees all of them.
#[derive(Debug)]
pub struct SecurityBufferDescription {
    entries: Option<Entries>,
}

#[derive(Debug)]
struct Entries {
    records: Box<[SecBufferRecord]>,
    buffers: Box<[SecurityBuffer]>,
}

// Records only ever point into `buffers`, which move together with the description.
unsafe impl Send for SecurityBufferDescription {}

impl SecurityBufferDescription {
    /// A single zeroed token buffer of `size` bytes, for output the package writes into
    pub fn from_size(size: usize) -> Result<Self> {
        Self::from_buffers(vec![SecurityBuffer::new(size)?])
    }
    /// A single token buffer holding a copy of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_buffers(vec![SecurityBuffer::from_slice(bytes)?])
    }
    /// One record per entry, in order. The package interprets buffers by position.
    pub fn from_tagged_buffers<B: AsRef<[u8]>>(entries: &[(B, BufferKind)]) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::InvalidArgument("tagged buffer list cannot be empty"));
        }
        let buffers = entries
            .iter()
            .map(|(bytes, kind)| SecurityBuffer::from_slice_with_kind(bytes.as_ref(), *kind))
            .collect::<Result<Vec<_>>>()?;
        Self::from_buffers(buffers)
    }
    /// Takes ownership of already allocated buffers
    pub fn from_buffers(buffers: Vec<SecurityBuffer>) -> Result<Self> {
        if buffers.is_empty() {
            return Err(Error::InvalidArgument("a description needs at least one buffer"));
        }
        if u32::try_from(buffers.len()).is_err() {
            return Err(Error::InvalidArgument("more than u32::MAX buffers"));
        }
        let buffers = buffers.into_boxed_slice();
        let records = buffers.iter().map(SecurityBuffer::record).collect::<Box<[_]>>();
        debug!(
            count = records.len(),
            bytes = records.iter().map(|r| r.cb_buffer as usize).sum::<usize>(),
            "built security buffer description"
        );
        Ok(Self {
            entries: Some(Entries { records, buffers }),
        })
    }

    pub fn version(&self) -> u32 {
        SECBUFFER_VERSION
    }
    /// Number of records, 0 once released
    pub fn count(&self) -> u32 {
        self.entries.as_ref().map_or(0, |e| e.records.len() as u32)
    }
    pub fn is_released(&self) -> bool {
        self.entries.is_none()
    }

    /// The bytes of every record, concatenated in record order.
    ///
    /// Each record contributes as many bytes as its current `cbBuffer` says, so this reflects
    /// whatever the package wrote back. Lengths are read fresh on every call.
    pub fn get_bytes(&self) -> Result<Vec<u8>> {
        let entries = self.entries.as_ref().ok_or(Error::InvalidState)?;
        let total = (0..entries.records.len()).map(|i| entries.valid_bytes(i).len()).sum();
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(total)?;
        for index in 0..entries.records.len() {
            bytes.extend_from_slice(entries.valid_bytes(index));
        }
        Ok(bytes)
    }
    /// The raw `BufferType` and the valid bytes of the record at `index`
    pub fn get_buffer(&self, index: usize) -> Result<(u32, Vec<u8>)> {
        let entries = self.entries.as_ref().ok_or(Error::InvalidState)?;
        let record = entries
            .records
            .get(index)
            .ok_or(Error::InvalidArgument("buffer index out of range"))?;
        let valid = entries.valid_bytes(index);
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(valid.len())?;
        bytes.extend_from_slice(valid);
        Ok((record.buffer_type, bytes))
    }

    /// Frees every buffer, then the record array. Calling this again is a no-op.
    pub fn release(&mut self) {
        if let Some(Entries { records, mut buffers }) = self.entries.take() {
            trace!(count = records.len(), "releasing security buffer description");
            buffers.iter_mut().for_each(SecurityBuffer::release);
            drop(records);
        }
    }

    /// Borrows the description as a `SecBufferDesc` for a call into the security package.
    ///
    /// The package may update `cbBuffer` in place (never beyond what was allocated) while the view is alive.
    pub fn raw(&mut self) -> Result<RawDescription<'_>> {
        let entries = self.entries.as_mut().ok_or(Error::InvalidState)?;
        Ok(RawDescription {
            header: SecBufferDescHeader {
                ul_version: SECBUFFER_VERSION,
                c_buffers: entries.records.len() as u32,
                p_buffers: entries.records.as_mut_ptr(),
            },
            _description: PhantomData,
        })
    }
}
impl Drop for SecurityBufferDescription {
    fn drop(&mut self) {
        self.release();
    }
}

impl Entries {
    fn valid_bytes(&self, index: usize) -> &[u8] {
        let record = &self.records[index];
        let buffer = &self.buffers[index];
        if record.pv_buffer.is_null() {
            return &[];
        }
        if !buffer.owns(record.pv_buffer) {
            warn!(index, "record points outside its owned buffer, ignoring it");
            return &[];
        }
        let length = record.cb_buffer as usize;
        if length > buffer.len() as usize {
            warn!(index, length, allocated = buffer.len(), "record length exceeds its allocation");
        }
        buffer.valid_bytes(length)
    }
}

/// A `SecBufferDesc` header over a borrowed [`SecurityBufferDescription`].
///
/// Getting the pointers is safe, dereferencing them is up to the caller. They are valid as long as the view lives.
pub struct RawDescription<'d> {
    header: SecBufferDescHeader,
    _description: PhantomData<&'d mut SecurityBufferDescription>,
}
impl RawDescription<'_> {
    pub fn as_ptr(&self) -> *const SecBufferDescHeader {
        &self.header
    }
    pub fn as_mut_ptr(&mut self) -> *mut SecBufferDescHeader {
        &mut self.header
    }
    #[cfg(windows)]
    pub fn as_sec_buffer_desc(&mut self) -> *mut windows::Win32::Security::Authentication::Identity::SecBufferDesc {
        self.as_mut_ptr().cast()
    }
}
