//! Counts heap traffic per thread to check that descriptions give back everything they take.
use std::{
    alloc::{GlobalAlloc, Layout, System},
    cell::Cell,
};

use kenobi_secbuffer::{BufferKind, Error, SecurityBuffer, SecurityBufferDescription};

struct CountingAllocator;

thread_local! {
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
    static LIVE_BYTES: Cell<isize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let _ = ALLOCATIONS.try_with(|c| c.set(c.get() + 1));
        let _ = LIVE_BYTES.try_with(|c| c.set(c.get() + layout.size() as isize));
        unsafe { System.alloc(layout) }
    }
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        let _ = LIVE_BYTES.try_with(|c| c.set(c.get() - layout.size() as isize));
        unsafe { System.dealloc(ptr, layout) }
    }
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let _ = ALLOCATIONS.try_with(|c| c.set(c.get() + 1));
        let _ = LIVE_BYTES.try_with(|c| c.set(c.get() + new_size as isize - layout.size() as isize));
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

/// Allocation count and net live bytes on this thread while `f` runs
fn measure<T>(f: impl FnOnce() -> T) -> (T, usize, isize) {
    let allocations = ALLOCATIONS.with(Cell::get);
    let live = LIVE_BYTES.with(Cell::get);
    let out = f();
    (
        out,
        ALLOCATIONS.with(Cell::get) - allocations,
        LIVE_BYTES.with(Cell::get) - live,
    )
}

#[test]
fn rejected_input_allocates_nothing() {
    let entries: &[(&[u8], BufferKind)] = &[];
    let (result, allocations, live) = measure(|| SecurityBufferDescription::from_tagged_buffers(entries).map(drop));
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(allocations, 0);
    assert_eq!(live, 0);

    let (result, allocations, _) = measure(|| SecurityBufferDescription::from_buffers(Vec::new()).map(drop));
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(allocations, 0);
}

#[cfg(target_pointer_width = "64")]
#[test]
fn oversized_request_allocates_nothing() {
    let (result, allocations, live) = measure(|| SecurityBufferDescription::from_size(u32::MAX as usize + 1).map(drop));
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(allocations, 0);
    assert_eq!(live, 0);
}

fn lifecycle() -> Vec<u8> {
    let mut desc = SecurityBufferDescription::from_tagged_buffers(&[
        (&[0xAAu8][..], BufferKind::Token),
        (&[0xBB, 0xCC][..], BufferKind::Data),
        (&[0xDD; 64][..], BufferKind::Data),
    ])
    .unwrap();
    let bytes = desc.get_bytes().unwrap();
    desc.release();
    desc.release();
    bytes
}

#[test]
fn release_returns_every_allocation() {
    // first run registers tracing callsites, which may allocate once
    drop(lifecycle());
    let (bytes, allocations, live) = measure(|| lifecycle().len());
    assert_eq!(bytes, 67);
    assert!(allocations > 0);
    assert_eq!(live, 0);
}

#[test]
fn drop_returns_every_allocation() {
    drop(SecurityBufferDescription::from_size(32));
    let (_, _, live) = measure(|| {
        let desc = SecurityBufferDescription::from_size(12288).unwrap();
        assert_eq!(desc.get_bytes().unwrap().len(), 12288);
    });
    assert_eq!(live, 0);
}

#[test]
fn released_buffers_hold_nothing() {
    drop(SecurityBuffer::from_slice(b"warm"));
    let (_, _, live) = measure(|| {
        let mut buffer = SecurityBuffer::from_slice(b"payload").unwrap();
        buffer.release();
        assert!(buffer.is_released());
        buffer
    });
    assert_eq!(live, 0);
}

#[test]
fn moved_buffers_are_freed_with_their_description() {
    drop(SecurityBuffer::new(1));
    let (_, _, live) = measure(|| {
        let buffers = vec![
            SecurityBuffer::new(8).unwrap(),
            SecurityBuffer::from_slice_with_kind(b"meta", BufferKind::Data).unwrap(),
        ];
        let desc = SecurityBufferDescription::from_buffers(buffers).unwrap();
        assert_eq!(desc.count(), 2);
    });
    assert_eq!(live, 0);
}
