#![allow(non_camel_case_types)]
#![allow(clippy::not_unsafe_ptr_arg_deref)]

//! C boundary for the batch generator.
//!
//! Every exported symbol carries a `_v<N>` suffix. Symbols are never changed
//! once shipped; a new shape gets a new version and `include/pktgen.h` aliases
//! the bare name to the latest one.

use std::alloc::{alloc, Layout};
use std::ptr;

use log::{debug, warn};
use pktgen_core::{Batch, Status};
use pktgen_gen::{Generator, LEGACY_INITIAL};

pub mod abi;

pub use pktgen_core::{BATCH_CAPACITY, PACKET_CAPACITY};

/// Opaque context handle. C callers only ever see a pointer to it.
#[repr(C)]
pub struct pktgen_ctx {
    _opaque: [u8; 0],
}

pub type pktgen_batch = Batch;

pub const PKTGEN_SUCCESS: u64 = Status::Success.code();
pub const PKTGEN_INVALID_HANDLE: u64 = Status::InvalidHandle.code();

#[no_mangle]
pub extern "C" fn pktgen_new_v1() -> *mut pktgen_ctx {
    pktgen_new_v2(LEGACY_INITIAL)
}

#[no_mangle]
pub extern "C" fn pktgen_new_v2(n: u8) -> *mut pktgen_ctx {
    // Box::new aborts on OOM. Allocate by hand so the caller gets NULL instead.
    let layout = Layout::new::<Generator>();
    let raw = unsafe { alloc(layout) } as *mut Generator;
    if raw.is_null() {
        warn!("context allocation failed");
        return ptr::null_mut();
    }
    // Safety: `raw` is non-null, aligned for Generator and uninitialised.
    unsafe { raw.write(Generator::new(n)) };
    debug!("created context {:p} (initial {})", raw, n);
    raw as *mut pktgen_ctx
}

#[no_mangle]
pub extern "C" fn pktgen_delete_v1(ctx: *mut pktgen_ctx) {
    if ctx.is_null() {
        return;
    }
    debug!("deleting context {:p}", ctx);
    // Safety: non-null handles only come from pktgen_new_*, which allocate
    // with Generator's layout from the global allocator, same as Box.
    drop(unsafe { Box::from_raw(ctx as *mut Generator) });
}

/// Panics (and therefore aborts) if the context was created with an
/// initial value above `PKTGEN_BATCH_CAPACITY`.
#[no_mangle]
pub extern "C" fn pktgen_fetch_batch_v1(ctx: *mut pktgen_ctx, batch: *mut pktgen_batch) -> u64 {
    // Safety: the caller owns both pointers for the duration of the call and
    // does not share them with another thread.
    let generator = unsafe { (ctx as *mut Generator).as_mut() };
    let batch = unsafe { batch.as_mut() };

    let (Some(generator), Some(batch)) = (generator, batch) else {
        warn!("fetch_batch called with null context or batch");
        return PKTGEN_INVALID_HANDLE;
    };

    generator.fetch_batch(batch).code()
}
