use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

pub const DEFAULT_SEGMENT_SIZE: u64 = 1 << 20;

/// Memory arena the engine draws from during a run.
///
/// Arenas are shared through `&self`, possibly by several concurrent runs,
/// so implementations bring their own synchronization.
pub trait MemoryArena: Sync {
    fn reserve(&self, bytes: u64);
    fn release(&self, bytes: u64);
    /// Bytes currently handed out.
    fn bytes_used(&self) -> u64;
    /// Bytes held, including released-but-buffered segments.
    fn bytes_resident(&self) -> u64;
    /// Return buffered segments to the system.
    fn reap(&self);
    /// Bookkeeping bytes the arena holds on its own behalf.
    fn overhead(&self) -> u64 {
        0
    }
}

/// Non-owning reference to a caller-supplied arena. The borrow keeps the
/// arena alive for as long as any configuration holding the handle.
#[derive(Clone, Copy)]
pub struct AllocatorHandle<'a> {
    arena: &'a dyn MemoryArena,
}

impl<'a> AllocatorHandle<'a> {
    pub fn new(arena: &'a dyn MemoryArena) -> Self {
        Self { arena }
    }

    pub fn arena(&self) -> &'a dyn MemoryArena {
        self.arena
    }
}

impl fmt::Debug for AllocatorHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AllocatorHandle({:p})", self.arena)
    }
}

impl PartialEq for AllocatorHandle<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(self.arena, other.arena)
    }
}

impl Eq for AllocatorHandle<'_> {}

/// Segment arena, used when the caller supplies none. Reservations are
/// rounded up to whole segments for the resident count.
#[derive(Debug)]
pub struct ScratchArena {
    segment_size: u64,
    used: AtomicU64,
    resident: AtomicU64,
}

impl Default for ScratchArena {
    fn default() -> Self {
        Self::new(DEFAULT_SEGMENT_SIZE)
    }
}

impl ScratchArena {
    pub fn new(segment_size: u64) -> Self {
        Self {
            segment_size: segment_size.max(1),
            used: AtomicU64::new(0),
            resident: AtomicU64::new(0),
        }
    }

    fn round_to_segment(&self, bytes: u64) -> u64 {
        bytes.div_ceil(self.segment_size).saturating_mul(self.segment_size)
    }
}

impl MemoryArena for ScratchArena {
    fn reserve(&self, bytes: u64) {
        let previous = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_add(bytes))
            })
            .unwrap_or_else(|used| used);
        let needed = self.round_to_segment(previous.saturating_add(bytes));
        self.resident.fetch_max(needed, Ordering::AcqRel);
    }

    fn release(&self, bytes: u64) {
        let _ = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(bytes))
            });
    }

    fn bytes_used(&self) -> u64 {
        self.used.load(Ordering::Acquire)
    }

    fn bytes_resident(&self) -> u64 {
        self.resident.load(Ordering::Acquire)
    }

    fn reap(&self) {
        let needed = self.round_to_segment(self.used.load(Ordering::Acquire));
        self.resident.store(needed, Ordering::Release);
    }
}

/// Arena backing one run: the caller's, or an internal one owned by the run
/// and released when this value drops.
pub enum RunArena<'a> {
    External(AllocatorHandle<'a>),
    Internal(ScratchArena),
}

impl<'a> RunArena<'a> {
    pub(crate) fn for_run(handle: Option<AllocatorHandle<'a>>) -> Self {
        match handle {
            Some(handle) => RunArena::External(handle),
            None => {
                debug!("No external allocator, creating run-local arena");
                RunArena::Internal(ScratchArena::default())
            }
        }
    }

    pub fn arena(&self) -> &dyn MemoryArena {
        match self {
            RunArena::External(handle) => handle.arena(),
            RunArena::Internal(scratch) => scratch,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, RunArena::Internal(_))
    }
}

impl Drop for RunArena<'_> {
    fn drop(&mut self) {
        if let RunArena::Internal(scratch) = self {
            debug!(
                "Releasing run-local arena ({} bytes resident)",
                scratch.bytes_resident()
            );
        }
    }
}
