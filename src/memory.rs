use std::fs::File;
use std::io::{self, prelude::*, SeekFrom};
use std::path::Path;

use crate::constants::*;
use crate::error::{StoreOp, VmError};
use crate::translation::{AccessKind, PageTable};

/// Fixed pool of 128 byte-addressable frames.
pub struct PhysicalMemory {
    data: Box<[u8; PM_SIZE]>,
}

impl PhysicalMemory {
    /// Create a new physical memory initialized to all zeros
    pub fn new() -> Self {
        // Use vec! to allocate on heap, then convert to boxed array
        let data = vec![0u8; PM_SIZE].into_boxed_slice();
        let data: Box<[u8; PM_SIZE]> = data.try_into().unwrap();
        PhysicalMemory { data }
    }

    /// Signed byte at a physical address, as the report records it.
    #[inline]
    pub fn read(&self, address: usize) -> i8 {
        self.data[address] as i8
    }

    #[inline]
    pub fn frame(&self, frame: usize) -> &[u8] {
        &self.data[frame * FRAME_SIZE..(frame + 1) * FRAME_SIZE]
    }

    #[inline]
    pub fn frame_mut(&mut self, frame: usize) -> &mut [u8] {
        &mut self.data[frame * FRAME_SIZE..(frame + 1) * FRAME_SIZE]
    }
}

impl Default for PhysicalMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// Random-access view of the backing store: 256 pages of 256 bytes, page
/// `p` occupying byte range `[p*256, p*256+256)`.
pub struct PagingStore {
    file: File,
}

impl PagingStore {
    /// Open an existing store image for page-in reads and write-back.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VmError> {
        let file = File::options().read(true).write(true).open(path)?;
        Self::from_file(file)
    }

    /// Wrap an already-open store file, checking it covers every page.
    pub fn from_file(file: File) -> Result<Self, VmError> {
        let len = file.metadata()?.len();
        if len < STORE_SIZE as u64 {
            return Err(VmError::StoreTooSmall {
                len,
                expected: STORE_SIZE as u64,
            });
        }
        Ok(PagingStore { file })
    }

    pub fn read_page(&mut self, page: usize) -> Result<[u8; PAGE_SIZE], VmError> {
        let mut buf = [0u8; PAGE_SIZE];
        self.seek_to(page, StoreOp::Read)?;
        self.file
            .read_exact(&mut buf)
            .map_err(|source| VmError::StoreIo {
                page,
                op: StoreOp::Read,
                source,
            })?;
        Ok(buf)
    }

    pub fn write_page(&mut self, page: usize, bytes: &[u8]) -> Result<(), VmError> {
        self.seek_to(page, StoreOp::Write)?;
        self.file
            .write_all(bytes)
            .map_err(|source| VmError::StoreIo {
                page,
                op: StoreOp::Write,
                source,
            })
    }

    fn seek_to(&mut self, page: usize, op: StoreOp) -> Result<(), VmError> {
        if page >= PAGE_TABLE_SIZE {
            let source = io::Error::new(io::ErrorKind::InvalidInput, "page lies beyond the store");
            return Err(VmError::StoreIo { page, op, source });
        }
        self.file
            .seek(SeekFrom::Start((page * PAGE_SIZE) as u64))
            .map_err(|source| VmError::StoreIo { page, op, source })?;
        Ok(())
    }
}

/// Outcome of one resolved page fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultResolution {
    pub frame: usize,
    pub wrote_back: bool,
}

/// Owns the frame pool and services page faults against the backing store.
///
/// Frames are handed out in address order until the pool runs dry; after
/// that the allocator reclaims frames from LRU victims only. The switch is
/// one-way and never reverts.
pub struct FrameAllocator {
    pool: PhysicalMemory,
    dirty: [bool; NUM_FRAMES],
    next_free: usize,
    full: bool,
}

impl FrameAllocator {
    pub fn new() -> Self {
        FrameAllocator {
            pool: PhysicalMemory::new(),
            dirty: [false; NUM_FRAMES],
            next_free: 0,
            full: false,
        }
    }

    #[inline]
    pub fn read(&self, address: usize) -> i8 {
        self.pool.read(address)
    }

    /// Record that a frame diverged from its copy in the store.
    pub fn mark_dirty(&mut self, frame: usize) {
        self.dirty[frame] = true;
    }

    /// Bring `page` into a frame, evicting (and writing back) as needed.
    ///
    /// Store failures are fatal to the run; the caller has no recovery
    /// path.
    pub fn resolve_fault(
        &mut self,
        page: usize,
        kind: AccessKind,
        clock: u64,
        table: &mut PageTable,
        store: &mut PagingStore,
    ) -> Result<FaultResolution, VmError> {
        let (frame, wrote_back) = if !self.full {
            let frame = self.next_free;
            self.next_free += 1;
            if self.next_free == NUM_FRAMES {
                self.full = true;
            }
            (frame, false)
        } else {
            let victim = table.choose_victim().ok_or(VmError::NoEligibleVictim)?;
            let frame = table.lookup(victim).ok_or(VmError::NoEligibleVictim)?;
            let mut wrote_back = false;
            if self.dirty[frame] {
                // Synchronize the outgoing page before its frame is reused.
                store.write_page(victim, self.pool.frame(frame))?;
                log::debug!("wrote dirty page {victim} in frame {frame} back to the store");
                wrote_back = true;
            }
            table.mark_evicted(victim);
            (frame, wrote_back)
        };

        let bytes = store.read_page(page)?;
        self.pool.frame_mut(frame).copy_from_slice(&bytes);
        // A reclaimed frame must not inherit the previous occupant's bit.
        self.dirty[frame] = kind == AccessKind::Write;
        table.mark_resident(page, frame, clock);
        log::debug!("page {page} faulted into frame {frame}");

        Ok(FaultResolution { frame, wrote_back })
    }
}

impl Default for FrameAllocator {
    fn default() -> Self {
        Self::new()
    }
}
