use crate::constants::*;
use crate::error::VmError;
use crate::memory::{FrameAllocator, PagingStore};
use crate::translation::{AccessKind, PageTable, Tlb, VirtualAddress};

/// Which path served a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    TlbHit,
    TableHit,
    Fault { wrote_back: bool },
}

/// One translated reference, as the report records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub virtual_address: u32,
    pub physical_address: u32,
    pub value: i8,
    pub outcome: AccessOutcome,
}

/// Counters accumulated over one replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub total: u64,
    pub tlb_hits: u64,
    pub table_hits: u64,
    pub page_faults: u64,
    pub write_backs: u64,
}

impl RunStats {
    fn rate(&self, count: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64
        }
    }

    pub fn tlb_hit_rate(&self) -> f64 {
        self.rate(self.tlb_hits)
    }

    pub fn page_fault_rate(&self) -> f64 {
        self.rate(self.page_faults)
    }

    pub fn write_back_rate(&self) -> f64 {
        self.rate(self.write_backs)
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "TLB hits: {} ({:.4}%)", self.tlb_hits, self.tlb_hit_rate() * 100.0)?;
        writeln!(
            f,
            "Page faults: {} ({:.4}%)",
            self.page_faults,
            self.page_fault_rate() * 100.0
        )?;
        writeln!(
            f,
            "Write-backs: {} ({:.4}%)",
            self.write_backs,
            self.write_back_rate() * 100.0
        )?;
        write!(f, "Addresses processed: {}", self.total)
    }
}

/// Drives one reference end to end: decode, TLB probe, page-table probe,
/// fault service, cache refill.
///
/// Owns every piece of translation state for the lifetime of one replay;
/// the logical clock advances exactly once per accepted address.
pub struct TranslationEngine {
    tlb: Tlb,
    table: PageTable,
    frames: FrameAllocator,
    store: PagingStore,
    clock: u64,
    stats: RunStats,
}

impl TranslationEngine {
    pub fn new(store: PagingStore) -> Self {
        TranslationEngine {
            tlb: Tlb::new(),
            table: PageTable::new(),
            frames: FrameAllocator::new(),
            store,
            clock: 0,
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn page_table(&self) -> &PageTable {
        &self.table
    }

    pub fn translate(&mut self, address: u32, kind: AccessKind) -> Result<Translation, VmError> {
        // Reject before the clock moves so a bad address leaves no trace.
        let va = VirtualAddress::decode(address)?;
        self.clock += 1;
        self.stats.total += 1;

        let (frame, outcome) = if let Some(frame) = self.tlb.lookup(va.page, self.clock) {
            self.table.touch(va.page, self.clock);
            self.stats.tlb_hits += 1;
            (frame, AccessOutcome::TlbHit)
        } else if let Some(frame) = self.table.lookup(va.page) {
            // Resident but fell out of the TLB: promote it back in.
            self.table.touch(va.page, self.clock);
            self.stats.table_hits += 1;
            self.cache_mapping(va.page, frame);
            (frame, AccessOutcome::TableHit)
        } else {
            let resolution =
                self.frames
                    .resolve_fault(va.page, kind, self.clock, &mut self.table, &mut self.store)?;
            self.stats.page_faults += 1;
            if resolution.wrote_back {
                self.stats.write_backs += 1;
            }
            self.cache_mapping(va.page, resolution.frame);
            (
                resolution.frame,
                AccessOutcome::Fault {
                    wrote_back: resolution.wrote_back,
                },
            )
        };

        if kind == AccessKind::Write {
            self.frames.mark_dirty(frame);
        }

        let physical_address = frame * FRAME_SIZE + va.offset;
        Ok(Translation {
            virtual_address: va.raw,
            physical_address: physical_address as u32,
            value: self.frames.read(physical_address),
            outcome,
        })
    }

    fn cache_mapping(&mut self, page: usize, frame: usize) {
        self.tlb.insert(page, frame, self.clock);
        self.tlb.advance_victim();
    }
}
