pub mod constants;
pub mod engine;
pub mod error;
pub mod io;
pub mod memory;
pub mod translation;

// Re-export commonly used items for convenience
pub use constants::*;
pub use engine::{AccessOutcome, RunStats, Translation, TranslationEngine};
pub use error::{StoreOp, VmError};
pub use memory::{FrameAllocator, PagingStore, PhysicalMemory};
pub use translation::{AccessKind, PageTable, Tlb, VirtualAddress};
