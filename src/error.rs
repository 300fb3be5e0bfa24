use std::io;

use thiserror::Error;

/// Direction of a backing-store transfer, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Read,
    Write,
}

impl std::fmt::Display for StoreOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreOp::Read => write!(f, "read"),
            StoreOp::Write => write!(f, "write"),
        }
    }
}

#[derive(Debug, Error)]
pub enum VmError {
    /// The address does not fit the 16-bit space; rejected without touching
    /// any engine state.
    #[error("virtual address {0} does not fit the 16-bit address space")]
    AddressOutOfRange(u32),

    #[error("trace line {line}: unparsable entry {content:?}")]
    MalformedTraceLine { line: usize, content: String },

    #[error("backing store holds {len} bytes, need at least {expected}")]
    StoreTooSmall { len: u64, expected: u64 },

    /// Fatal: the fault path cannot make progress without the store.
    #[error("{op} of page {page} against the backing store failed")]
    StoreIo {
        page: usize,
        op: StoreOp,
        #[source]
        source: io::Error,
    },

    /// Eviction with zero valid page-table entries; unreachable once any
    /// page has faulted in.
    #[error("eviction requested while no page is resident")]
    NoEligibleVictim,

    #[error(transparent)]
    Io(#[from] io::Error),
}
