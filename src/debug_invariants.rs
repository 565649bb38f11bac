//! Opt-in structural self-checks.
//!
//! Connectivity consistency is verified after construction, compaction and
//! every committed edit. The checks are linear in the mesh size, so they run
//! only in debug builds or with the `check-invariants` feature.

use crate::mesh_error::MeshEditError;

/// Run a fallible check and panic with context when invariant checking is
/// enabled. Compiles to nothing otherwise.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}

/// Types that can verify their own structural invariants.
pub trait DebugInvariants {
    /// Validate invariants and return the first violation encountered.
    fn validate_invariants(&self) -> Result<(), MeshEditError>;

    /// Panic on the first violation, in debug builds or when
    /// `check-invariants` is enabled.
    fn debug_assert_invariants(&self) {
        debug_invariants!(self.validate_invariants(), "debug_assert_invariants");
    }
}
