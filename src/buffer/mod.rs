//! Staged edits layered over the fetched resort list.
//!
//! Designed for integration into the TEA architecture: the buffer is plain
//! data owned by the `Model`, and every derived view is recomputed from it.

mod pending;
mod view;

pub use pending::{PendingChanges, PendingEntry, StagedFields};
pub use view::{effective_record, effective_view};
