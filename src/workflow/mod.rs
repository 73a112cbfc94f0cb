pub mod assign;
pub mod check;
pub mod types;

pub use assign::ReviewerAssigner;
pub use check::ApprovalChecker;
pub use types::{ApprovalState, WorkflowOutcome};
