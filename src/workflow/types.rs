/// Outcome of a successful workflow execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// Every required reviewer is now requested on the pull request.
    ReviewersAssigned { reviewers: Vec<String> },
    /// Every required reviewer approved and the approvals still hold.
    Approved { internal: bool },
}

/// Where a pull request stands while its approvals are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    /// Some required reviewer is missing or has not approved.
    Incomplete,
    /// All approvals are in and the author is an internal contributor.
    InternalComplete,
    /// All approvals are in, but the author is external and commits must be checked.
    ExternalPendingValidation,
    /// Approvals were given on the current head commit.
    Complete,
    /// Approvals were given on an older commit and have been revoked.
    Invalidated,
}
