pub mod context;
pub mod events;

pub use context::{
    parse_pull_request_context, parse_review_context, read_event, PullRequestContext,
    ReviewContext,
};
