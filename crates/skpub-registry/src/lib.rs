//! Plugin registry submission for skpub.
//!
//! Registers a plugin in the shared registry repository by forking it,
//! branching, appending an entry to the tracked `plugins.json` and opening
//! a pull request.

mod entry;
mod error;
mod index;
pub mod submitter;

pub use entry::{AuthorIdentity, PluginEntry, author_name, parse_author};
pub use error::{RegistryError, RegistryResult};
pub use index::RegistryIndex;
pub use submitter::{
    CommitIdentity, DEFAULT_PR_BODY, Fork, PluginSubmission, PullRequest, RegistrySettings,
    RegistrySubmitter, SubmissionOutcome,
};
