//! Spelling and grammar checking pipeline.
//!
//! Requests flow from [`CheckEngine`] through the single-flight [`RequestQueue`] to a
//! [`CheckBackend`]; replies come back through a [`CheckReply`] and are applied as
//! markers in a [`lectern_markers::MarkerStore`].

pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod queue;
pub mod request;
pub mod scheduler;

pub use backend::{CheckBackend, CheckOutcome, CheckReply, CheckResult, Decoration, GrammarCheck, GrammarDetail};
pub use config::CheckerConfig;
pub use engine::CheckEngine;
pub use error::ConfigError;
pub use host::{Caret, DocumentHost};
pub use queue::{FinishedCheck, RequestQueue};
pub use request::{CheckMode, CheckTypes, PriorMarker, Request, RequestScope, RequestState, SequenceNumber};
pub use scheduler::{DeferredTask, Scheduler};
