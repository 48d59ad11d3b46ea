//! Observer hook for following a traversal as it runs.
//!
//! # Example
//!
//! ```
//! use lectsave::traverse::{TraversalEvent, TraversalObserver};
//!
//! #[derive(Default)]
//! struct CountFailures(usize);
//!
//! impl TraversalObserver for CountFailures {
//!     fn on_event(&mut self, event: &TraversalEvent) {
//!         if let TraversalEvent::LectureFinished { outcome, .. } = event {
//!             if !outcome.is_success() {
//!                 self.0 += 1;
//!             }
//!         }
//!     }
//! }
//! ```

use std::path::PathBuf;

use crate::capture::CaptureOutcome;
use crate::merge::MergeOutcome;

/// Something that happened during a traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalEvent {
    /// The course list was loaded.
    CoursesListed { total: usize },

    /// A course before the resume point was passed over.
    CourseSkipped { index: usize, title: String },

    /// Processing of a course begins.
    CourseStarted {
        index: usize,
        total: usize,
        title: String,
        first_lecture: usize,
    },

    /// A course after the resume course also contains the fragment.
    AmbiguousMatch {
        index: usize,
        title: String,
        resume_index: usize,
    },

    /// The lecture list could not be read; the course is skipped.
    LecturesUnavailable { index: usize, reason: String },

    /// The lecture list was read.
    LecturesListed { index: usize, count: usize },

    /// A lecture before the starting lecture was passed over.
    LectureSkipped { index: usize, position: usize },

    /// A lecture capture finished (successfully or not).
    LectureFinished {
        index: usize,
        position: usize,
        path: PathBuf,
        outcome: CaptureOutcome,
    },

    /// The course merge finished.
    CourseMerged {
        index: usize,
        path: PathBuf,
        outcome: MergeOutcome,
    },
}

/// Receives [`TraversalEvent`]s. The default implementation ignores them.
pub trait TraversalObserver {
    /// Called for every event, in order.
    fn on_event(&mut self, event: &TraversalEvent) {
        let _ = event;
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TraversalObserver for NoopObserver {}

/// Observer that records every event.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<TraversalEvent>,
}

impl TraversalObserver for EventLog {
    fn on_event(&mut self, event: &TraversalEvent) {
        self.events.push(event.clone());
    }
}
