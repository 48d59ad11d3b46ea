//! Deciding where a run starts.
//!
//! The matcher is fed course title keys in enumeration order. Until a key
//! contains the resume fragment, courses are skipped. The first course that
//! matches starts the scan: it captures from the requested lecture, and
//! every later course captures from lecture 1. The match is never
//! re-evaluated.

use crate::model::{ResumeSpec, RunState};
use crate::normalize::TitleNormalizer;

/// Scan state over the course list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// The resume course has not been seen yet.
    #[default]
    NotYetScanning,
    /// Every course from the resume course on is processed.
    Scanning,
    /// The course list is exhausted.
    Done,
}

/// What to do with one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseDecision {
    /// Before the resume point: do not enumerate lectures.
    Skip,
    /// The resume course: capture from `first_lecture`.
    Start { first_lecture: usize },
    /// After the resume course: capture every lecture.
    Full,
}

impl CourseDecision {
    /// Whether lectures of this course are enumerated at all.
    pub fn is_processed(&self) -> bool {
        !matches!(self, CourseDecision::Skip)
    }

    /// First lecture position to capture.
    pub fn first_lecture(&self) -> Option<usize> {
        match self {
            CourseDecision::Skip => None,
            CourseDecision::Start { first_lecture } => Some(*first_lecture),
            CourseDecision::Full => Some(1),
        }
    }

    /// What to do with the lecture at `position` in this course.
    pub fn lecture(&self, position: usize) -> LectureDecision {
        match self.first_lecture() {
            Some(first) if position >= first => LectureDecision::Capture,
            _ => LectureDecision::SkipBeforeStart,
        }
    }
}

/// What to do with one lecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LectureDecision {
    /// Before the requested starting lecture.
    SkipBeforeStart,
    /// Capture it.
    Capture,
}

/// Matches course titles against a [`ResumeSpec`].
#[derive(Debug, Clone)]
pub struct ResumeMatcher {
    normalizer: TitleNormalizer,
    fragment_key: String,
    start_lecture: usize,
    state: ScanState,
    run: RunState,
}

impl ResumeMatcher {
    /// Create a matcher for `spec` using `normalizer` for both sides.
    pub fn new(spec: &ResumeSpec, normalizer: TitleNormalizer) -> Self {
        let fragment_key = normalizer.normalize(spec.fragment());
        Self {
            normalizer,
            fragment_key,
            start_lecture: spec.start_lecture(),
            state: ScanState::NotYetScanning,
            run: RunState::default(),
        }
    }

    /// Normalized resume fragment.
    pub fn fragment_key(&self) -> &str {
        &self.fragment_key
    }

    /// Current scan state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Run state (whether and where the resume point was reached).
    pub fn run_state(&self) -> RunState {
        self.run
    }

    /// Whether `title` contains the resume fragment after normalization.
    pub fn title_matches(&self, title: &str) -> bool {
        self.normalizer.normalize(title).contains(&self.fragment_key)
    }

    /// Decide what to do with the course at `course_index` titled `title`.
    ///
    /// Must be called once per course, in enumeration order.
    pub fn observe(&mut self, course_index: usize, title: &str) -> CourseDecision {
        match self.state {
            ScanState::NotYetScanning => {
                if self.title_matches(title) {
                    self.state = ScanState::Scanning;
                    self.run.reach(course_index);
                    CourseDecision::Start {
                        first_lecture: self.start_lecture,
                    }
                } else {
                    CourseDecision::Skip
                }
            }
            ScanState::Scanning => CourseDecision::Full,
            ScanState::Done => CourseDecision::Skip,
        }
    }

    /// Mark the course list as exhausted.
    pub fn finish(&mut self) -> RunState {
        self.state = ScanState::Done;
        self.run
    }
}
