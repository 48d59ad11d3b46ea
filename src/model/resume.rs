//! Resume point supplied by the user and the transient run state.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Where a run starts capturing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeSpec {
    fragment: String,
    start_lecture: usize,
}

impl ResumeSpec {
    /// Create a resume point from a course-name fragment and a 1-based
    /// lecture number.
    pub fn new(fragment: impl Into<String>, start_lecture: usize) -> Result<Self> {
        if start_lecture == 0 {
            return Err(Error::InvalidResume(
                "lecture numbers start at 1".to_string(),
            ));
        }
        Ok(Self {
            fragment: fragment.into().trim().to_string(),
            start_lecture,
        })
    }

    /// Start with the first lecture of the first course.
    pub fn from_start() -> Self {
        Self {
            fragment: String::new(),
            start_lecture: 1,
        }
    }

    /// Parse the lecture number as typed by the user.
    pub fn parse(fragment: impl Into<String>, start_lecture: &str) -> Result<Self> {
        let trimmed = start_lecture.trim();
        let number = trimmed.parse::<usize>().map_err(|_| {
            Error::InvalidResume(format!("'{}' is not a lecture number", trimmed))
        })?;
        Self::new(fragment, number)
    }

    /// Course-name fragment as entered.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// First lecture to capture in the matched course.
    pub fn start_lecture(&self) -> usize {
        self.start_lecture
    }
}

impl Default for ResumeSpec {
    fn default() -> Self {
        Self::from_start()
    }
}

/// In-memory state of one traversal. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunState {
    /// Whether the resume course has been reached
    pub reached: bool,

    /// 1-based index of the course where it was reached
    pub reached_at: Option<usize>,
}

impl RunState {
    /// Mark the resume point as reached at `course_index`.
    pub fn reach(&mut self, course_index: usize) {
        if !self.reached {
            self.reached = true;
            self.reached_at = Some(course_index);
        }
    }
}
