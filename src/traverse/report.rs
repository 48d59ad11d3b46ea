//! Run report with per-course summaries.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capture::CaptureOutcome;
use crate::merge::MergeOutcome;
use crate::model::{CourseRef, RunState};

/// How a run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The resume course was found and processing finished.
    Completed,
    /// No course title contained the resume fragment; nothing was captured.
    NoCourseMatched,
}

/// What happened to one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CourseStatus {
    /// Before the resume point.
    Skipped,
    /// The lecture list could not be read or was empty.
    LecturesUnavailable { reason: String },
    /// Lectures were captured and merged.
    Processed,
}

/// Summary of one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    /// 1-based position in the course list
    pub index: usize,

    /// Course page URL
    pub url: String,

    /// Resolved title
    pub title: String,

    /// Course status
    #[serde(flatten)]
    pub status: CourseStatus,

    /// Number of lectures listed on the course page
    pub lectures_listed: usize,

    /// Lectures before the starting lecture
    pub lectures_skipped: usize,

    /// Lectures rendered in this run
    pub lectures_captured: usize,

    /// Lectures whose file already existed
    pub lectures_already_present: usize,

    /// Lectures that failed every attempt
    pub failed_lectures: Vec<String>,

    /// Merge result
    pub merge: Option<MergeOutcome>,

    /// Merged output path
    pub merged_path: Option<PathBuf>,
}

impl CourseSummary {
    /// Create an empty summary for `course`.
    pub fn new(course: &CourseRef, status: CourseStatus) -> Self {
        Self {
            index: course.index,
            url: course.url.clone(),
            title: course.title().unwrap_or_default().to_string(),
            status,
            lectures_listed: 0,
            lectures_skipped: 0,
            lectures_captured: 0,
            lectures_already_present: 0,
            failed_lectures: Vec::new(),
            merge: None,
            merged_path: None,
        }
    }

    /// Account for one capture attempt.
    pub fn record_capture(&mut self, url: &str, outcome: &CaptureOutcome) {
        match outcome {
            CaptureOutcome::AlreadyPresent => self.lectures_already_present += 1,
            CaptureOutcome::Saved { .. } => self.lectures_captured += 1,
            CaptureOutcome::Failed { .. } => self.failed_lectures.push(url.to_string()),
        }
    }
}

/// Totals over all courses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub courses_discovered: usize,
    pub courses_skipped: usize,
    pub courses_processed: usize,
    pub courses_without_lectures: usize,
    pub lectures_skipped: usize,
    pub lectures_captured: usize,
    pub lectures_already_present: usize,
    pub lectures_failed: usize,
    pub merges_written: usize,
    pub merges_empty: usize,
    pub merges_failed: usize,
}

/// Result of a traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// When the traversal started
    pub started_at: DateTime<Utc>,

    /// When the traversal finished
    pub finished_at: Option<DateTime<Utc>>,

    /// Resume fragment as entered
    pub resume_fragment: String,

    /// Starting lecture in the resume course
    pub start_lecture: usize,

    /// 1-based index of the course where the resume point was reached
    pub resume_reached_at: Option<usize>,

    /// Per-course summaries in enumeration order
    pub courses: Vec<CourseSummary>,

    /// Totals, filled in by [`RunReport::finish`]
    pub totals: RunTotals,
}

impl RunReport {
    /// Start a report.
    pub fn new(resume_fragment: impl Into<String>, start_lecture: usize) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            resume_fragment: resume_fragment.into(),
            start_lecture,
            resume_reached_at: None,
            courses: Vec::new(),
            totals: RunTotals::default(),
        }
    }

    /// Append a course summary.
    pub fn push(&mut self, summary: CourseSummary) {
        self.courses.push(summary);
    }

    /// Close the report and compute totals.
    pub fn finish(&mut self, run: RunState) {
        self.finished_at = Some(Utc::now());
        self.resume_reached_at = run.reached_at;

        let mut totals = RunTotals {
            courses_discovered: self.courses.len(),
            ..RunTotals::default()
        };
        for course in &self.courses {
            match course.status {
                CourseStatus::Skipped => totals.courses_skipped += 1,
                CourseStatus::LecturesUnavailable { .. } => totals.courses_without_lectures += 1,
                CourseStatus::Processed => totals.courses_processed += 1,
            }
            totals.lectures_skipped += course.lectures_skipped;
            totals.lectures_captured += course.lectures_captured;
            totals.lectures_already_present += course.lectures_already_present;
            totals.lectures_failed += course.failed_lectures.len();
            match course.merge {
                Some(MergeOutcome::Merged { .. }) => totals.merges_written += 1,
                Some(MergeOutcome::Empty) => totals.merges_empty += 1,
                Some(MergeOutcome::Failed { .. }) => totals.merges_failed += 1,
                None => {}
            }
        }
        self.totals = totals;
    }

    /// How the run ended.
    pub fn outcome(&self) -> RunOutcome {
        if self.resume_reached_at.is_some() {
            RunOutcome::Completed
        } else {
            RunOutcome::NoCourseMatched
        }
    }

    /// Serialize the report as pretty JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| crate::Error::Other(e.to_string()))
    }
}
