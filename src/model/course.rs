//! Course and lecture references discovered during traversal.

use serde::{Deserialize, Serialize};

use crate::normalize::sanitize_file_stem;

/// A course found on the portal's course list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
    /// Course detail-page URL
    pub url: String,

    /// 1-based position in the course list
    pub index: usize,

    /// Display title, known once the course page has been visited
    title: Option<String>,
}

impl CourseRef {
    /// Create a course reference with an unresolved title.
    pub fn new(url: impl Into<String>, index: usize) -> Self {
        Self {
            url: url.into(),
            index,
            title: None,
        }
    }

    /// Record the title read from the course page.
    ///
    /// The first resolved title wins; later calls are ignored.
    pub fn resolve_title(&mut self, title: impl Into<String>) -> &str {
        self.title.get_or_insert_with(|| title.into())
    }

    /// Record the fallback title used when the page had none.
    pub fn resolve_fallback(&mut self) -> &str {
        let fallback = format!("course_{}", self.index);
        self.resolve_title(fallback)
    }

    /// Resolved title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// File stem derived from the resolved title.
    pub fn file_stem(&self) -> String {
        match &self.title {
            Some(title) => sanitize_file_stem(title),
            None => format!("course_{}", self.index),
        }
    }
}

/// A lecture page inside a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureRef {
    /// Lecture page URL
    pub url: String,

    /// 1-based position in the course's lecture list
    pub position: usize,
}

impl LectureRef {
    /// Create a lecture reference.
    pub fn new(url: impl Into<String>, position: usize) -> Self {
        Self {
            url: url.into(),
            position,
        }
    }

    /// Number a list of lecture URLs from 1 in the given order.
    pub fn enumerate<I, S>(urls: I) -> Vec<LectureRef>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter()
            .enumerate()
            .map(|(i, url)| LectureRef::new(url, i + 1))
            .collect()
    }
}
