//! The traversal driver.

use std::path::PathBuf;

use crate::browser::PageDriver;
use crate::capture::{capture, CaptureOptions};
use crate::error::Result;
use crate::layout::OutputLayout;
use crate::merge::merge;
use crate::model::{CourseRef, ResumeSpec};
use crate::normalize::TitleNormalizer;
use crate::portal::{Credentials, Portal};
use crate::resume::{CourseDecision, LectureDecision, ResumeMatcher};

use super::observer::{NoopObserver, TraversalEvent, TraversalObserver};
use super::report::{CourseStatus, CourseSummary, RunReport};

/// Options for a harvesting run.
#[derive(Debug, Clone, Default)]
pub struct HarvestOptions {
    /// Where lecture and merged files go
    pub layout: OutputLayout,

    /// Capture retry and rendering options
    pub capture: CaptureOptions,

    /// Title normalizer used for resume matching
    pub normalizer: TitleNormalizer,
}

impl HarvestOptions {
    /// Create new harvest options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.layout = OutputLayout::new(dir);
        self
    }

    /// Set the capture options.
    pub fn with_capture(mut self, capture: CaptureOptions) -> Self {
        self.capture = capture;
        self
    }

    /// Set the title normalizer.
    pub fn with_normalizer(mut self, normalizer: TitleNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }
}

/// Run context: owns the single browser page and the output layout.
///
/// # Example
///
/// ```no_run
/// # #[cfg(feature = "chrome")]
/// # fn main() -> lectsave::Result<()> {
/// use lectsave::browser::{ChromeDriver, ChromeOptions};
/// use lectsave::{Credentials, HarvestOptions, Harvester, Portal, PortalConfig, ResumeSpec};
///
/// let driver = ChromeDriver::launch(&ChromeOptions::default())?;
/// let mut harvester = Harvester::new(
///     driver,
///     Portal::new(PortalConfig::default()),
///     HarvestOptions::new().with_output_dir("pdf"),
/// );
/// harvester.login(&Credentials::new("student", "secret"))?;
/// let report = harvester.run(&ResumeSpec::new("Информатика", 6)?)?;
/// println!("{} lectures captured", report.totals.lectures_captured);
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "chrome"))]
/// # fn main() {}
/// ```
pub struct Harvester<D: PageDriver> {
    driver: D,
    portal: Portal,
    options: HarvestOptions,
}

impl<D: PageDriver> Harvester<D> {
    /// Create a harvester.
    pub fn new(driver: D, portal: Portal, options: HarvestOptions) -> Self {
        Self {
            driver,
            portal,
            options,
        }
    }

    /// Harvest options.
    pub fn options(&self) -> &HarvestOptions {
        &self.options
    }

    /// Give back the driver.
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Log into the portal. Failure is fatal for the run.
    pub fn login(&mut self, credentials: &Credentials) -> Result<()> {
        self.portal.login(&mut self.driver, credentials)
    }

    /// Walk all courses starting at the resume point.
    pub fn run(&mut self, resume: &ResumeSpec) -> Result<RunReport> {
        self.run_with_observer(resume, &mut NoopObserver)
    }

    /// Walk all courses, reporting progress to `observer`.
    ///
    /// Returns an error only when the output directory cannot be created
    /// or the course list is unavailable. A fragment that matches no course
    /// is a normal return with [`RunOutcome::NoCourseMatched`].
    ///
    /// [`RunOutcome::NoCourseMatched`]: super::RunOutcome::NoCourseMatched
    pub fn run_with_observer(
        &mut self,
        resume: &ResumeSpec,
        observer: &mut dyn TraversalObserver,
    ) -> Result<RunReport> {
        self.options.layout.ensure_dir()?;

        let mut courses = self.portal.list_courses(&mut self.driver)?;
        let total = courses.len();
        observer.on_event(&TraversalEvent::CoursesListed { total });

        let mut matcher = ResumeMatcher::new(resume, self.options.normalizer.clone());
        let mut report = RunReport::new(resume.fragment(), resume.start_lecture());

        for course in courses.iter_mut() {
            let opened = match self.portal.open_course(&mut self.driver, course) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Could not open course {} ({}): {}", course.index, course.url, e);
                    false
                }
            };
            let title = if opened {
                self.portal.resolve_title(&mut self.driver, course).to_string()
            } else {
                course.resolve_fallback().to_string()
            };

            let decision = matcher.observe(course.index, &title);
            match decision {
                CourseDecision::Skip => {
                    log::debug!("Course {}/{}: {} (before resume point)", course.index, total, title);
                    report.push(CourseSummary::new(course, CourseStatus::Skipped));
                    observer.on_event(&TraversalEvent::CourseSkipped {
                        index: course.index,
                        title,
                    });
                    continue;
                }
                CourseDecision::Full if matcher.title_matches(&title) => {
                    let resume_index = matcher.run_state().reached_at.unwrap_or_default();
                    log::warn!(
                        "Course {} '{}' also matches '{}'; resuming from course {}",
                        course.index,
                        title,
                        resume.fragment(),
                        resume_index
                    );
                    observer.on_event(&TraversalEvent::AmbiguousMatch {
                        index: course.index,
                        title: title.clone(),
                        resume_index,
                    });
                }
                _ => {}
            }

            log::info!("Course {}/{}: {}", course.index, total, title);
            let summary = self.process_course(course, &title, decision, opened, total, observer);
            report.push(summary);
        }

        let run = matcher.finish();
        if !run.reached {
            log::warn!(
                "No course matches '{}'; nothing was downloaded",
                resume.fragment()
            );
        }
        report.finish(run);
        Ok(report)
    }

    fn process_course(
        &mut self,
        course: &CourseRef,
        title: &str,
        decision: CourseDecision,
        opened: bool,
        total: usize,
        observer: &mut dyn TraversalObserver,
    ) -> CourseSummary {
        let first_lecture = decision.first_lecture().unwrap_or(1);
        observer.on_event(&TraversalEvent::CourseStarted {
            index: course.index,
            total,
            title: title.to_string(),
            first_lecture,
        });

        let listed = if opened {
            self.portal.list_lectures(&mut self.driver)
        } else {
            self.portal
                .open_course(&mut self.driver, course)
                .and_then(|()| self.portal.list_lectures(&mut self.driver))
        };
        let lectures = match listed {
            Ok(lectures) if !lectures.is_empty() => lectures,
            Ok(_) => return self.unavailable(course, "no lectures found".to_string(), observer),
            Err(e) => return self.unavailable(course, e.to_string(), observer),
        };

        observer.on_event(&TraversalEvent::LecturesListed {
            index: course.index,
            count: lectures.len(),
        });

        let mut summary = CourseSummary::new(course, CourseStatus::Processed);
        summary.lectures_listed = lectures.len();
        let mut merge_inputs = Vec::new();

        for lecture in &lectures {
            if decision.lecture(lecture.position) == LectureDecision::SkipBeforeStart {
                log::info!(
                    "Skipping lecture {} of '{}' (starting at lecture {})",
                    lecture.position,
                    title,
                    first_lecture
                );
                summary.lectures_skipped += 1;
                observer.on_event(&TraversalEvent::LectureSkipped {
                    index: course.index,
                    position: lecture.position,
                });
                continue;
            }

            let path = self.options.layout.lecture_path(title, lecture.position);
            let outcome = capture(&mut self.driver, &lecture.url, &path, &self.options.capture);
            summary.record_capture(&lecture.url, &outcome);
            if outcome.is_success() {
                merge_inputs.push(path.clone());
            }
            observer.on_event(&TraversalEvent::LectureFinished {
                index: course.index,
                position: lecture.position,
                path,
                outcome,
            });
        }

        let merged_path = self.options.layout.merged_path(title);
        let outcome = merge(&merge_inputs, &merged_path);
        observer.on_event(&TraversalEvent::CourseMerged {
            index: course.index,
            path: merged_path.clone(),
            outcome: outcome.clone(),
        });
        summary.merge = Some(outcome);
        summary.merged_path = Some(merged_path);
        summary
    }

    fn unavailable(
        &self,
        course: &CourseRef,
        reason: String,
        observer: &mut dyn TraversalObserver,
    ) -> CourseSummary {
        log::warn!(
            "No lectures for course '{}' ({}): {}. Skipping.",
            course.title().unwrap_or_default(),
            course.url,
            reason
        );
        observer.on_event(&TraversalEvent::LecturesUnavailable {
            index: course.index,
            reason: reason.clone(),
        });
        CourseSummary::new(course, CourseStatus::LecturesUnavailable { reason })
    }
}
