//! Reading the learning portal through a [`PageDriver`].
//!
//! Each method performs one top-level step of a run: log in, list the
//! enrolled courses, open a course and read its title, list the
//! lectures on the open course page.

mod config;

pub use config::{Credentials, PortalConfig, Selectors, Timeouts, DEFAULT_BASE_URL};

use crate::browser::{Extract, PageDriver};
use crate::error::{Error, Result};
use crate::model::{CourseRef, LectureRef};

/// Portal operations bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct Portal {
    config: PortalConfig,
}

impl Portal {
    /// Create a portal reader.
    pub fn new(config: PortalConfig) -> Self {
        Self { config }
    }

    /// Portal configuration.
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Submit the login form and wait for the landing page.
    ///
    /// Any failure is reported as [`Error::Authentication`].
    pub fn login<D: PageDriver>(&self, driver: &mut D, credentials: &Credentials) -> Result<()> {
        let cfg = &self.config;
        let result = (|| -> Result<()> {
            driver.navigate(&cfg.login_url(), cfg.timeouts.navigation)?;
            driver.fill(&cfg.selectors.username, &credentials.username)?;
            driver.fill(&cfg.selectors.password, &credentials.password)?;
            driver.click(&cfg.selectors.submit)?;
            driver.wait_for_url(&cfg.landing_url(), cfg.timeouts.login)
        })();

        match result {
            Ok(()) => {
                log::info!("Logged in as {}", credentials.username);
                Ok(())
            }
            Err(Error::Timeout(..)) => Err(Error::Authentication(
                "timed out during login, check the connection and credentials".to_string(),
            )),
            Err(e) => Err(Error::Authentication(e.to_string())),
        }
    }

    /// List enrolled courses in page order, without duplicates.
    ///
    /// An unreachable or empty course list is [`Error::NoCourses`].
    pub fn list_courses<D: PageDriver>(&self, driver: &mut D) -> Result<Vec<CourseRef>> {
        let cfg = &self.config;
        let links = (|| -> Result<Vec<String>> {
            driver.navigate(&cfg.courses_url(), cfg.timeouts.navigation)?;
            driver.wait_for_element(&cfg.selectors.course_link, cfg.timeouts.element)?;
            driver.extract(&cfg.selectors.course_link, &Extract::href())
        })()
        .map_err(|e| Error::NoCourses(format!("could not load the course list: {}", e)))?;

        let mut seen = std::collections::HashSet::new();
        let courses: Vec<CourseRef> = links
            .into_iter()
            .filter(|url| !url.is_empty() && seen.insert(url.clone()))
            .enumerate()
            .map(|(i, url)| CourseRef::new(url, i + 1))
            .collect();

        if courses.is_empty() {
            return Err(Error::NoCourses("the course list is empty".to_string()));
        }
        log::debug!("Found {} courses", courses.len());
        Ok(courses)
    }

    /// Navigate to a course page.
    pub fn open_course<D: PageDriver>(&self, driver: &mut D, course: &CourseRef) -> Result<()> {
        driver.navigate(&course.url, self.config.timeouts.navigation)
    }

    /// Read the title of the open course page into `course`.
    ///
    /// Falls back to `course_{index}` when the title cannot be read.
    pub fn resolve_title<'c, D: PageDriver>(
        &self,
        driver: &mut D,
        course: &'c mut CourseRef,
    ) -> &'c str {
        match self.read_title(driver) {
            Ok(title) => course.resolve_title(title),
            Err(e) => {
                log::warn!(
                    "Could not read the title of course {} ({}): {}",
                    course.index,
                    course.url,
                    e
                );
                course.resolve_fallback()
            }
        }
    }

    fn read_title<D: PageDriver>(&self, driver: &mut D) -> Result<String> {
        let cfg = &self.config;
        driver.wait_for_element(&cfg.selectors.course_title, cfg.timeouts.element)?;
        driver
            .extract(&cfg.selectors.course_title, &Extract::Text)?
            .into_iter()
            .map(|t| t.trim().to_string())
            .find(|t| !t.is_empty())
            .ok_or_else(|| Error::Other("course title is empty".to_string()))
    }

    /// List the lectures on the open course page, numbered from 1.
    pub fn list_lectures<D: PageDriver>(&self, driver: &mut D) -> Result<Vec<LectureRef>> {
        let cfg = &self.config;
        driver.wait_for_element(&cfg.selectors.lecture_link, cfg.timeouts.element)?;
        let links = driver.extract(&cfg.selectors.lecture_link, &Extract::href())?;
        Ok(LectureRef::enumerate(
            links.into_iter().filter(|url| !url.is_empty()),
        ))
    }
}
