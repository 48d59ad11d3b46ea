//! Portal configuration: URLs, selectors, timeouts and credentials.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default portal address.
pub const DEFAULT_BASE_URL: &str = "https://on.mmamos.ru";

/// CSS selectors used to read the portal.
///
/// The traversal treats them as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    /// Login form user name input
    pub username: String,
    /// Login form password input
    pub password: String,
    /// Login form submit button
    pub submit: String,
    /// Links to course pages on the course list
    pub course_link: String,
    /// Links to lecture pages on a course page
    pub lecture_link: String,
    /// Course title on a course page
    pub course_title: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            username: r#"input[name="username"]"#.to_string(),
            password: r#"input[name="password"]"#.to_string(),
            submit: "input#loginbtn".to_string(),
            course_link: r#"a[href*="course/view.php?id="]"#.to_string(),
            lecture_link: "li.activity.modtype_page a.aalink".to_string(),
            course_title: "h1.headermain".to_string(),
        }
    }
}

/// Timeouts for blocking browser operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Navigation to portal pages (login, course list, course pages).
    /// Lecture pages use `CaptureOptions::navigation_timeout`.
    pub navigation: Duration,
    /// Waiting for an element to appear
    pub element: Duration,
    /// Waiting for the redirect after submitting the login form
    pub login: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(60),
            element: Duration::from_secs(10),
            login: Duration::from_secs(60),
        }
    }
}

/// Login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name or e-mail
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Where the portal lives and how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Portal root, without trailing slash
    pub base_url: String,

    /// Login page path
    pub login_path: String,

    /// "My courses" page path
    pub courses_path: String,

    /// URL the portal redirects to after a successful login
    /// (`{base_url}/` when `None`)
    pub landing_url: Option<String>,

    /// CSS selectors
    pub selectors: Selectors,

    /// Operation timeouts
    pub timeouts: Timeouts,
}

impl PortalConfig {
    /// Create a configuration for the default portal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the portal root URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the URL expected after login.
    pub fn with_landing_url(mut self, url: impl Into<String>) -> Self {
        self.landing_url = Some(url.into());
        self
    }

    /// Replace the selectors.
    pub fn with_selectors(mut self, selectors: Selectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// Replace the timeouts.
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Login page URL.
    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url, self.login_path)
    }

    /// Course list URL.
    pub fn courses_url(&self) -> String {
        format!("{}{}", self.base_url, self.courses_path)
    }

    /// URL that proves a successful login.
    pub fn landing_url(&self) -> String {
        self.landing_url
            .clone()
            .unwrap_or_else(|| format!("{}/", self.base_url))
    }

    /// Check the configuration before a run.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(Error::Config(format!(
                "base URL must start with http:// or https://: {}",
                self.base_url
            )));
        }
        if self.timeouts.navigation.is_zero() || self.timeouts.element.is_zero() {
            return Err(Error::Config("timeouts must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_path: "/login/index.php".to_string(),
            courses_path: "/my/courses.php".to_string(),
            landing_url: None,
            selectors: Selectors::default(),
            timeouts: Timeouts::default(),
        }
    }
}
