//! Scripted in-memory portal used by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lectsave::error::{Error, Result};
use lectsave::{Extract, PageDriver, PdfOptions, PortalConfig, Selectors};
use lopdf::{dictionary, Document, Object};

pub const BASE_URL: &str = "https://portal.test";

/// A driver call, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Navigate(String),
    WaitForElement(String),
    Extract(String),
    Fill(String, String),
    Click(String),
    WaitForUrl(String),
    Pause(Duration),
    Render(PathBuf),
}

/// Content of one scripted page.
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub title: Option<String>,
    pub course_links: Vec<String>,
    pub lecture_links: Vec<String>,
}

/// A `PageDriver` that serves scripted pages.
pub struct MockDriver {
    selectors: Selectors,
    pages: HashMap<String, MockPage>,
    current: Option<String>,
    accept_login: bool,
    password: String,
    typed_password: Option<String>,
    unreachable: HashSet<String>,
    /// Remaining render failures per URL
    render_failures: HashMap<String, u32>,
    /// URLs that render to an HTML error page instead of a PDF
    html_pages: HashSet<String>,
    pub calls: Vec<Call>,
    /// Timeout passed to every navigation, in call order
    pub navigation_timeouts: Vec<(String, Duration)>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            selectors: Selectors::default(),
            pages: HashMap::new(),
            current: None,
            accept_login: true,
            password: "secret".to_string(),
            typed_password: None,
            unreachable: HashSet::new(),
            render_failures: HashMap::new(),
            html_pages: HashSet::new(),
            calls: Vec::new(),
            navigation_timeouts: Vec::new(),
        }
    }

    /// A portal whose course list shows `courses`, each with `lectures` lectures.
    ///
    /// Course `n` (1-based) lives at `course/view.php?id=n`; its lectures
    /// have ids `n * 100 + position`.
    pub fn with_courses(courses: &[(&str, usize)]) -> Self {
        let mut driver = Self::new();
        let mut links = Vec::new();
        for (i, (title, lectures)) in courses.iter().enumerate() {
            let id = i + 1;
            let url = course_url(id);
            links.push(url.clone());
            driver.add_page(
                &url,
                MockPage {
                    title: Some(title.to_string()),
                    course_links: Vec::new(),
                    lecture_links: (1..=*lectures).map(|p| lecture_url(id * 100 + p)).collect(),
                },
            );
        }
        driver.add_page(
            &courses_url(),
            MockPage {
                course_links: links,
                ..Default::default()
            },
        );
        driver
    }

    pub fn add_page(&mut self, url: &str, page: MockPage) {
        self.pages.insert(url.to_string(), page);
    }

    pub fn page_mut(&mut self, url: &str) -> &mut MockPage {
        self.pages.entry(url.to_string()).or_default()
    }

    pub fn reject_login(mut self) -> Self {
        self.accept_login = false;
        self
    }

    pub fn unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    pub fn fail_render(mut self, url: &str, times: u32) -> Self {
        self.render_failures.insert(url.to_string(), times);
        self
    }

    pub fn render_html(mut self, url: &str) -> Self {
        self.html_pages.insert(url.to_string());
        self
    }

    pub fn renders(&self) -> Vec<&Path> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Render(path) => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Navigate(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Pause(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    fn current_page(&self) -> Option<&MockPage> {
        self.current.as_ref().and_then(|url| self.pages.get(url))
    }

    fn lookup(&self, selector: &str) -> Vec<String> {
        let Some(page) = self.current_page() else {
            return Vec::new();
        };
        if selector == self.selectors.course_link {
            page.course_links.clone()
        } else if selector == self.selectors.lecture_link {
            page.lecture_links.clone()
        } else if selector == self.selectors.course_title {
            page.title.iter().cloned().collect()
        } else {
            Vec::new()
        }
    }
}

impl PageDriver for MockDriver {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        self.calls.push(Call::Navigate(url.to_string()));
        self.navigation_timeouts.push((url.to_string(), timeout));
        if self.unreachable.contains(url) {
            return Err(Error::Timeout(timeout.as_millis(), url.to_string()));
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    fn wait_for_element(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        self.calls.push(Call::WaitForElement(selector.to_string()));
        let login_form = self.current.as_deref() == Some(login_url().as_str());
        if login_form || !self.lookup(selector).is_empty() {
            Ok(())
        } else {
            Err(Error::Timeout(timeout.as_millis(), selector.to_string()))
        }
    }

    fn extract(&mut self, selector: &str, _what: &Extract) -> Result<Vec<String>> {
        self.calls.push(Call::Extract(selector.to_string()));
        Ok(self.lookup(selector))
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        self.calls.push(Call::Fill(selector.to_string(), value.to_string()));
        if selector == self.selectors.password {
            self.typed_password = Some(value.to_string());
        }
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        self.calls.push(Call::Click(selector.to_string()));
        if selector == self.selectors.submit
            && self.accept_login
            && self.typed_password.as_deref() == Some(self.password.as_str())
        {
            self.current = Some(format!("{}/", BASE_URL));
        }
        Ok(())
    }

    fn wait_for_url(&mut self, url: &str, timeout: Duration) -> Result<()> {
        self.calls.push(Call::WaitForUrl(url.to_string()));
        if self.current.as_deref() == Some(url) {
            Ok(())
        } else {
            Err(Error::Timeout(timeout.as_millis(), url.to_string()))
        }
    }

    fn pause(&mut self, duration: Duration) {
        self.calls.push(Call::Pause(duration));
    }

    fn render_pdf(&mut self, path: &Path, _options: &PdfOptions) -> Result<()> {
        self.calls.push(Call::Render(path.to_path_buf()));
        let url = self.current.clone().unwrap_or_default();

        if let Some(remaining) = self.render_failures.get_mut(&url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::Browser(format!("render failed for {}", url)));
            }
        }
        if self.html_pages.contains(&url) {
            fs::write(path, b"<html><body>Session expired</body></html>")?;
            return Ok(());
        }

        write_marked_pdf(path, mark_of(&url))
    }
}

pub fn login_url() -> String {
    PortalConfig::new().with_base_url(BASE_URL).login_url()
}

pub fn courses_url() -> String {
    PortalConfig::new().with_base_url(BASE_URL).courses_url()
}

pub fn course_url(id: usize) -> String {
    format!("{}/course/view.php?id={}", BASE_URL, id)
}

pub fn lecture_url(id: usize) -> String {
    format!("{}/mod/page/view.php?id={}", BASE_URL, id)
}

/// Numeric id at the end of a lecture URL, 0 when there is none.
pub fn mark_of(url: &str) -> i64 {
    url.rsplit("id=")
        .next()
        .and_then(|id| id.parse().ok())
        .unwrap_or(0)
}

/// Write a one-page PDF whose page dictionary carries `Mark`.
pub fn write_marked_pdf(path: &Path, mark: i64) -> Result<()> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        "Mark" => mark,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path)?;
    Ok(())
}

/// `Mark` values of every page of the PDF at `path`, in page order.
pub fn read_marks(path: &Path) -> Vec<i64> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            doc.get_dictionary(id)
                .unwrap()
                .get(b"Mark")
                .unwrap()
                .as_i64()
                .unwrap()
        })
        .collect()
}
