//! lectsave CLI - save learning-portal lectures as PDF

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use lectsave::browser::{ChromeDriver, ChromeOptions};
use lectsave::portal::DEFAULT_BASE_URL;
use lectsave::{
    merge_files, normalize, CaptureOptions, CaptureOutcome, Credentials, HarvestOptions, Harvester,
    MergeOutcome, OutputLayout, Portal, PortalConfig, ResumeSpec, RunOutcome, RunReport, Timeouts,
    TitleNormalizer, TraversalEvent, TraversalObserver,
};

#[derive(Parser)]
#[command(name = "lectsave")]
#[command(version)]
#[command(about = "Save learning-portal lectures as per-course PDFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and capture lectures starting at a resume point
    Run {
        /// Part of the course name to start from (prompted if omitted)
        #[arg(short, long, value_name = "FRAGMENT")]
        course: Option<String>,

        /// Lecture number to start from in that course (prompted if omitted)
        #[arg(short, long, value_name = "N")]
        lecture: Option<String>,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = lectsave::layout::DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// Attempts per lecture
        #[arg(long, default_value = "3")]
        max_attempts: u32,

        /// Pause after a lecture page loads, in milliseconds
        #[arg(long, default_value = "1500")]
        settle_ms: u64,

        /// Pause between failed attempts, in milliseconds
        #[arg(long, default_value = "2000")]
        backoff_ms: u64,

        /// Page load timeout for portal and lecture pages, in seconds
        #[arg(long, default_value = "60")]
        navigation_timeout_secs: u64,

        /// Title prefix ignored when matching (repeatable, replaces the default)
        #[arg(long, value_name = "TOKEN")]
        strip_prefix: Vec<String>,

        /// Portal base URL
        #[arg(long, env = "LECTSAVE_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Write a JSON run report to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Portal username
        #[arg(short, long, env = "LECTSAVE_USERNAME")]
        username: Option<String>,

        /// Portal password
        #[arg(short, long, env = "LECTSAVE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Merge existing PDF files into one, in the given order
    Merge {
        /// Output PDF file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Input PDF files
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Show where the files of a course are written
    Paths {
        /// Course title as shown on the portal
        #[arg(value_name = "TITLE")]
        title: String,

        /// Number of lecture paths to list
        #[arg(short, long, default_value = "3")]
        lectures: usize,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = lectsave::layout::DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Run {
            course,
            lecture,
            output,
            headed,
            max_attempts,
            settle_ms,
            backoff_ms,
            navigation_timeout_secs,
            strip_prefix,
            base_url,
            report,
            username,
            password,
        }) => {
            let capture = CaptureOptions::new()
                .with_max_attempts(max_attempts)
                .with_settle(Duration::from_millis(settle_ms))
                .with_backoff(Duration::from_millis(backoff_ms));
            let (capture, config) = navigation_settings(
                capture,
                &base_url,
                Duration::from_secs(navigation_timeout_secs),
            );
            let normalizer = if strip_prefix.is_empty() {
                TitleNormalizer::default()
            } else {
                TitleNormalizer::without_prefixes().with_prefixes(strip_prefix)
            };
            let options = HarvestOptions::new()
                .with_output_dir(output)
                .with_capture(capture)
                .with_normalizer(normalizer);

            cmd_run(
                course,
                lecture,
                options,
                config,
                headed,
                username,
                password,
                report.as_deref(),
            )
        }
        Some(Commands::Merge { output, inputs }) => cmd_merge(&output, &inputs),
        Some(Commands::Paths {
            title,
            lectures,
            output,
        }) => {
            cmd_paths(&title, lectures, &output);
            Ok(())
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: lectsave run [--course <FRAGMENT>] [--lecture <N>]".yellow());
            println!("       lectsave --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    course: Option<String>,
    lecture: Option<String>,
    options: HarvestOptions,
    config: PortalConfig,
    headed: bool,
    username: Option<String>,
    password: Option<String>,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (credentials, resume) = run_inputs(course, lecture, username, password, prompt)?;
    log::debug!("Resume point: {:?}", resume);

    config.validate()?;

    println!("{} {}", "Portal:".cyan().bold(), config.base_url);
    println!("{} {}", "Output:".cyan().bold(), options.layout.dir().display());

    let driver = ChromeDriver::launch(&ChromeOptions::new().with_headless(!headed))?;
    let mut harvester = Harvester::new(driver, Portal::new(config), options);

    harvester.login(&credentials)?;
    println!("{}", "Logged in".green());

    let mut progress = ProgressObserver::default();
    let report = harvester.run_with_observer(&resume, &mut progress)?;
    progress.finish();

    if let Some(path) = report_path {
        fs::write(path, report.to_json()?)?;
        println!("{} {}", "Report saved to".green(), path.display());
    }

    print_summary(&report, &resume);
    Ok(())
}

/// Apply one navigation timeout to lecture pages and portal pages.
fn navigation_settings(
    capture: CaptureOptions,
    base_url: &str,
    navigation: Duration,
) -> (CaptureOptions, PortalConfig) {
    let config = PortalConfig::new()
        .with_base_url(base_url)
        .with_timeouts(Timeouts {
            navigation,
            ..Timeouts::default()
        });
    (capture.with_navigation_timeout(navigation), config)
}

/// Credentials and resume point for a run.
///
/// Credentials are checked before anything is asked, so a missing
/// password fails without prompting.
fn run_inputs(
    course: Option<String>,
    lecture: Option<String>,
    username: Option<String>,
    password: Option<String>,
    mut ask: impl FnMut(&str) -> io::Result<String>,
) -> Result<(Credentials, ResumeSpec), Box<dyn std::error::Error>> {
    let username = username.ok_or("Missing username: use --username or LECTSAVE_USERNAME")?;
    let password = password.ok_or("Missing password: use --password or LECTSAVE_PASSWORD")?;

    let fragment = match course {
        Some(course) => course,
        None => ask("Course name (or part of it):")?,
    };
    let lecture = match lecture {
        Some(lecture) => lecture,
        None => ask("Start from lecture number:")?,
    };
    let resume = ResumeSpec::parse(fragment, &lecture)?;
    Ok((Credentials::new(username, password), resume))
}

fn cmd_merge(output: &Path, inputs: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    match merge_files(inputs, output) {
        MergeOutcome::Merged { inputs, pages } => {
            println!(
                "{} {} ({} files, {} pages)",
                "Saved to".green(),
                output.display(),
                inputs,
                pages
            );
            Ok(())
        }
        MergeOutcome::Empty => Err("No input files".into()),
        MergeOutcome::Failed { error } => Err(error.into()),
    }
}

fn cmd_paths(title: &str, lectures: usize, output: &Path) {
    let layout = OutputLayout::new(output);

    println!("{}: {}", "Title".bold(), title);
    println!("{}: {}", "Match key".bold(), normalize(title));
    println!();
    for position in 1..=lectures {
        let branch = "├─".dimmed();
        println!("  {} {}", branch, layout.lecture_path(title, position).display());
    }
    println!("  {} {}", "└─".dimmed(), layout.merged_path(title).display());
}

fn cmd_version() {
    println!("{} {}", "lectsave".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Resumable lecture-to-PDF harvester");
    println!();
    println!("License: MIT");
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{} ", label.cyan().bold());
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_summary(report: &RunReport, resume: &ResumeSpec) {
    let totals = &report.totals;

    println!();
    if report.outcome() == RunOutcome::NoCourseMatched {
        println!(
            "{} no course matches '{}', nothing was downloaded",
            "Warning:".yellow().bold(),
            resume.fragment()
        );
        return;
    }

    println!("{}", "Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!(
        "{}: {} processed, {} skipped, {} without lectures",
        "Courses".bold(),
        totals.courses_processed,
        totals.courses_skipped,
        totals.courses_without_lectures
    );
    println!(
        "{}: {} saved, {} already present, {} skipped, {} failed",
        "Lectures".bold(),
        totals.lectures_captured,
        totals.lectures_already_present,
        totals.lectures_skipped,
        totals.lectures_failed
    );
    println!(
        "{}: {} written, {} empty, {} failed",
        "Merged".bold(),
        totals.merges_written,
        totals.merges_empty,
        totals.merges_failed
    );

    for course in report.courses.iter().filter(|c| !c.failed_lectures.is_empty()) {
        println!("\n{} {}", "Failed in".red(), course.title);
        for url in &course.failed_lectures {
            println!("  {} {}", "-".dimmed(), url);
        }
    }
}

/// Drives a progress bar per course from traversal events.
#[derive(Default)]
struct ProgressObserver {
    bar: Option<ProgressBar>,
}

impl ProgressObserver {
    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn println(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }
}

impl TraversalObserver for ProgressObserver {
    fn on_event(&mut self, event: &TraversalEvent) {
        match event {
            TraversalEvent::CoursesListed { total } => {
                println!("{} {} courses", "Found".green(), total);
            }
            TraversalEvent::CourseSkipped { index, title } => {
                println!("{}", format!("[{}] {} (skipped)", index, title).dimmed());
            }
            TraversalEvent::CourseStarted {
                index,
                total,
                title,
                first_lecture,
            } => {
                self.finish();
                let from = if *first_lecture > 1 {
                    format!(" from lecture {}", first_lecture)
                } else {
                    String::new()
                };
                println!("\n{} {}{}", format!("[{}/{}]", index, total).cyan().bold(), title.bold(), from);
            }
            TraversalEvent::AmbiguousMatch {
                title,
                resume_index,
                ..
            } => {
                println!(
                    "{} '{}' also matches; resumed at course {}",
                    "Note:".yellow(),
                    title,
                    resume_index
                );
            }
            TraversalEvent::LecturesUnavailable { reason, .. } => {
                println!("  {} {}", "No lectures:".yellow(), reason);
            }
            TraversalEvent::LecturesListed { count, .. } => {
                let bar = ProgressBar::new(*count as u64);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                {
                    bar.set_style(style.progress_chars("#>-"));
                }
                self.bar = Some(bar);
            }
            TraversalEvent::LectureSkipped { position, .. } => {
                if let Some(bar) = &self.bar {
                    bar.set_message(format!("lecture {} skipped", position));
                    bar.inc(1);
                }
            }
            TraversalEvent::LectureFinished {
                position,
                path,
                outcome,
                ..
            } => {
                let file = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match outcome {
                    CaptureOutcome::Saved { .. } => {
                        self.println(format!("  {} {}", "Saved".green(), file));
                    }
                    CaptureOutcome::AlreadyPresent => {
                        self.println(format!("  {} {}", "Exists".dimmed(), file));
                    }
                    CaptureOutcome::Failed { attempts, .. } => self.println(format!(
                        "  {} lecture {} after {} attempts",
                        "Failed".red(),
                        position,
                        attempts
                    )),
                }
                if let Some(bar) = &self.bar {
                    bar.set_message(format!("lecture {}", position));
                    bar.inc(1);
                }
            }
            TraversalEvent::CourseMerged { path, outcome, .. } => {
                self.finish();
                match outcome {
                    MergeOutcome::Merged { pages, .. } => println!(
                        "  {} {} ({} pages)",
                        "Merged".green().bold(),
                        path.display(),
                        pages
                    ),
                    MergeOutcome::Empty => {
                        println!("  {}", "Nothing to merge".yellow());
                    }
                    MergeOutcome::Failed { error } => {
                        println!("  {} {}", "Merge failed:".red(), error);
                    }
                }
            }
        }
    }
}
