//! Integration tests for lecture capture.

mod common;

use std::time::Duration;

use common::{lecture_url, read_marks, Call, MockDriver};
use lectsave::{capture, detect, layout, CaptureOptions, CaptureOutcome};

fn quick_options() -> CaptureOptions {
    CaptureOptions::new()
        .with_settle(Duration::from_millis(15))
        .with_backoff(Duration::from_millis(20))
}

#[test]
fn test_capture_saves_pdf() {
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("Курс_lecture1.pdf");
    let url = lecture_url(101);
    let mut driver = MockDriver::new();

    let outcome = capture(&mut driver, &url, &dest, &quick_options());

    assert_eq!(outcome, CaptureOutcome::Saved { attempt: 1 });
    assert!(detect::read_header(&dest).is_ok());
    assert_eq!(read_marks(&dest), vec![101]);
    assert_eq!(
        driver.calls,
        vec![
            Call::Navigate(url),
            Call::Pause(Duration::from_millis(15)),
            Call::Render(dest.clone()),
        ]
    );
}

#[test]
fn test_capture_existing_file_never_touches_driver() {
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("Курс_lecture2.pdf");
    std::fs::write(&dest, b"%PDF-1.4 earlier run").unwrap();
    let mut driver = MockDriver::new();

    let outcome = capture(&mut driver, &lecture_url(102), &dest, &quick_options());

    assert_eq!(outcome, CaptureOutcome::AlreadyPresent);
    assert!(outcome.is_success());
    assert!(driver.calls.is_empty());
    assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.4 earlier run");
}

#[test]
fn test_capture_exhausts_exact_attempts() {
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("Курс_lecture3.pdf");
    let url = lecture_url(103);
    let mut driver = MockDriver::new().fail_render(&url, u32::MAX);

    let outcome = capture(&mut driver, &url, &dest, &quick_options());

    match outcome {
        CaptureOutcome::Failed {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("render failed"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(driver.renders().len(), 3);
    assert_eq!(driver.navigations().len(), 3);
    assert!(!dest.exists());
}

#[test]
fn test_capture_backoff_only_between_attempts() {
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("Курс_lecture4.pdf");
    let url = lecture_url(104);
    let mut driver = MockDriver::new().fail_render(&url, u32::MAX);

    capture(&mut driver, &url, &dest, &quick_options().with_max_attempts(4));

    let backoffs = driver
        .pauses()
        .into_iter()
        .filter(|d| *d == Duration::from_millis(20))
        .count();
    let settles = driver
        .pauses()
        .into_iter()
        .filter(|d| *d == Duration::from_millis(15))
        .count();
    assert_eq!(settles, 4);
    assert_eq!(backoffs, 3);
    assert_eq!(driver.calls.last(), Some(&Call::Render(dest)));
}

#[test]
fn test_capture_recovers_on_later_attempt() {
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("Курс_lecture5.pdf");
    let url = lecture_url(105);
    let mut driver = MockDriver::new().fail_render(&url, 2);

    let outcome = capture(&mut driver, &url, &dest, &quick_options());

    assert_eq!(outcome, CaptureOutcome::Saved { attempt: 3 });
    assert_eq!(read_marks(&dest), vec![105]);
}

#[test]
fn test_capture_navigation_timeout_is_retried() {
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("Курс_lecture6.pdf");
    let url = lecture_url(106);
    let mut driver = MockDriver::new().unreachable(&url);

    let outcome = capture(&mut driver, &url, &dest, &quick_options().with_max_attempts(2));

    assert!(matches!(outcome, CaptureOutcome::Failed { attempts: 2, .. }));
    assert!(driver.renders().is_empty());
    assert!(!dest.exists());
}

#[test]
fn test_capture_removes_non_pdf_render() {
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("Курс_lecture7.pdf");
    let url = lecture_url(107);
    let mut driver = MockDriver::new().render_html(&url);

    let outcome = capture(&mut driver, &url, &dest, &quick_options());

    assert!(!outcome.is_success());
    assert_eq!(driver.renders().len(), 3);
    assert!(!dest.exists());
    assert!(!layout::partial_path(&dest).exists());
}

#[test]
fn test_capture_single_attempt_has_no_backoff() {
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("Курс_lecture8.pdf");
    let url = lecture_url(108);
    let mut driver = MockDriver::new().fail_render(&url, u32::MAX);

    let outcome = capture(&mut driver, &url, &dest, &quick_options().with_max_attempts(1));

    assert!(matches!(outcome, CaptureOutcome::Failed { attempts: 1, .. }));
    assert_eq!(driver.pauses(), vec![Duration::from_millis(15)]);
}
