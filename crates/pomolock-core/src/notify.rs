//! Desktop notifications and the screen-lock action.
//!
//! Both are best-effort. [`DesktopNotifier`] runs each call on a short-lived
//! thread so the countdown never waits on the notification daemon or the
//! lock command, and any failure ends up as a `warn!` log line.

use std::process::Command;

use notify_rust::{Notification, Timeout};

use crate::error::NotifyError;
use crate::timer::Phase;

/// Title shown on every notification.
pub const NOTIFICATION_TITLE: &str = "Pomolock";

const NOTIFICATION_TIMEOUT_MS: u32 = 5_000;

const WINDOWS_LOCK: (&str, &[&str]) = ("rundll32.exe", &["user32.dll,LockWorkStation"]);
// Sleeps the display. This only locks when the user's security settings
// require a password immediately after sleep.
const MACOS_LOCK: (&str, &[&str]) = ("pmset", &["displaysleepnow"]);
const LOGIND_LOCK: (&str, &[&str]) = ("loginctl", &["lock-session"]);

/// Side effects fired when a phase completes.
///
/// Implementations must not block the caller and must not panic on
/// platform failures.
pub trait Notifier: Send + Sync {
    /// Announce that `completed` has ended.
    fn notify(&self, completed: Phase);

    /// Lock the screen.
    fn lock_screen(&self);
}

/// Run the completion side effects for `completed`: always a notification,
/// then a screen lock if a work phase ended and `auto_lock` is set.
pub fn on_phase_completed(notifier: &dyn Notifier, completed: Phase, auto_lock: bool) {
    notifier.notify(completed);
    if completed == Phase::Work && auto_lock {
        notifier.lock_screen();
    }
}

/// Notifier backed by the OS notification service and lock command.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, completed: Phase) {
        fire_and_forget("pomolock-notify", move || {
            send_notification(NOTIFICATION_TITLE, &completion_message(completed))
        });
    }

    fn lock_screen(&self) {
        fire_and_forget("pomolock-lock", lock_screen);
    }
}

/// Notifier that does nothing, for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, completed: Phase) {
        tracing::debug!(%completed, "notification suppressed");
    }

    fn lock_screen(&self) {
        tracing::debug!("screen lock suppressed");
    }
}

/// Body text for the notification sent when `completed` ends.
pub fn completion_message(completed: Phase) -> String {
    format!("{} finished!", completed.display_name())
}

/// Show a desktop notification and wait until it has been handed to the
/// notification service.
///
/// # Errors
/// Returns an error if no notification backend is available.
pub fn send_notification(title: &str, body: &str) -> Result<(), NotifyError> {
    Notification::new()
        .summary(title)
        .body(body)
        .timeout(Timeout::Milliseconds(NOTIFICATION_TIMEOUT_MS))
        .show()?;
    tracing::debug!(title, body, "notification sent");
    Ok(())
}

/// Lock the screen with the platform's lock command and wait for it.
///
/// # Errors
/// Returns an error if the platform has no known lock command, the command
/// cannot be started, or it exits unsuccessfully.
pub fn lock_screen() -> Result<(), NotifyError> {
    let (program, args) = lock_command()?;
    let status = Command::new(program).args(args).status()?;
    if !status.success() {
        return Err(NotifyError::LockFailed {
            command: format!("{program} {}", args.join(" ")),
            status: status.to_string(),
        });
    }
    tracing::info!("screen locked");
    Ok(())
}

/// The program and arguments that lock the screen on this platform.
///
/// # Errors
/// Returns [`NotifyError::LockUnsupported`] on platforms without one.
pub fn lock_command() -> Result<(&'static str, &'static [&'static str]), NotifyError> {
    if cfg!(target_os = "windows") {
        Ok(WINDOWS_LOCK)
    } else if cfg!(target_os = "macos") {
        Ok(MACOS_LOCK)
    } else if cfg!(any(
        target_os = "linux",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd"
    )) {
        Ok(LOGIND_LOCK)
    } else {
        Err(NotifyError::LockUnsupported {
            platform: std::env::consts::OS.to_string(),
        })
    }
}

fn fire_and_forget<F>(name: &str, job: F)
where
    F: FnOnce() -> Result<(), NotifyError> + Send + 'static,
{
    let spawned = std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            if let Err(e) = job() {
                tracing::warn!("{e}");
            }
        });
    if let Err(e) = spawned {
        tracing::warn!("failed to spawn {name} thread: {e}");
    }
}
