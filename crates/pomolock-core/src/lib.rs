//! # Pomolock Core Library
//!
//! Core logic for the Pomolock Pomodoro timer: a small work/break state
//! machine, the background task that counts it down, the JSON configuration
//! store, and the notification and screen-lock side effects fired when a
//! phase ends. The CLI binary is a thin presentation layer over this crate.
//!
//! ## Architecture
//!
//! - **Session Engine**: pure state machine over Work, ShortBreak and
//!   LongBreak; advanced one second at a time by its owner
//! - **Timer Driver**: a single tokio task that owns the engine, applies
//!   start/pause/stop commands and streams events back
//! - **Storage**: flat JSON configuration with defaults on any read error
//! - **Notify**: best-effort desktop notification and screen lock
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Core timer state machine
//! - [`TimerDriver`] / [`TimerHandle`]: Background countdown and its control surface
//! - [`Config`]: Application configuration management
//! - [`Notifier`]: Trait for phase-completion side effects

pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, NotifyError, ValidationError};
pub use events::Event;
pub use notify::{DesktopNotifier, NoopNotifier, Notifier};
pub use storage::Config;
pub use timer::{Phase, SessionEngine, Status, TimerDriver, TimerHandle};
