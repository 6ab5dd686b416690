//! Full work/break cycle with the console as the presentation layer.
//!
//! Single-letter commands are read from stdin, one per line, while the
//! driver streams status back to a refreshed status line.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use clap::Args;
use pomolock_core::timer::EventReceiver;
use pomolock_core::{Config, DesktopNotifier, Event, NoopNotifier, Notifier, TimerDriver, TimerHandle};
use tokio::sync::mpsc;

const HELP: &str = "commands: [enter] start/pause  s start  p pause/resume  x stop  r reload config  q quit";

#[derive(Args)]
pub struct CycleArgs {
    /// Do not show notifications or lock the screen
    #[arg(long)]
    no_notify: bool,
    /// Print every event as a JSON line instead of a status line
    #[arg(long)]
    json: bool,
    /// Wait for a start command instead of starting right away
    #[arg(long)]
    paused: bool,
}

/// What a line of console input asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Toggle,
    Start,
    Pause,
    Stop,
    Reload,
    Quit,
    Help,
    Unknown,
}

impl Input {
    pub fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "" => Input::Toggle,
            "s" | "start" => Input::Start,
            "p" | "pause" | "resume" => Input::Pause,
            "x" | "stop" => Input::Stop,
            "r" | "reload" => Input::Reload,
            "q" | "quit" | "exit" => Input::Quit,
            "h" | "help" | "?" => Input::Help,
            _ => Input::Unknown,
        }
    }
}

pub fn run(args: CycleArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::config_path(config_path)?;
    super::runtime()?.block_on(cycle(args, &path))
}

async fn cycle(args: CycleArgs, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_from(path);
    let notifier: Arc<dyn Notifier> = if args.no_notify {
        Arc::new(NoopNotifier)
    } else {
        Arc::new(DesktopNotifier::new())
    };
    let (handle, mut events) = TimerDriver::new(config).notifier(notifier).spawn()?;
    let mut input = spawn_stdin_reader();

    if !args.json {
        println!("{HELP}");
    }
    if !args.paused {
        handle.start()?;
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            Some(event) = events.recv() => render(&event, args.json)?,
            Some(line) = input.recv() => {
                if !apply_input(&handle, Input::parse(&line), path)? {
                    break;
                }
            }
            signal = &mut ctrl_c => {
                signal?;
                break;
            }
        }
    }

    handle.shutdown()?;
    handle.join().await;
    drain(&mut events, args.json)?;
    if !args.json {
        println!();
    }
    Ok(())
}

/// Returns `false` when the session should end.
fn apply_input(handle: &TimerHandle, input: Input, path: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    match input {
        Input::Toggle => handle.toggle()?,
        Input::Start => handle.start()?,
        Input::Pause => handle.toggle_pause()?,
        Input::Stop => handle.stop()?,
        Input::Reload => handle.reconfigure(Config::load_from(path))?,
        Input::Quit => return Ok(false),
        Input::Help => println!("\n{HELP}"),
        Input::Unknown => eprintln!("\nunknown command ({HELP})"),
    }
    Ok(true)
}

fn render(event: &Event, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = std::io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string(event)?)?;
        return Ok(());
    }
    match event {
        Event::StateSnapshot { status, .. } => {
            // Clear the line first; the summary shrinks when "(paused)" goes away.
            write!(out, "\r\x1b[2K{}", status.summary())?;
        }
        Event::PhaseCompleted {
            completed, next, ..
        } => {
            writeln!(out, "\n✅ {completed} finished, next up: {next}")?;
        }
        Event::ConfigChanged { config, .. } => {
            writeln!(
                out,
                "\nconfiguration reloaded: work {}m, short break {}m, long break {}m, {} cycles",
                config.work_time, config.short_break, config.long_break, config.cycles
            )?;
        }
        Event::TimerStarted { .. }
        | Event::TimerPaused { .. }
        | Event::TimerResumed { .. }
        | Event::TimerStopped { .. } => {}
    }
    out.flush()?;
    Ok(())
}

fn drain(events: &mut EventReceiver, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    while let Ok(event) = events.try_recv() {
        render(&event, json)?;
    }
    Ok(())
}

/// Read stdin on a plain thread. Tokio's stdin keeps the runtime alive
/// until the next line arrives, which would hang shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("pomolock-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!("console input disabled: {e}");
    }
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_letters_and_words() {
        assert_eq!(Input::parse(""), Input::Toggle);
        assert_eq!(Input::parse("s"), Input::Start);
        assert_eq!(Input::parse(" P \n"), Input::Pause);
        assert_eq!(Input::parse("resume"), Input::Pause);
        assert_eq!(Input::parse("x"), Input::Stop);
        assert_eq!(Input::parse("reload"), Input::Reload);
        assert_eq!(Input::parse("QUIT"), Input::Quit);
        assert_eq!(Input::parse("?"), Input::Help);
        assert_eq!(Input::parse("lunch"), Input::Unknown);
    }
}
