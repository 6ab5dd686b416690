//! Single countdown with no phase cycling: count down, then lock the screen.

use std::io::Write;

use chrono::{DateTime, Local};
use pomolock_core::notify;
use pomolock_core::timer::{format_clock, TICK_PERIOD};
use pomolock_core::ValidationError;
use tokio::time::{self, MissedTickBehavior};

pub const DEFAULT_MINUTES: i64 = 25;
pub const MAX_MINUTES: i64 = 180;

/// Check a `--time` value: 0 < minutes <= 180.
pub fn validate_minutes(minutes: i64) -> Result<u64, ValidationError> {
    if minutes <= 0 {
        return Err(ValidationError::NonPositive {
            field: "time".to_string(),
        });
    }
    if minutes > MAX_MINUTES {
        return Err(ValidationError::OutOfRange {
            field: "time".to_string(),
            value: minutes,
            min: 1,
            max: MAX_MINUTES,
        });
    }
    Ok(minutes as u64)
}

/// Whole minutes between `started` and `now`, never negative.
pub fn elapsed_minutes(started: DateTime<Local>, now: DateTime<Local>) -> i64 {
    (now - started).num_minutes().max(0)
}

pub fn run(minutes: i64) -> Result<(), Box<dyn std::error::Error>> {
    let minutes = validate_minutes(minutes)?;
    super::runtime()?.block_on(countdown(minutes))
}

async fn countdown(minutes: u64) -> Result<(), Box<dyn std::error::Error>> {
    let started_at = Local::now();
    let ends_at = started_at + chrono::Duration::minutes(minutes as i64);

    println!("\n🍅 Pomodoro started!");
    println!("Duration:   {minutes} min");
    println!("Started at: {}", started_at.format("%H:%M:%S"));
    println!("Ends at:    {}", ends_at.format("%H:%M:%S"));
    println!("\nPress Ctrl+C to stop early\n");

    let mut ticker = time::interval(TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut remaining = minutes * 60;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if remaining == 0 {
                    break;
                }
                print!("\r⏰ Remaining: {}", format_clock(remaining));
                std::io::stdout().flush()?;
                remaining -= 1;
            }
            signal = &mut ctrl_c => {
                signal?;
                let elapsed = elapsed_minutes(started_at, Local::now());
                tracing::debug!(elapsed, "countdown interrupted");
                println!("\n\n⏹️  Pomodoro stopped");
                println!("Completed: {elapsed} min");
                return Ok(());
            }
        }
    }

    println!("\r⏰ Remaining: {}", format_clock(0));
    println!("\n🎉 Time's up!");
    println!("Locking screen...");
    match notify::lock_screen() {
        Ok(()) => println!("Screen locked."),
        Err(e) => {
            tracing::warn!("{e}");
            eprintln!("Failed to lock screen: {e}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn accepts_one_to_max_minutes() {
        assert_eq!(validate_minutes(1).unwrap(), 1);
        assert_eq!(validate_minutes(25).unwrap(), 25);
        assert_eq!(validate_minutes(180).unwrap(), 180);
    }

    #[test]
    fn rejects_zero_and_negative() {
        assert!(matches!(
            validate_minutes(0),
            Err(ValidationError::NonPositive { .. })
        ));
        assert!(validate_minutes(-10).is_err());
    }

    #[test]
    fn rejects_more_than_three_hours() {
        let err = validate_minutes(181).unwrap_err();
        assert_eq!(err.to_string(), "'time' must be between 1 and 180, got 181");
    }

    #[test]
    fn elapsed_minutes_rounds_down() {
        let start = Local.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 1, 9, 12, 59).unwrap();
        assert_eq!(elapsed_minutes(start, now), 12);
        assert_eq!(elapsed_minutes(now, start), 0);
    }
}
