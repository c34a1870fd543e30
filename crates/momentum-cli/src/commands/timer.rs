use chrono::Utc;
use clap::Subcommand;
use momentum_core::{Config, FocusTimer, SqliteStore, TimerCommand};
use serde_json::json;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a focus session (acts as the owning app)
    Start {
        /// Habit ID the session counts toward
        #[arg(long)]
        habit_id: Option<String>,
        /// Label shown by widgets
        #[arg(long, default_value = "Focus")]
        name: String,
        /// Session length; defaults to timer.focus_minutes
        #[arg(long)]
        minutes: Option<u64>,
    },
    /// Request a pause (applied on the next tick)
    Pause,
    /// Request a resume (applied on the next tick)
    Resume,
    /// Request a stop (applied on the next tick)
    Stop,
    /// Run one driver evaluation: apply the pending command, advance the countdown
    Tick,
    /// Switch into a break
    Break {
        /// Break length; defaults to timer.break_minutes
        #[arg(long)]
        minutes: Option<u64>,
    },
    /// Print the current session as JSON
    Status,
}

fn open_timer(config: &Config) -> Result<FocusTimer<SqliteStore>, Box<dyn std::error::Error>> {
    let store = SqliteStore::open_in(&config.app_group_dir()?)?;
    Ok(FocusTimer::new(store, config.focus_secs(), config.break_secs()))
}

fn post(timer: &FocusTimer<SqliteStore>, command: TimerCommand) {
    timer.bridge().post_command(command);
    println!("{}", json!({ "type": "CommandPosted", "command": command }));
}

fn minutes_to_secs(minutes: Option<u64>, default_secs: u64) -> Result<u64, String> {
    match minutes {
        None => Ok(default_secs),
        Some(m) => m
            .checked_mul(60)
            .ok_or_else(|| format!("--minutes {m} is too large")),
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let timer = open_timer(&config)?;
    let now = Utc::now();

    match action {
        TimerAction::Start {
            habit_id,
            name,
            minutes,
        } => {
            let secs = minutes_to_secs(minutes, timer.focus_secs())?;
            match timer.start_at(habit_id, &name, secs, now) {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => return Err("a focus session is already in progress".into()),
            }
        }
        TimerAction::Pause => post(&timer, TimerCommand::Pause),
        TimerAction::Resume => post(&timer, TimerCommand::Resume),
        TimerAction::Stop => post(&timer, TimerCommand::Stop),
        TimerAction::Tick => {
            let events = timer.tick_at(now);
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        TimerAction::Break { minutes } => {
            let secs = minutes_to_secs(minutes, timer.break_secs())?;
            match timer.start_break_at(secs, now) {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => return Err("no running or finished session to break from".into()),
            }
        }
        TimerAction::Status => match timer.status_at(now) {
            Some(state) => println!("{}", serde_json::to_string_pretty(&state)?),
            None => println!("{}", json!({ "isActive": false })),
        },
    }
    Ok(())
}
