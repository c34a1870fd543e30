use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::Subcommand;
use momentum_core::{Config, Database, Habit, StreakEngine, ValidationError};
use serde::Serialize;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a habit
    Add {
        /// Habit name
        name: String,
    },
    /// List habits
    List {
        #[arg(long)]
        json: bool,
    },
    /// Delete a habit and its history
    Remove {
        /// Habit ID (or unique prefix)
        id: String,
    },
    /// Mark a habit done
    Done {
        /// Habit ID (or unique prefix)
        id: String,
        /// Day to mark (YYYY-MM-DD); defaults to now
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove completions for a day
    Undo {
        /// Habit ID (or unique prefix)
        id: String,
        /// Day to clear (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Show streak statistics
    Stats {
        /// Habit ID (or unique prefix)
        id: String,
        /// Window for the completion rate
        #[arg(long, default_value = "30")]
        days: i64,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct HabitStats {
    habit: Habit,
    current_streak: u32,
    longest_streak: u32,
    total_days: u32,
    completion_rate: f64,
    window_days: i64,
    completed_today: bool,
    message: String,
}

fn parse_day(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| ValidationError::InvalidValue {
        field: "date".into(),
        message: format!("expected YYYY-MM-DD: {e}"),
    })
}

/// Midday of `day` in the engine's calendar, clear of DST transitions.
fn instant_on<Tz: TimeZone>(engine: &StreakEngine<Tz>, day: NaiveDate) -> Option<DateTime<Utc>> {
    let noon = day.and_hms_opt(12, 0, 0)?;
    engine
        .timezone()
        .from_local_datetime(&noon)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn resolve(db: &Database, id: &str) -> Result<Habit, Box<dyn std::error::Error>> {
    db.find_habit(id)?
        .ok_or_else(|| format!("no habit matches '{id}'").into())
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();
    match config.utc_offset() {
        Some(offset) => run_with(action, &db, &StreakEngine::new(offset)),
        None => run_with(action, &db, &StreakEngine::local()),
    }
}

fn run_with<Tz: TimeZone>(
    action: HabitAction,
    db: &Database,
    engine: &StreakEngine<Tz>,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        HabitAction::Add { name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "name".into(),
                    message: "must not be empty".into(),
                }
                .into());
            }
            let habit = db.add_habit(name)?;
            println!("Habit created: {}", habit.id);
        }
        HabitAction::List { json } => {
            let habits = db.list_habits()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else if habits.is_empty() {
                println!("No habits yet.");
            } else {
                for habit in habits {
                    println!("{}  {}", habit.id, habit.name);
                }
            }
        }
        HabitAction::Remove { id } => {
            let habit = resolve(db, &id)?;
            db.remove_habit(&habit.id)?;
            println!("Habit removed: {}", habit.name);
        }
        HabitAction::Done { id, date } => {
            let habit = resolve(db, &id)?;
            let at = match date {
                Some(raw) => {
                    let day = parse_day(&raw)?;
                    if day > engine.normalize(Utc::now()) {
                        return Err(ValidationError::InvalidValue {
                            field: "date".into(),
                            message: format!("{day} is in the future"),
                        }
                        .into());
                    }
                    instant_on(engine, day)
                        .ok_or_else(|| format!("{raw} does not exist in the configured calendar"))?
                }
                None => Utc::now(),
            };
            db.record_completion(&habit.id, at)?;
            let streak = engine.current_streak_now(&db.completions(&habit.id)?);
            println!("{} done for {} (streak: {streak})", habit.name, engine.normalize(at));
        }
        HabitAction::Undo { id, date } => {
            let habit = resolve(db, &id)?;
            let day = match date {
                Some(raw) => parse_day(&raw)?,
                None => engine.normalize(Utc::now()),
            };
            let removed = db.remove_completions_on(&habit.id, day, engine)?;
            println!("Removed {removed} completion(s) for {day}");
        }
        HabitAction::Stats { id, days, json } => {
            let habit = resolve(db, &id)?;
            let completions = db.completions(&habit.id)?;
            let now = Utc::now();
            let status = engine.streak_status(&completions, now);
            let stats = HabitStats {
                current_streak: status.current,
                longest_streak: status.longest,
                total_days: engine.total_completed_days(&completions),
                completion_rate: engine.completion_rate(&completions, days, now),
                window_days: days,
                completed_today: engine.is_completed(&completions, now),
                message: status.message,
                habit,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", stats.habit.name);
                println!("  Current streak: {} day(s)", stats.current_streak);
                println!("  Longest streak: {} day(s)", stats.longest_streak);
                println!("  Total days:     {}", stats.total_days);
                println!(
                    "  Last {} days:   {:.0}%",
                    stats.window_days,
                    stats.completion_rate * 100.0
                );
                println!("  {}", stats.message);
            }
        }
    }
    Ok(())
}
