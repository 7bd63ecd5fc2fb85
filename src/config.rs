use crate::goals::GoalTable;
use crate::models::HabitCategory;
use std::{env, path::PathBuf, time::Duration};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/habits.json";
pub const DEFAULT_PERSIST_DELAY_MS: u64 = 300;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_path: PathBuf,
    /// Delay before a slider edit of today's record is persisted.
    pub persist_delay: Duration,
    pub goals: GoalTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            persist_delay: Duration::from_millis(DEFAULT_PERSIST_DELAY_MS),
            goals: GoalTable::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unparseable values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = parsed::<u16>(&lookup, "PORT") {
            config.port = port;
        }
        if let Some(path) = lookup("APP_DATA_PATH").filter(|p| !p.trim().is_empty()) {
            config.data_path = PathBuf::from(path);
        }
        if let Some(ms) = parsed::<u64>(&lookup, "HABIT_PERSIST_DELAY_MS") {
            config.persist_delay = Duration::from_millis(ms);
        }
        for (key, category) in [
            ("HABIT_GOAL_WATER", HabitCategory::Water),
            ("HABIT_GOAL_SLEEP", HabitCategory::Sleep),
            ("HABIT_GOAL_SCREEN", HabitCategory::Screen),
        ] {
            if let Some(target) = parsed::<f64>(&lookup, key) {
                config.goals = config.goals.with_target(category, target);
            }
        }

        config
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring invalid config value");
            None
        }
    }
}
