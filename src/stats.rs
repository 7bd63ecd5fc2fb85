use crate::dates::date_key;
use crate::goals::{GoalDirection, GoalTable, StatusTier};
use crate::models::{DailyRecord, HabitCategory};
use crate::storage::HistoryStore;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CategoryProgress {
    pub category: HabitCategory,
    pub current: f64,
    pub goal: f64,
    pub unit: &'static str,
    pub direction: GoalDirection,
    pub percent: f64,
    pub tier: StatusTier,
    pub met: bool,
}

#[derive(Debug, Serialize)]
pub struct DayPoint {
    pub date: String,
    pub day: String,
    #[serde(flatten)]
    pub record: DailyRecord,
}

#[derive(Debug, Serialize)]
pub struct Streak {
    pub category: HabitCategory,
    pub days: u32,
}

#[derive(Debug, Serialize)]
pub struct Achievement {
    pub title: &'static str,
    pub description: &'static str,
    pub category: HabitCategory,
    pub target_days: u32,
    pub progress: u32,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub date: String,
    pub progress: Vec<CategoryProgress>,
    pub last_7_days: Vec<DayPoint>,
    pub streaks: Vec<Streak>,
    pub best_streak: u32,
    pub achievements: Vec<Achievement>,
}

const ACHIEVEMENTS: [(&str, &str, HabitCategory, u32); 3] = [
    ("Water Champion", "Reach water goal for 7 days", HabitCategory::Water, 7),
    ("Sleep Master", "Reach sleep goal for 14 days", HabitCategory::Sleep, 14),
    ("Digital Detox", "Stay under screen time goal for 5 days", HabitCategory::Screen, 5),
];

/// Derives the dashboard for `today`, reading today's values from `today_record`.
pub fn build_dashboard_at(
    today: NaiveDate,
    today_record: DailyRecord,
    store: &HistoryStore,
    goals: &GoalTable,
) -> Dashboard {
    let progress = goals
        .iter()
        .map(|goal| {
            let current = today_record.get(goal.category);
            CategoryProgress {
                category: goal.category,
                current,
                goal: goal.target,
                unit: goal.unit,
                direction: goal.direction,
                percent: goal.progress(current),
                tier: goal.classify(current),
                met: goal.is_met(current),
            }
        })
        .collect();

    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset);
        let record = if offset == 0 {
            today_record
        } else {
            store.get_or_default(date)
        };
        last_7_days.push(DayPoint {
            date: date_key(date),
            day: date.format("%a").to_string(),
            record,
        });
    }

    let logged_today = store.get(today).is_some() || today_record != DailyRecord::default();
    let resolve = |date: NaiveDate| {
        if date == today {
            logged_today.then_some(today_record)
        } else {
            store.get(date)
        }
    };

    let streaks: Vec<Streak> = HabitCategory::ALL
        .iter()
        .map(|&category| Streak {
            category,
            days: streak_days(today, category, goals, store.len(), &resolve),
        })
        .collect();
    let best_streak = streaks.iter().map(|s| s.days).max().unwrap_or(0);

    let achievements = ACHIEVEMENTS
        .iter()
        .map(|&(title, description, category, target_days)| {
            let days = streaks
                .iter()
                .find(|s| s.category == category)
                .map_or(0, |s| s.days);
            Achievement {
                title,
                description,
                category,
                target_days,
                progress: (days.min(target_days) * 100) / target_days,
            }
        })
        .collect();

    Dashboard {
        date: date_key(today),
        progress,
        last_7_days,
        streaks,
        best_streak,
        achievements,
    }
}

/// Consecutive logged days meeting the goal, ending today, or yesterday while
/// today's goal is still open.
fn streak_days<F>(
    today: NaiveDate,
    category: HabitCategory,
    goals: &GoalTable,
    stored_days: usize,
    resolve: &F,
) -> u32
where
    F: Fn(NaiveDate) -> Option<DailyRecord>,
{
    let goal = goals.get(category);
    let met = |date: NaiveDate| resolve(date).is_some_and(|r| goal.is_met(r.get(category)));

    let mut date = if met(today) { today } else { today - Duration::days(1) };
    let mut days = 0u32;
    // Every counted day is a stored day or today.
    while days as usize <= stored_days && met(date) {
        days += 1;
        date -= Duration::days(1);
    }
    days
}
