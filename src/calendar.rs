//! Month grid for the calendar view.
//!
//! A grid is always 6 weeks of 7 days starting on Sunday, so the month's first
//! day lands in its weekday column and the remainder is padded with days from
//! the neighbouring months.

use crate::dates::{DayKind, YearMonth, date_key};
use crate::goals::{GoalTable, StatusTier};
use crate::models::{DailyRecord, HabitCategory};
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

pub const GRID_CELLS: usize = 42;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryStatus {
    pub category: HabitCategory,
    pub tier: StatusTier,
    /// Bar fill in percent, 0..=100.
    pub fill: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarDayCell {
    #[serde(skip)]
    pub date: NaiveDate,
    pub key: String,
    pub day: u32,
    pub current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub kind: DayKind,
    pub record: DailyRecord,
    pub status: Vec<CategoryStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarGrid {
    pub month: String,
    pub label: String,
    pub cells: Vec<CalendarDayCell>,
}

/// The 42 dates shown for `month`, each flagged with whether it belongs to it.
/// `None` for the first and last months chrono can represent, whose padding
/// days fall outside its range.
pub fn grid_dates(month: YearMonth) -> Option<Vec<(NaiveDate, bool)>> {
    let first = month.first_day();
    let leading = u64::from(first.weekday().num_days_from_sunday());
    let days_in_month = u64::from(month.days_in_month());
    let start = first.checked_sub_days(Days::new(leading))?;

    let mut dates = Vec::with_capacity(GRID_CELLS);
    for offset in 0..GRID_CELLS as u64 {
        let date = start.checked_add_days(Days::new(offset))?;
        let current = (leading..leading + days_in_month).contains(&offset);
        dates.push((date, current));
    }
    Some(dates)
}

/// Builds the annotated grid. `resolve` supplies the record shown for each date.
pub fn build_month_grid<F>(
    month: YearMonth,
    today: NaiveDate,
    selected: Option<NaiveDate>,
    goals: &GoalTable,
    resolve: F,
) -> Option<CalendarGrid>
where
    F: Fn(NaiveDate) -> DailyRecord,
{
    let cells = grid_dates(month)?
        .into_iter()
        .map(|(date, current_month)| {
            let record = resolve(date);
            CalendarDayCell {
                date,
                key: date_key(date),
                day: date.day(),
                current_month,
                is_today: date == today,
                is_selected: selected == Some(date),
                kind: DayKind::of(date, today),
                status: statuses(&record, goals),
                record,
            }
        })
        .collect();

    Some(CalendarGrid {
        month: month.to_string(),
        label: month.label(),
        cells,
    })
}

pub fn statuses(record: &DailyRecord, goals: &GoalTable) -> Vec<CategoryStatus> {
    HabitCategory::ALL
        .iter()
        .map(|&category| {
            let goal = goals.get(category);
            let value = record.get(category);
            CategoryStatus {
                category,
                tier: goal.classify(value),
                fill: goal.progress(value).clamp(0.0, 100.0),
            }
        })
        .collect()
}
