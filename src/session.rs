use crate::dates::{DayKind, date_key};
use crate::errors::TrackerError;
use crate::goals::CategoryGoal;
use crate::models::{DailyRecord, HabitCategory};
use chrono::NaiveDate;
use serde::Serialize;

/// Selected date plus the records being edited.
///
/// Today's working record is kept apart from the record of any other selected
/// day, so browsing history never disturbs today's in-progress values.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    today: NaiveDate,
    today_record: DailyRecord,
    selected: NaiveDate,
    other_record: DailyRecord,
}

/// Result of a single live-record mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edit {
    pub date: NaiveDate,
    pub kind: DayKind,
    pub record: DailyRecord,
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub today: String,
    pub selected_date: String,
    pub day_kind: DayKind,
    pub editable: bool,
    pub record: DailyRecord,
    pub view_month: String,
    pub pending_write: bool,
}

impl ActiveSession {
    pub fn new(today: NaiveDate, today_record: DailyRecord) -> Self {
        Self {
            today,
            today_record,
            selected: today,
            other_record: DailyRecord::default(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn today_record(&self) -> DailyRecord {
        self.today_record
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn kind(&self) -> DayKind {
        DayKind::of(self.selected, self.today)
    }

    pub fn live(&self) -> DailyRecord {
        if self.selected == self.today {
            self.today_record
        } else {
            self.other_record
        }
    }

    /// Switches selection. `stored` is only consulted for dates other than today,
    /// and a missing record resets the live values to zero.
    pub fn select(&mut self, date: NaiveDate, stored: impl FnOnce(NaiveDate) -> Option<DailyRecord>) {
        self.selected = date;
        if date != self.today {
            self.other_record = match DayKind::of(date, self.today) {
                DayKind::Future => DailyRecord::default(),
                _ => stored(date).unwrap_or_default(),
            };
        }
    }

    /// Moves "today" forward after a date change. A selection that was on the
    /// old today follows to the new one.
    pub fn roll_over(&mut self, today: NaiveDate, today_record: DailyRecord) {
        if self.selected == self.today {
            self.selected = today;
        }
        self.today = today;
        self.today_record = today_record;
        if self.selected == today {
            self.other_record = DailyRecord::default();
        }
    }

    pub fn set_value(
        &mut self,
        category: HabitCategory,
        value: f64,
        goal: &CategoryGoal,
    ) -> Result<Edit, TrackerError> {
        let kind = self.guard_editable()?;
        let before = self.live();
        let record = before.with(category, goal.clamp(value));
        self.store_live(record);
        Ok(Edit {
            date: self.selected,
            kind,
            record,
            changed: record != before,
        })
    }

    pub fn increment(&mut self, category: HabitCategory, goal: &CategoryGoal) -> Result<Edit, TrackerError> {
        let current = self.live().get(category);
        self.set_value(category, current + goal.step, goal)
    }

    pub fn decrement(&mut self, category: HabitCategory, goal: &CategoryGoal) -> Result<Edit, TrackerError> {
        let current = self.live().get(category);
        self.set_value(category, current - goal.step, goal)
    }

    /// The date and record a save would write.
    pub fn commit_target(&self) -> Result<(NaiveDate, DailyRecord), TrackerError> {
        self.guard_editable()?;
        Ok((self.selected, self.live()))
    }

    fn guard_editable(&self) -> Result<DayKind, TrackerError> {
        let kind = self.kind();
        if kind.is_editable() {
            Ok(kind)
        } else {
            Err(TrackerError::ReadOnlyDate(date_key(self.selected)))
        }
    }

    fn store_live(&mut self, record: DailyRecord) {
        if self.selected == self.today {
            self.today_record = record;
        } else {
            self.other_record = record;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn goal(category: HabitCategory) -> CategoryGoal {
        CategoryGoal::default_for(category)
    }

    #[test]
    fn selecting_past_without_record_resets_to_zero() {
        let mut session = ActiveSession::new(today(), DailyRecord::new(6.0, 7.0, 3.0));
        session.select(today() - Duration::days(2), |_| None);
        assert_eq!(session.live(), DailyRecord::default());
        assert_eq!(session.kind(), DayKind::Past);
    }

    #[test]
    fn selecting_past_with_record_loads_it() {
        let stored = DailyRecord::new(4.0, 6.5, 5.0);
        let mut session = ActiveSession::new(today(), DailyRecord::default());
        session.select(today() - Duration::days(1), |_| Some(stored));
        assert_eq!(session.live(), stored);
    }

    #[test]
    fn selecting_today_never_reads_store() {
        let working = DailyRecord::new(6.0, 7.0, 3.0);
        let mut session = ActiveSession::new(today(), working);
        session.select(today() - Duration::days(1), |_| Some(DailyRecord::new(1.0, 1.0, 1.0)));
        session.select(today(), |_| panic!("today must not be looked up"));
        assert_eq!(session.live(), working);
    }

    #[test]
    fn partial_update_keeps_siblings() {
        let mut session = ActiveSession::new(today(), DailyRecord::new(5.0, 6.0, 2.0));
        session.set_value(HabitCategory::Sleep, 7.5, &goal(HabitCategory::Sleep)).unwrap();
        session.select(today(), |_| None);
        assert_eq!(session.live(), DailyRecord::new(5.0, 7.5, 2.0));
    }

    #[test]
    fn increment_at_max_is_noop() {
        let mut session = ActiveSession::new(today(), DailyRecord::new(0.0, 0.0, 12.0));
        let edit = session.increment(HabitCategory::Screen, &goal(HabitCategory::Screen)).unwrap();
        assert!(!edit.changed);
        assert_eq!(edit.record.screen, 12.0);
    }

    #[test]
    fn decrement_at_zero_is_noop() {
        let mut session = ActiveSession::new(today(), DailyRecord::default());
        let edit = session.decrement(HabitCategory::Water, &goal(HabitCategory::Water)).unwrap();
        assert!(!edit.changed);
        assert_eq!(edit.record.water, 0.0);
    }

    #[test]
    fn sleep_steps_by_half_hour() {
        let mut session = ActiveSession::new(today(), DailyRecord::new(0.0, 7.0, 0.0));
        let edit = session.increment(HabitCategory::Sleep, &goal(HabitCategory::Sleep)).unwrap();
        assert_eq!(edit.record.sleep, 7.5);
        assert_eq!(edit.kind, DayKind::Today);
    }

    #[test]
    fn set_value_clamps_out_of_range() {
        let mut session = ActiveSession::new(today(), DailyRecord::default());
        let edit = session.set_value(HabitCategory::Water, 40.0, &goal(HabitCategory::Water)).unwrap();
        assert_eq!(edit.record.water, 16.0);
        let edit = session.set_value(HabitCategory::Water, -4.0, &goal(HabitCategory::Water)).unwrap();
        assert_eq!(edit.record.water, 0.0);
    }

    #[test]
    fn future_selection_is_read_only() {
        let mut session = ActiveSession::new(today(), DailyRecord::new(3.0, 3.0, 3.0));
        session.select(today() + Duration::days(1), |_| Some(DailyRecord::new(9.0, 9.0, 9.0)));
        assert_eq!(session.live(), DailyRecord::default());

        let err = session.set_value(HabitCategory::Water, 2.0, &goal(HabitCategory::Water));
        assert!(matches!(err, Err(TrackerError::ReadOnlyDate(_))));
        assert!(session.increment(HabitCategory::Water, &goal(HabitCategory::Water)).is_err());
        assert!(session.commit_target().is_err());
        assert_eq!(session.today_record(), DailyRecord::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn editing_past_leaves_today_alone() {
        let mut session = ActiveSession::new(today(), DailyRecord::new(6.0, 7.0, 3.0));
        session.select(today() - Duration::days(3), |_| None);
        let edit = session.set_value(HabitCategory::Water, 2.0, &goal(HabitCategory::Water)).unwrap();
        assert_eq!(edit.kind, DayKind::Past);
        assert_eq!(session.today_record(), DailyRecord::new(6.0, 7.0, 3.0));
        assert_eq!(session.commit_target().unwrap(), (today() - Duration::days(3), edit.record));
    }

    #[test]
    fn roll_over_moves_selection_with_today() {
        let mut session = ActiveSession::new(today(), DailyRecord::new(6.0, 7.0, 3.0));
        let tomorrow = today() + Duration::days(1);
        session.roll_over(tomorrow, DailyRecord::default());
        assert_eq!(session.selected(), tomorrow);
        assert_eq!(session.kind(), DayKind::Today);
        assert_eq!(session.live(), DailyRecord::default());
    }
}
