//! Application state: history, active session, goals and the displayed month.

use crate::calendar::{CalendarGrid, build_month_grid};
use crate::dates::{Clock, DayKind, YearMonth, date_key};
use crate::errors::{StoreError, TrackerError};
use crate::goals::GoalTable;
use crate::models::{DailyRecord, HabitCategory};
use crate::session::{ActiveSession, Edit, SessionSnapshot};
use crate::stats::{Dashboard, build_dashboard_at};
use crate::storage::HistoryStore;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, error, info};

/// A write of today's record waiting for its delay to elapse.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingWrite {
    seq: u64,
    date: NaiveDate,
    record: DailyRecord,
}

pub struct Tracker {
    store: HistoryStore,
    session: ActiveSession,
    goals: GoalTable,
    clock: Box<dyn Clock>,
    view_month: YearMonth,
    pending: Option<PendingWrite>,
    last_seq: u64,
}

impl Tracker {
    pub fn new(store: HistoryStore, goals: GoalTable, clock: impl Clock + 'static) -> Self {
        let today = clock.today();
        let session = ActiveSession::new(today, store.get_or_default(today));
        Self {
            store,
            session,
            goals,
            clock: Box::new(clock),
            view_month: YearMonth::of(today),
            pending: None,
            last_seq: 0,
        }
    }

    pub fn goals(&self) -> &GoalTable {
        &self.goals
    }

    pub fn history(&self) -> BTreeMap<String, DailyRecord> {
        self.store.snapshot()
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending.is_some()
    }

    pub fn snapshot(&mut self) -> SessionSnapshot {
        self.sync_clock();
        let kind = self.session.kind();
        SessionSnapshot {
            today: date_key(self.session.today()),
            selected_date: date_key(self.session.selected()),
            day_kind: kind,
            editable: kind.is_editable(),
            record: self.session.live(),
            view_month: self.view_month.to_string(),
            pending_write: self.pending.is_some(),
        }
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.sync_clock();
        let store = &self.store;
        self.session.select(date, |d| store.get(d));
        self.view_month = YearMonth::of(date);
        debug!(date = %date_key(date), kind = ?self.session.kind(), "date selected");
    }

    /// Sets one category. Today's record is persisted at once; other days stage
    /// the change until [`Tracker::commit`].
    pub fn set_value(&mut self, category: HabitCategory, value: f64) -> Result<DailyRecord, TrackerError> {
        self.sync_clock();
        let goal = self.goals.get(category);
        let edit = self.session.set_value(category, value, goal)?;
        self.write_through(edit)
    }

    /// Like [`Tracker::set_value`], but today's write is handed back as a
    /// sequence number for [`Tracker::flush_deferred`] instead of being written.
    pub fn set_value_deferred(
        &mut self,
        category: HabitCategory,
        value: f64,
    ) -> Result<Option<u64>, TrackerError> {
        self.sync_clock();
        let goal = self.goals.get(category);
        let edit = self.session.set_value(category, value, goal)?;
        if edit.kind != DayKind::Today || !edit.changed {
            return Ok(None);
        }
        self.last_seq += 1;
        self.pending = Some(PendingWrite {
            seq: self.last_seq,
            date: edit.date,
            record: edit.record,
        });
        Ok(Some(self.last_seq))
    }

    pub fn increment(&mut self, category: HabitCategory) -> Result<DailyRecord, TrackerError> {
        self.sync_clock();
        let goal = self.goals.get(category);
        let edit = self.session.increment(category, goal)?;
        self.write_through(edit)
    }

    pub fn decrement(&mut self, category: HabitCategory) -> Result<DailyRecord, TrackerError> {
        self.sync_clock();
        let goal = self.goals.get(category);
        let edit = self.session.decrement(category, goal)?;
        self.write_through(edit)
    }

    /// Saves the live record for the selected date.
    pub fn commit(&mut self) -> Result<(NaiveDate, DailyRecord), TrackerError> {
        self.sync_clock();
        let (date, record) = self.session.commit_target()?;
        self.supersede_pending(date);
        self.store.upsert(date, record)?;
        info!(date = %date_key(date), "record committed");
        Ok((date, record))
    }

    /// Writes a deferred record if `seq` is still the newest write. Returns
    /// whether anything was written.
    pub fn flush_deferred(&mut self, seq: u64) -> Result<bool, StoreError> {
        match self.pending {
            Some(pending) if pending.seq == seq => {
                self.pending = None;
                self.store.upsert(pending.date, pending.record)?;
                debug!(seq, date = %date_key(pending.date), "deferred write flushed");
                Ok(true)
            }
            _ => {
                debug!(seq, "deferred write superseded");
                Ok(false)
            }
        }
    }

    /// Writes whatever is pending regardless of sequence.
    pub fn flush_pending(&mut self) -> Result<bool, StoreError> {
        match self.pending {
            Some(pending) => self.flush_deferred(pending.seq),
            None => Ok(false),
        }
    }

    pub fn navigate_month(&mut self, delta: i32) -> Option<YearMonth> {
        let month = self.view_month.shift(delta)?;
        self.view_month = month;
        Some(month)
    }

    /// Grid for `month`, or the displayed month when `None`. `None` when the
    /// grid would run past the dates chrono can represent.
    pub fn calendar(&mut self, month: Option<YearMonth>) -> Option<CalendarGrid> {
        self.sync_clock();
        let today = self.session.today();
        let today_record = self.session.today_record();
        let store = &self.store;
        build_month_grid(
            month.unwrap_or(self.view_month),
            today,
            Some(self.session.selected()),
            &self.goals,
            |date| {
                if date == today {
                    today_record
                } else {
                    store.get_or_default(date)
                }
            },
        )
    }

    pub fn dashboard(&mut self) -> Dashboard {
        self.sync_clock();
        build_dashboard_at(
            self.session.today(),
            self.session.today_record(),
            &self.store,
            &self.goals,
        )
    }

    fn write_through(&mut self, edit: Edit) -> Result<DailyRecord, TrackerError> {
        if edit.kind == DayKind::Today && edit.changed {
            self.supersede_pending(edit.date);
            self.store.upsert(edit.date, edit.record)?;
            debug!(date = %date_key(edit.date), "today written through");
        }
        Ok(edit.record)
    }

    fn supersede_pending(&mut self, date: NaiveDate) {
        if self.pending.is_some_and(|p| p.date == date) {
            self.pending = None;
        }
    }

    fn sync_clock(&mut self) {
        let today = self.clock.today();
        if today != self.session.today() {
            info!(from = %date_key(self.session.today()), to = %date_key(today), "day rolled over");
            // A delayed write still belongs to the old day; once that day is
            // past it would only be reachable through staged edits.
            if let Err(err) = self.flush_pending() {
                error!("failed to persist pending write at rollover: {err}");
            }
            let record = self.store.get_or_default(today);
            self.session.roll_over(today, record);
        }
    }
}
