//! Attendance Windows
//!
//! Admin attendance sheets show lectures completed per student per day over a
//! fixed 14-day window starting on a Monday. Thirteen two-week periods
//! (about six months) are offered for selection.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// 출석부 표시 기간 (일)
pub const WINDOW_DAYS: i64 = 14;

/// 선택 가능한 기간 수 (2주 × 13 = 26주)
pub const PERIOD_OPTIONS: i64 = 13;

/// 14-day attendance window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttendanceWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Selectable period: `value` is `start,end` in ISO format
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodOption {
    pub value: String,
    pub label: String,
}

impl AttendanceWindow {
    /// Window starting on `start`; always `WINDOW_DAYS` long.
    pub fn starting(start: NaiveDate) -> Self {
        Self {
            start,
            end: start + Duration::days(WINDOW_DAYS - 1),
        }
    }

    /// Window starting on this week's Monday.
    pub fn current(today: NaiveDate) -> Self {
        Self::starting(monday_of(today))
    }

    /// Parse a `YYYY-MM-DD,YYYY-MM-DD` period. Only the start date decides
    /// the window; the end is recomputed.
    pub fn parse(period: &str) -> CoreResult<Self> {
        let (start, end) = period
            .split_once(',')
            .ok_or_else(|| CoreError::InvalidPeriod(period.to_string()))?;

        let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d")
            .map_err(|_| CoreError::InvalidPeriod(period.to_string()))?;
        NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d")
            .map_err(|_| CoreError::InvalidPeriod(period.to_string()))?;

        Ok(Self::starting(start))
    }

    /// Requested period, or the current one when missing or malformed.
    pub fn resolve(today: NaiveDate, period: Option<&str>) -> Self {
        period
            .and_then(|p| Self::parse(p).ok())
            .unwrap_or_else(|| Self::current(today))
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        (0..WINDOW_DAYS)
            .map(|offset| self.start + Duration::days(offset))
            .collect()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn value(&self) -> String {
        format!("{},{}", self.start, self.end)
    }
}

/// Thirteen two-week periods going back from this week's Monday.
pub fn period_options(today: NaiveDate) -> Vec<PeriodOption> {
    let monday = monday_of(today);

    (0..PERIOD_OPTIONS)
        .map(|i| {
            let window = AttendanceWindow::starting(monday - Duration::days(WINDOW_DAYS * i));
            PeriodOption {
                value: window.value(),
                label: format!("{} ~ {}", window.start, window.end),
            }
        })
        .collect()
}

/// Spread `(user_id, day, completed_count)` rows over the window.
///
/// Every user in `user_ids` gets a row of `WINDOW_DAYS` counts, zero-filled.
/// Rows outside the window or for unknown users are dropped.
pub fn daily_counts(
    window: &AttendanceWindow,
    user_ids: &[i64],
    activity: &[(i64, NaiveDate, i64)],
) -> BTreeMap<i64, Vec<i64>> {
    let mut grid: BTreeMap<i64, Vec<i64>> = user_ids
        .iter()
        .map(|id| (*id, vec![0; WINDOW_DAYS as usize]))
        .collect();

    for (user_id, day, count) in activity {
        if !window.contains(*day) {
            continue;
        }
        if let Some(row) = grid.get_mut(user_id) {
            let offset = (*day - window.start).num_days() as usize;
            row[offset] += count;
        }
    }

    grid
}

fn monday_of(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}
