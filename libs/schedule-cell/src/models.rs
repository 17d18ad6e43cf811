use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::ScheduleError;

static TIME_OF_DAY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("time-of-day pattern is valid")
});

pub const MINUTES_PER_DAY: u16 = 24 * 60;

// ==============================================================================
// TIME VALUES
// ==============================================================================

/// Wall-clock time as minutes since midnight. Always in `0..1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Compile-time constructor for policy constants.
    pub const fn at(hour: u16, minute: u16) -> Self {
        assert!(hour < 24 && minute < 60, "time of day out of range");
        Self(hour * 60 + minute)
    }

    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(hour * 60 + minute))
        } else {
            None
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        if minutes < MINUTES_PER_DAY as u32 {
            Some(Self(minutes as u16))
        } else {
            None
        }
    }

    /// Parses strict `HH:MM`; anything else is a `Format` error.
    pub fn parse(raw: &str) -> Result<Self, ScheduleError> {
        let caps = TIME_OF_DAY_PATTERN
            .captures(raw)
            .ok_or_else(|| ScheduleError::format(raw))?;

        let hour: u16 = caps[1].parse().map_err(|_| ScheduleError::format(raw))?;
        let minute: u16 = caps[2].parse().map_err(|_| ScheduleError::format(raw))?;

        Self::from_hm(hour, minute).ok_or_else(|| ScheduleError::format(raw))
    }

    /// Parses a stored column value. Postgres `time` columns come back as
    /// `HH:MM:SS`; seconds are dropped. Plain `HH:MM` is accepted too.
    pub fn parse_stored(raw: &str) -> Result<Self, ScheduleError> {
        if let Ok(time) = Self::parse(raw) {
            return Ok(time);
        }

        let time = NaiveTime::parse_from_str(raw, "%H:%M:%S").map_err(|_| ScheduleError::format(raw))?;
        Self::from_hm(time.hour() as u16, time.minute() as u16).ok_or_else(|| ScheduleError::format(raw))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeOfDay::parse_stored(&raw).map_err(de::Error::custom)
    }
}

/// Half-open `[start, end)` span within one day. Fields are public so that a
/// malformed span can still be carried around and rejected by the checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl Interval {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, ScheduleError> {
        let interval = Self { start, end };
        if interval.is_well_formed() {
            Ok(interval)
        } else {
            Err(ScheduleError::Ordering {
                start: start.to_string(),
                end: end.to_string(),
            })
        }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ScheduleError> {
        Self::new(TimeOfDay::parse(start)?, TimeOfDay::parse(end)?)
    }

    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    /// True when `other` lies entirely inside this interval.
    pub fn contains(&self, other: &Interval) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ScheduleError> {
        if end < start {
            return Err(ScheduleError::InvalidRequest(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    /// Monday-to-Sunday week containing `date`.
    pub fn week_of(date: NaiveDate) -> Self {
        let start = week_start(date);
        Self { start, end: start + Duration::days(6) }
    }

    /// Calendar month containing `date`, first through last day.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date - Duration::days(date.day0() as i64);
        let end = start + Months::new(1) - Duration::days(1);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Smallest range covering both.
    pub fn union(&self, other: &DateRange) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

// ==============================================================================
// SHIFTS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonRole {
    Doctor,
    Staff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    Scheduled,
    Active,
    Completed,
    Cancelled,
}

impl ShiftStatus {
    /// Every status except `Cancelled` still holds time on the calendar.
    pub fn is_committed(self) -> bool {
        !matches!(self, ShiftStatus::Cancelled)
    }

    /// Shifts that can still take appointments.
    pub fn is_bookable(self) -> bool {
        matches!(self, ShiftStatus::Scheduled | ShiftStatus::Active)
    }

    pub fn can_transition_to(self, next: ShiftStatus) -> bool {
        matches!(
            (self, next),
            (ShiftStatus::Scheduled, ShiftStatus::Active)
                | (ShiftStatus::Scheduled, ShiftStatus::Cancelled)
                | (ShiftStatus::Active, ShiftStatus::Completed)
                | (ShiftStatus::Active, ShiftStatus::Cancelled)
        )
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShiftStatus::Scheduled => "scheduled",
            ShiftStatus::Active => "active",
            ShiftStatus::Completed => "completed",
            ShiftStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub id: Uuid,
    pub person_id: Uuid,
    pub person_role: PersonRole,
    pub shift_date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub location_id: Uuid,
    pub status: ShiftStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShiftAssignment {
    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.status.is_committed()
    }
}

/// Incoming shift proposal. Times stay raw so format problems are reported
/// alongside every other validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftDraft {
    pub person_id: Uuid,
    pub person_role: PersonRole,
    pub shift_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub location_id: Uuid,
}

/// A validated draft, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShift {
    pub person_id: Uuid,
    pub person_role: PersonRole,
    pub shift_date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub location_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateShiftTimesRequest {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateShiftStatusRequest {
    pub status: ShiftStatus,
}

// ==============================================================================
// BOOKINGS AND FACILITIES
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    #[serde(rename = "no-show")]
    NoShow,
}

impl BookingStatus {
    pub fn occupies_slot(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentBooking {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub status: BookingStatus,
}

impl AppointmentBooking {
    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    #[serde(rename = "id")]
    pub location_id: Uuid,
    pub name: String,
    /// Weekdays missing from the map are closed.
    pub operating_hours: HashMap<Weekday, Interval>,
}

impl Facility {
    pub fn window_for(&self, weekday: Weekday) -> Option<&Interval> {
        self.operating_hours.get(&weekday)
    }
}

// ==============================================================================
// RESULTS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenSlot {
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl OpenSlot {
    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<ScheduleError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors: errors.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSummary {
    pub person_id: Uuid,
    pub reference_date: NaiveDate,
    pub week_start: NaiveDate,
    pub weekly_hours: f64,
    pub weekly_ceiling: f64,
    pub weekly_remaining: f64,
    pub month_start: NaiveDate,
    pub monthly_hours: f64,
    pub monthly_ceiling: Option<f64>,
}

/// One week of committed shifts, grouped by person. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyRosterSnapshot {
    pub week_start: NaiveDate,
    pub shifts_by_person: BTreeMap<Uuid, Vec<ShiftAssignment>>,
}

impl WeeklyRosterSnapshot {
    /// Drops cancelled shifts and shifts outside the week; each person's
    /// sequence is ordered by date then start time.
    pub fn from_shifts(week_start: NaiveDate, shifts: impl IntoIterator<Item = ShiftAssignment>) -> Self {
        let week = DateRange::week_of(week_start);
        let mut shifts_by_person: BTreeMap<Uuid, Vec<ShiftAssignment>> = BTreeMap::new();

        for shift in shifts {
            if shift.is_committed() && week.contains(shift.shift_date) {
                shifts_by_person.entry(shift.person_id).or_default().push(shift);
            }
        }

        for shifts in shifts_by_person.values_mut() {
            shifts.sort_by_key(|s| (s.shift_date, s.start_time));
        }

        Self {
            week_start: week.start,
            shifts_by_person,
        }
    }

    pub fn roster_size(&self) -> usize {
        self.shifts_by_person.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonShiftPattern {
    pub person_id: Uuid,
    pub total_shifts: usize,
    pub full_time_days: usize,
    pub part_time_shifts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingReport {
    pub week_start: NaiveDate,
    pub roster_size: usize,
    pub policy_applied: bool,
    pub people: Vec<PersonShiftPattern>,
    pub violations: Vec<String>,
}
