//! Reservation slot computation in the restaurant's local time.
//!
//! Every "now"-dependent answer is re-resolved from the [`Clock`] on each call,
//! so a long-lived [`BookingCalendar`] never serves a stale day.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::ScheduleConfig;
use crate::constants::schedule::{DEFAULT_CUTOFF_HOUR, DEFAULT_OPENING_HOUR, LAST_SLOT_HOUR};
use crate::models::TimeSlot;

const ISO_DATE: &str = "%Y-%m-%d";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant. Useful for previews and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    /// First bookable hour on a day that is not today.
    pub opening_hour: u32,

    /// From this local hour on, today is closed for new bookings.
    pub cutoff_hour: u32,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            opening_hour: DEFAULT_OPENING_HOUR,
            cutoff_hour: DEFAULT_CUTOFF_HOUR,
        }
    }
}

/// Emits `HH:00` and `HH:30` for every hour from `start_hour` through 23.
///
/// A start hour past 23 is a valid input and yields no slots.
#[must_use]
pub fn generate_time_slots(start_hour: u32) -> Vec<TimeSlot> {
    (start_hour..=LAST_SLOT_HOUR)
        .flat_map(|hour| [TimeSlot::new(hour, 0), TimeSlot::new(hour, 30)])
        .collect()
}

#[derive(Clone)]
pub struct BookingCalendar {
    timezone: Tz,
    hours: BusinessHours,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for BookingCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingCalendar")
            .field("timezone", &self.timezone)
            .field("hours", &self.hours)
            .finish_non_exhaustive()
    }
}

impl Default for BookingCalendar {
    fn default() -> Self {
        Self::new(chrono_tz::Europe::Belgrade, BusinessHours::default())
    }
}

impl BookingCalendar {
    #[must_use]
    pub fn new(timezone: Tz, hours: BusinessHours) -> Self {
        Self::with_clock(timezone, hours, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(timezone: Tz, hours: BusinessHours, clock: Arc<dyn Clock>) -> Self {
        Self {
            timezone,
            hours,
            clock,
        }
    }

    pub fn from_config(config: &ScheduleConfig) -> anyhow::Result<Self> {
        let timezone = config.timezone()?;
        Ok(Self::new(
            timezone,
            BusinessHours {
                opening_hour: config.opening_hour,
                cutoff_hour: config.cutoff_hour,
            },
        ))
    }

    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    #[must_use]
    pub const fn hours(&self) -> BusinessHours {
        self.hours
    }

    #[must_use]
    pub fn current_time(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.timezone)
    }

    fn current_date(&self) -> NaiveDate {
        self.current_time().date_naive()
    }

    #[must_use]
    pub fn today(&self) -> String {
        self.current_date().format(ISO_DATE).to_string()
    }

    /// Today, or tomorrow once the cutoff hour has been reached.
    #[must_use]
    pub fn today_or_next_day(&self) -> String {
        let now = self.current_time();
        let date = now.date_naive();

        let date = if now.hour() >= self.hours.cutoff_hour {
            date.succ_opt().unwrap_or(date)
        } else {
            date
        };

        date.format(ISO_DATE).to_string()
    }

    #[must_use]
    pub fn is_today(&self, date: &str) -> bool {
        date == self.today()
    }

    #[must_use]
    pub fn all_time_slots(&self) -> Vec<TimeSlot> {
        generate_time_slots(self.hours.opening_hour)
    }

    /// Slots still bookable on `selected_date`.
    ///
    /// Today's slots begin on the next full hour: at 14:37 the first slot is
    /// 15:00, never 15:30.
    #[must_use]
    pub fn available_time_slots(&self, selected_date: &str) -> Vec<TimeSlot> {
        let now = self.current_time();

        if selected_date != now.date_naive().format(ISO_DATE).to_string() {
            return self.all_time_slots();
        }

        if now.hour() >= self.hours.cutoff_hour {
            return Vec::new();
        }

        generate_time_slots(now.hour() + 1)
    }

    /// Binds the calendar to an externally owned selected date.
    #[must_use]
    pub fn time_options(&self, selected: &SelectedDate) -> TimeOptions {
        TimeOptions {
            calendar: self.clone(),
            selected: selected.subscribe(),
        }
    }
}

/// The mutable date a front-end edits.
#[derive(Debug)]
pub struct SelectedDate {
    tx: watch::Sender<String>,
}

impl SelectedDate {
    #[must_use]
    pub fn new(date: impl Into<String>) -> Self {
        let (tx, _) = watch::channel(date.into());
        Self { tx }
    }

    pub fn set(&self, date: impl Into<String>) {
        let date = date.into();
        self.tx.send_if_modified(|current| {
            if *current == date {
                false
            } else {
                *current = date;
                true
            }
        });
    }

    #[must_use]
    pub fn get(&self) -> String {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

/// Available slots for the bound date, recomputed on every read.
#[derive(Debug, Clone)]
pub struct TimeOptions {
    calendar: BookingCalendar,
    selected: watch::Receiver<String>,
}

impl TimeOptions {
    #[must_use]
    pub fn selected_date(&self) -> String {
        self.selected.borrow().clone()
    }

    #[must_use]
    pub fn get(&self) -> Vec<TimeSlot> {
        let date = self.selected.borrow().clone();
        self.calendar.available_time_slots(&date)
    }

    /// Resolves once the bound date changes, yielding the fresh slots.
    /// Returns `None` when the [`SelectedDate`] has been dropped.
    pub async fn changed(&mut self) -> Option<Vec<TimeSlot>> {
        self.selected.changed().await.ok()?;
        Some(self.get())
    }
}
