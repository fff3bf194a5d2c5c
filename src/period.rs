//! A calendar month used to scope transactions and budgets.

use std::{fmt::Display, ops::RangeInclusive};

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{Error, timezone::local_today};

/// A (month, year) pair.
///
/// A period covers every day of the month inclusively, from the first day of
/// the month to the last day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    month: u8,
    year: i32,
}

impl Period {
    /// Create a period for `month` (1 to 12) of `year`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidPeriod] if `month` is not 1 to 12 or `year`
    /// is outside the supported calendar range.
    pub fn new(month: u8, year: i32) -> Result<Self, Error> {
        let invalid = || Error::InvalidPeriod { month, year };
        let month_of_year = Month::try_from(month).map_err(|_| invalid())?;

        // Both ends of the month must be representable.
        let first_day = Date::from_calendar_date(year, month_of_year, 1).map_err(|_| invalid())?;
        last_day_of_month(first_day).ok_or_else(invalid)?;

        Ok(Self { month, year })
    }

    /// The period containing `date`.
    pub fn containing(date: Date) -> Self {
        Self {
            month: date.month() as u8,
            year: date.year(),
        }
    }

    /// The period containing today's date in `canonical_timezone`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidTimezoneError] if the timezone is not recognised.
    pub fn current(canonical_timezone: &str) -> Result<Self, Error> {
        local_today(canonical_timezone).map(Self::containing)
    }

    /// The month number, 1 to 12.
    pub fn month(&self) -> u8 {
        self.month
    }

    /// The year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Date {
        // Validated in the constructors.
        Date::from_calendar_date(self.year, self.month_of_year(), 1).unwrap_or(Date::MIN)
    }

    /// The last day of the month.
    pub fn last_day(&self) -> Date {
        last_day_of_month(self.first_day()).unwrap_or(Date::MAX)
    }

    /// Every day of the month, inclusive on both ends.
    pub fn date_range(&self) -> RangeInclusive<Date> {
        self.first_day()..=self.last_day()
    }

    /// Whether `date` falls within this month.
    pub fn contains(&self, date: Date) -> bool {
        self.date_range().contains(&date)
    }

    /// The period `months` months before this one.
    ///
    /// Returns `None` if the result would fall outside the supported calendar range.
    pub fn months_before(&self, months: u32) -> Option<Self> {
        let index = i64::from(self.year) * 12 + i64::from(self.month) - 1 - i64::from(months);
        let year = i32::try_from(index.div_euclid(12)).ok()?;
        let month = u8::try_from(index.rem_euclid(12) + 1).ok()?;

        Self::new(month, year).ok()
    }

    /// A short label such as "Jan 2025".
    pub fn label(&self) -> String {
        let month = match self.month_of_year() {
            Month::January => "Jan",
            Month::February => "Feb",
            Month::March => "Mar",
            Month::April => "Apr",
            Month::May => "May",
            Month::June => "Jun",
            Month::July => "Jul",
            Month::August => "Aug",
            Month::September => "Sep",
            Month::October => "Oct",
            Month::November => "Nov",
            Month::December => "Dec",
        };

        format!("{month} {}", self.year)
    }

    fn month_of_year(&self) -> Month {
        Month::try_from(self.month).unwrap_or(Month::January)
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

fn last_day_of_month(first_day: Date) -> Option<Date> {
    let next_month = first_day.month().next();
    let year = if next_month == Month::January {
        first_day.year().checked_add(1)?
    } else {
        first_day.year()
    };

    match Date::from_calendar_date(year, next_month, 1) {
        Ok(first_of_next_month) => first_of_next_month.previous_day(),
        // The month is the last representable month.
        Err(_) => Some(Date::MAX),
    }
}

/// Query parameters selecting a period, e.g. `?month=3&year=2025`.
///
/// Missing values are taken from the current month.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PeriodQuery {
    /// The month number, 1 to 12.
    pub month: Option<u8>,
    /// The year.
    pub year: Option<i32>,
}

impl PeriodQuery {
    /// Resolve the query to a period, filling in missing values from the
    /// current month in `canonical_timezone`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidPeriod] if the month or year are invalid, or
    /// an [Error::InvalidTimezoneError] if the timezone is not recognised.
    pub fn resolve(&self, canonical_timezone: &str) -> Result<Period, Error> {
        match (self.month, self.year) {
            (Some(month), Some(year)) => Period::new(month, year),
            (month, year) => {
                let current = Period::current(canonical_timezone)?;
                Period::new(
                    month.unwrap_or(current.month),
                    year.unwrap_or(current.year),
                )
            }
        }
    }
}
