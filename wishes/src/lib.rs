#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod calendar;
pub mod edit;
pub mod format;
pub mod parse;
pub mod product;
pub mod stats;
pub mod store;

use std::fmt::{Display, Formatter};

use chrono::{Datelike, Local, TimeDelta};

pub use chrono::NaiveDate;
pub use product::{Currency, Price, Priority, Product, ProductId, Status};
pub use rust_decimal::Decimal;

/// A calendar day (year, month, day) with no time of day and no timezone.
///
/// Timestamps are truncated to this type before they reach the calendar, so two
/// products bought on the same local day always share a key.
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone)]
pub struct Date(pub NaiveDate);

impl Date {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    #[must_use]
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.0.month()
    }

    #[must_use]
    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// Weekday index with Sunday as 0.
    #[must_use]
    pub fn weekday_from_sunday(self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    /// Moves by whole days, `None` outside the representable range.
    #[must_use]
    pub fn add_days(self, days: i64) -> Option<Self> {
        self.0.checked_add_signed(TimeDelta::try_days(days)?).map(Self)
    }

    #[must_use]
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for Date {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// A value together with the snapshot row it came from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Positioned<T> {
    pub row: usize,
    pub value: T,
}

impl<T> Positioned<T> {
    pub fn new(row: usize, value: T) -> Positioned<T> {
        Self { row, value }
    }
}
