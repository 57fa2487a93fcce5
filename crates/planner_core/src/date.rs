use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::NextDateError;

pub const DATE_FORMAT: &str = "%Y%m%d";

const MAX_YEAR: i32 = 9999;

/// A calendar day exchanged as an 8-digit `YYYYMMDD` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalDate(NaiveDate);

impl CanonicalDate {
    pub fn new(date: NaiveDate) -> Result<Self, NextDateError> {
        if (0..=MAX_YEAR).contains(&date.year()) {
            Ok(Self(date))
        } else {
            Err(NextDateError::DateOutOfRange)
        }
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).and_then(|date| Self::new(date).ok())
    }

    pub fn parse(input: &str) -> Result<Self, NextDateError> {
        let invalid = || NextDateError::InvalidDate(input.to_string());
        if input.len() != 8 || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = input[..4].parse().map_err(|_| invalid())?;
        let month: u32 = input[4..6].parse().map_err(|_| invalid())?;
        let day: u32 = input[6..].parse().map_err(|_| invalid())?;
        Self::from_ymd(year, month, day).ok_or_else(invalid)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn add_days(self, days: u64) -> Result<Self, NextDateError> {
        let next = self
            .0
            .checked_add_days(Days::new(days))
            .ok_or(NextDateError::DateOutOfRange)?;
        Self::new(next)
    }

    pub fn succ(self) -> Result<Self, NextDateError> {
        self.add_days(1)
    }

    // Feb 29 overflows into Mar 1 in common years.
    pub fn add_year(self) -> Result<Self, NextDateError> {
        let year = self.0.year() + 1;
        let next = NaiveDate::from_ymd_opt(year, self.0.month(), self.0.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
            .ok_or(NextDateError::DateOutOfRange)?;
        Self::new(next)
    }

    pub fn is_last_day_of_month(self) -> bool {
        is_last_day_of_month(self.0)
    }

    pub fn is_second_to_last_day_of_month(self) -> bool {
        is_second_to_last_day_of_month(self.0)
    }
}

pub(crate) fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt()
        .map_or(true, |next| next.month() != date.month())
}

pub(crate) fn is_second_to_last_day_of_month(date: NaiveDate) -> bool {
    match date.succ_opt() {
        Some(next) => next.month() == date.month() && is_last_day_of_month(next),
        None => false,
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl FromStr for CanonicalDate {
    type Err = NextDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<CanonicalDate> for NaiveDate {
    fn from(value: CanonicalDate) -> Self {
        value.0
    }
}

impl TryFrom<NaiveDate> for CanonicalDate {
    type Error = NextDateError;

    fn try_from(value: NaiveDate) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for CanonicalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
