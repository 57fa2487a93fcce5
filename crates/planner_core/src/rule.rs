use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::date::{is_last_day_of_month, is_second_to_last_day_of_month};
use crate::error::NextDateError;

pub const MAX_INTERVAL_DAYS: i64 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MonthDay {
    Day(u32),
    Last,
    SecondToLast,
}

impl MonthDay {
    fn parse(token: &str) -> Result<Self, NextDateError> {
        let invalid = || NextDateError::InvalidMonthDay(token.to_string());
        match token.parse::<i64>().map_err(|_| invalid())? {
            -1 => Ok(Self::Last),
            -2 => Ok(Self::SecondToLast),
            day @ 1..=31 => Ok(Self::Day(day as u32)),
            _ => Err(invalid()),
        }
    }

    fn matches(self, date: NaiveDate) -> bool {
        match self {
            Self::Day(day) => date.day() == day,
            Self::Last => is_last_day_of_month(date),
            Self::SecondToLast => is_second_to_last_day_of_month(date),
        }
    }
}

/// Parsed form of a task's `repeat` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceRule {
    None,
    Yearly,
    EveryNDays {
        interval: u32,
    },
    Weekly {
        days: BTreeSet<u32>,
    },
    MonthlyByDay {
        days: BTreeSet<MonthDay>,
        months: BTreeSet<u32>,
    },
    // Unrecognised kind, yields an empty next date instead of an error.
    Unknown(String),
}

impl RecurrenceRule {
    pub fn parse(rule: &str) -> Result<Self, NextDateError> {
        if rule.is_empty() {
            return Ok(Self::None);
        }

        let mut tokens = rule.split(' ');
        let kind = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();
        if kind != "y" && args.is_empty() {
            return Err(NextDateError::InvalidRuleFormat(rule.to_string()));
        }

        match kind {
            "y" => Ok(Self::Yearly),
            "d" => parse_interval(rule, args[0]).map(|interval| Self::EveryNDays { interval }),
            "w" => {
                let days = args[0]
                    .split(',')
                    .map(parse_weekday)
                    .collect::<Result<_, _>>()?;
                Ok(Self::Weekly { days })
            }
            "m" => {
                let days = args[0]
                    .split(',')
                    .map(MonthDay::parse)
                    .collect::<Result<_, _>>()?;
                let months = match args.get(1) {
                    Some(list) => list.split(',').map(parse_month).collect::<Result<_, _>>()?,
                    None => BTreeSet::new(),
                };
                Ok(Self::MonthlyByDay { days, months })
            }
            _ => Ok(Self::Unknown(rule.to_string())),
        }
    }

    pub fn matches(&self, date: NaiveDate, reference_year: i32) -> bool {
        match self {
            Self::Yearly | Self::EveryNDays { .. } => true,
            Self::Weekly { days } => days.contains(&date.weekday().num_days_from_sunday()),
            Self::MonthlyByDay { days, months } => {
                let day_match = days.iter().any(|spec| spec.matches(date));
                let month_match = months.is_empty()
                    || (months.contains(&date.month()) && date.year() == reference_year);
                day_match && month_match
            }
            Self::None | Self::Unknown(_) => false,
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T>(items: impl IntoIterator<Item = T>, render: impl Fn(T) -> String) -> String {
            items.into_iter().map(render).collect::<Vec<_>>().join(",")
        }

        match self {
            Self::None => Ok(()),
            Self::Yearly => write!(f, "y"),
            Self::EveryNDays { interval } => write!(f, "d {interval}"),
            Self::Weekly { days } => write!(f, "w {}", join(days, |d| d.to_string())),
            Self::MonthlyByDay { days, months } => {
                let days = join(days, |spec| match spec {
                    MonthDay::Day(day) => day.to_string(),
                    MonthDay::Last => "-1".to_string(),
                    MonthDay::SecondToLast => "-2".to_string(),
                });
                if months.is_empty() {
                    write!(f, "m {days}")
                } else {
                    write!(f, "m {days} {}", join(months, |m| m.to_string()))
                }
            }
            Self::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}

fn parse_interval(rule: &str, token: &str) -> Result<u32, NextDateError> {
    let interval: i64 = token
        .parse()
        .map_err(|_| NextDateError::InvalidRuleFormat(rule.to_string()))?;
    if interval > MAX_INTERVAL_DAYS {
        return Err(NextDateError::IntervalTooLarge(interval));
    }
    if interval < 1 {
        return Err(NextDateError::InvalidInterval(interval));
    }
    Ok(interval as u32)
}

fn parse_weekday(token: &str) -> Result<u32, NextDateError> {
    match token.parse::<i64>() {
        Ok(7) => Ok(0),
        Ok(day @ 0..=6) => Ok(day as u32),
        _ => Err(NextDateError::InvalidWeekday(token.to_string())),
    }
}

fn parse_month(token: &str) -> Result<u32, NextDateError> {
    match token.parse::<i64>() {
        Ok(month @ 1..=12) => Ok(month as u32),
        _ => Err(NextDateError::InvalidMonth(token.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn parses_every_rule_kind() {
        assert_eq!(RecurrenceRule::parse("").unwrap(), RecurrenceRule::None);
        assert_eq!(RecurrenceRule::parse("y").unwrap(), RecurrenceRule::Yearly);
        assert_eq!(
            RecurrenceRule::parse("d 400").unwrap(),
            RecurrenceRule::EveryNDays { interval: 400 }
        );
        assert_eq!(
            RecurrenceRule::parse("w 1,7,3").unwrap(),
            RecurrenceRule::Weekly {
                days: BTreeSet::from([0, 1, 3])
            }
        );
        assert_eq!(
            RecurrenceRule::parse("m -1,15,-2 2,8").unwrap(),
            RecurrenceRule::MonthlyByDay {
                days: BTreeSet::from([MonthDay::Day(15), MonthDay::Last, MonthDay::SecondToLast]),
                months: BTreeSet::from([2, 8]),
            }
        );
        assert_eq!(
            RecurrenceRule::parse("m 3").unwrap(),
            RecurrenceRule::MonthlyByDay {
                days: BTreeSet::from([MonthDay::Day(3)]),
                months: BTreeSet::new(),
            }
        );
    }

    #[test]
    fn rule_kind_without_arguments_is_malformed() {
        for rule in ["d", "w", "m", "x"] {
            assert_eq!(
                RecurrenceRule::parse(rule),
                Err(NextDateError::InvalidRuleFormat(rule.to_string()))
            );
        }
    }

    #[test]
    fn interval_bounds() {
        assert_eq!(
            RecurrenceRule::parse("d 401"),
            Err(NextDateError::IntervalTooLarge(401))
        );
        assert_eq!(
            RecurrenceRule::parse("d 0"),
            Err(NextDateError::InvalidInterval(0))
        );
        assert_eq!(
            RecurrenceRule::parse("d x"),
            Err(NextDateError::InvalidRuleFormat("d x".to_string()))
        );
    }

    #[test]
    fn rejects_out_of_range_lists() {
        assert_eq!(
            RecurrenceRule::parse("w 1,8"),
            Err(NextDateError::InvalidWeekday("8".to_string()))
        );
        assert_eq!(
            RecurrenceRule::parse("w mon"),
            Err(NextDateError::InvalidWeekday("mon".to_string()))
        );
        for day in ["0", "-3", "32", "x"] {
            assert_eq!(
                RecurrenceRule::parse(&format!("m {day}")),
                Err(NextDateError::InvalidMonthDay(day.to_string()))
            );
        }
        assert_eq!(
            RecurrenceRule::parse("m 1 13"),
            Err(NextDateError::InvalidMonth("13".to_string()))
        );
        assert_eq!(
            RecurrenceRule::parse("m 1 0"),
            Err(NextDateError::InvalidMonth("0".to_string()))
        );
    }

    #[test]
    fn unknown_kind_is_accepted_silently() {
        // Surprising but relied upon: an unrecognised prefix is not an error.
        assert_eq!(
            RecurrenceRule::parse("z 5").unwrap(),
            RecurrenceRule::Unknown("z 5".to_string())
        );
    }

    #[test]
    fn weekly_matches_sunday_through_seven() {
        let rule = RecurrenceRule::parse("w 7").unwrap();
        assert!(rule.matches(ymd(2024, 3, 3), 2024)); // Sunday
        assert!(!rule.matches(ymd(2024, 3, 4), 2024));
        let rule = RecurrenceRule::parse("w 1,3").unwrap();
        assert!(rule.matches(ymd(2024, 3, 4), 2024)); // Monday
        assert!(rule.matches(ymd(2024, 3, 6), 2024)); // Wednesday
        assert!(!rule.matches(ymd(2024, 3, 5), 2024));
    }

    #[test]
    fn monthly_matches_sentinels() {
        let rule = RecurrenceRule::parse("m -1,-2").unwrap();
        assert!(rule.matches(ymd(2023, 2, 28), 2023));
        assert!(rule.matches(ymd(2023, 2, 27), 2023));
        assert!(!rule.matches(ymd(2023, 2, 26), 2023));
        assert!(rule.matches(ymd(2024, 1, 30), 2024));
        assert!(rule.matches(ymd(2024, 1, 31), 2024));
    }

    #[test]
    fn month_list_only_matches_in_reference_year() {
        // Preserved quirk: month filters are scoped to the search year.
        let rule = RecurrenceRule::parse("m 10 1").unwrap();
        assert!(rule.matches(ymd(2024, 1, 10), 2024));
        assert!(!rule.matches(ymd(2025, 1, 10), 2024));
        assert!(!rule.matches(ymd(2024, 2, 10), 2024));
    }

    #[test]
    fn display_renders_normalised_rule() {
        assert_eq!(RecurrenceRule::parse("w 7,1").unwrap().to_string(), "w 0,1");
        assert_eq!(
            RecurrenceRule::parse("m -1,5 3").unwrap().to_string(),
            "m 5,-1 3"
        );
        assert_eq!(RecurrenceRule::parse("d 7").unwrap().to_string(), "d 7");
    }
}
