use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::trace;

use crate::date::CanonicalDate;
use crate::error::NextDateError;
use crate::rule::RecurrenceRule;

// Misses allowed once the candidate is past the reference; every satisfiable rule matches within a year.
pub const MAX_SEARCH_DAYS: u32 = 366;

/// First date strictly after `reference` on which a task scheduled for `start` recurs.
pub fn next_date(
    reference: NaiveDateTime,
    start: &str,
    repeat: &str,
) -> Result<String, NextDateError> {
    if repeat.is_empty() {
        return Ok(String::new());
    }
    let start = CanonicalDate::parse(start)?;
    let rule = RecurrenceRule::parse(repeat)?;
    let next = advance(reference.date(), start, &rule)?;
    Ok(next.map(|date| date.to_string()).unwrap_or_default())
}

pub fn advance(
    reference: NaiveDate,
    start: CanonicalDate,
    rule: &RecurrenceRule,
) -> Result<Option<CanonicalDate>, NextDateError> {
    trace!(%reference, %start, %rule, "advancing recurring date");
    let mut date = start;
    match rule {
        RecurrenceRule::None | RecurrenceRule::Unknown(_) => return Ok(None),
        RecurrenceRule::Yearly => loop {
            date = date.add_year()?;
            if date.date() > reference {
                break;
            }
        },
        RecurrenceRule::EveryNDays { interval } => loop {
            date = date.add_days(u64::from(*interval))?;
            if date.date() > reference {
                break;
            }
        },
        RecurrenceRule::Weekly { .. } | RecurrenceRule::MonthlyByDay { .. } => {
            date = scan_days(reference, start, rule)?;
        }
    }
    Ok(Some(date))
}

fn scan_days(
    reference: NaiveDate,
    start: CanonicalDate,
    rule: &RecurrenceRule,
) -> Result<CanonicalDate, NextDateError> {
    let reference_year = reference.year();
    let mut date = start;
    let mut misses_after_reference = 0;
    loop {
        date = date.succ()?;
        if date.date() <= reference {
            continue;
        }
        if rule.matches(date.date(), reference_year) {
            return Ok(date);
        }
        misses_after_reference += 1;
        if misses_after_reference >= MAX_SEARCH_DAYS {
            return Err(NextDateError::SearchExhausted {
                rule: rule.to_string(),
                days: MAX_SEARCH_DAYS,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn at(raw: &str) -> NaiveDateTime {
        CanonicalDate::parse(raw)
            .unwrap()
            .date()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn days_between(from: &str, to: &str) -> i64 {
        let from = CanonicalDate::parse(from).unwrap().date();
        let to = CanonicalDate::parse(to).unwrap().date();
        (to - from).num_days()
    }

    #[test]
    fn empty_repeat_yields_empty_result() {
        assert_eq!(next_date(at("20240110"), "20240101", "").unwrap(), "");
        assert_eq!(next_date(at("20240110"), "garbage", "").unwrap(), "");
    }

    #[test]
    fn every_n_days_stops_at_first_step_after_reference() {
        assert_eq!(
            next_date(at("20240110"), "20240101", "d 5").unwrap(),
            "20240111"
        );
        assert_eq!(
            next_date(at("20240111"), "20240101", "d 5").unwrap(),
            "20240116"
        );
        assert_eq!(
            next_date(at("20240101"), "20240101", "d 1").unwrap(),
            "20240102"
        );
    }

    #[test]
    fn every_n_days_moves_in_whole_intervals() {
        for (start, rule, interval) in [
            ("20200229", "d 7", 7),
            ("20231225", "d 400", 400),
            ("20240131", "d 30", 30),
        ] {
            let next = next_date(at("20250601"), start, rule).unwrap();
            let distance = days_between(start, &next);
            assert!(distance > 0);
            assert_eq!(distance % interval, 0, "{start} {rule} -> {next}");
            assert!(days_between("20250601", &next) > 0);
        }
    }

    #[test]
    fn future_start_still_advances_once() {
        assert_eq!(
            next_date(at("20240110"), "20240301", "d 3").unwrap(),
            "20240304"
        );
        assert_eq!(
            next_date(at("20240110"), "20240301", "y").unwrap(),
            "20250301"
        );
    }

    #[test]
    fn yearly_rule() {
        assert_eq!(
            next_date(at("20240110"), "20240101", "y").unwrap(),
            "20250101"
        );
        assert_eq!(
            next_date(at("20240110"), "20100615", "y").unwrap(),
            "20240615"
        );
        assert_eq!(
            next_date(at("20240301"), "20200229", "y").unwrap(),
            "20250301"
        );
    }

    #[test]
    fn yearly_leap_day_rolls_over_and_stays_on_march_first() {
        assert_eq!(
            next_date(at("20240101"), "20200229", "y").unwrap(),
            "20240301"
        );
    }

    #[test]
    fn weekly_rule_picks_next_listed_weekday() {
        let next = next_date(at("20240301"), "20240228", "w 1,3").unwrap();
        assert_eq!(next, "20240304");
        assert_eq!(
            CanonicalDate::parse(&next).unwrap().date().weekday(),
            Weekday::Mon
        );
        assert_eq!(
            next_date(at("20240301"), "20240228", "w 7").unwrap(),
            "20240303"
        );
        assert_eq!(
            next_date(at("20240301"), "20240228", "w 0").unwrap(),
            "20240303"
        );
    }

    #[test]
    fn weekly_match_before_reference_is_skipped() {
        // 2024-02-29 is a Thursday but not after the reference.
        assert_eq!(
            next_date(at("20240301"), "20240220", "w 4").unwrap(),
            "20240307"
        );
    }

    #[test]
    fn reference_time_of_day_does_not_change_the_result() {
        let late = CanonicalDate::parse("20240110")
            .unwrap()
            .date()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(next_date(late, "20240101", "d 5").unwrap(), "20240111");
    }

    #[test]
    fn monthly_positive_days() {
        assert_eq!(
            next_date(at("20240126"), "20240126", "m 25,5").unwrap(),
            "20240205"
        );
        assert_eq!(
            next_date(at("20240201"), "20240201", "m 31").unwrap(),
            "20240331"
        );
    }

    #[test]
    fn monthly_negative_days() {
        assert_eq!(
            next_date(at("20240201"), "20240201", "m -1").unwrap(),
            "20240229"
        );
        assert_eq!(
            next_date(at("20230201"), "20230201", "m -2").unwrap(),
            "20230227"
        );
        assert_eq!(
            next_date(at("20240228"), "20240228", "m -1,-2").unwrap(),
            "20240229"
        );
    }

    #[test]
    fn monthly_with_month_filter_in_reference_year() {
        assert_eq!(
            next_date(at("20240115"), "20240101", "m 1,31 3,6").unwrap(),
            "20240301"
        );
        assert_eq!(
            next_date(at("20240305"), "20240101", "m 1,31 3,6").unwrap(),
            "20240331"
        );
    }

    #[test]
    fn month_filter_never_crosses_into_next_year() {
        // Surprising but preserved: the January match in 2025 is rejected
        // because month filters only apply inside the reference year.
        assert_eq!(
            next_date(at("20241215"), "20241215", "m 1 1"),
            Err(NextDateError::SearchExhausted {
                rule: "m 1 1".to_string(),
                days: MAX_SEARCH_DAYS,
            })
        );
    }

    #[test]
    fn unknown_rule_kind_yields_empty_result() {
        // Surprising but preserved: an unrecognised prefix is not an error.
        assert_eq!(next_date(at("20240110"), "20240101", "q 3").unwrap(), "");
    }

    #[test]
    fn propagates_validation_errors() {
        assert_eq!(
            next_date(at("20240110"), "20240115", "d 401"),
            Err(NextDateError::IntervalTooLarge(401))
        );
        assert_eq!(
            next_date(at("20240110"), "2024-01-15", "d 4"),
            Err(NextDateError::InvalidDate("2024-01-15".to_string()))
        );
        assert_eq!(
            next_date(at("20240110"), "20240115", "w"),
            Err(NextDateError::InvalidRuleFormat("w".to_string()))
        );
        assert_eq!(
            next_date(at("20240110"), "20240115", "m 32"),
            Err(NextDateError::InvalidMonthDay("32".to_string()))
        );
    }

    #[test]
    fn is_deterministic() {
        let first = next_date(at("20240501"), "20240101", "m -2,14 5,7").unwrap();
        for _ in 0..3 {
            assert_eq!(
                next_date(at("20240501"), "20240101", "m -2,14 5,7").unwrap(),
                first
            );
        }
        assert_eq!(first, "20240514");
    }

    #[test]
    fn overflow_past_year_9999_is_reported() {
        assert_eq!(
            next_date(at("99991231"), "99991230", "d 5"),
            Err(NextDateError::DateOutOfRange)
        );
    }
}
