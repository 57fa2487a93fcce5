use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NextDateError {
    #[error("invalid date `{0}`, expected YYYYMMDD")]
    InvalidDate(String),
    #[error("wrong repeat format `{0}`")]
    InvalidRuleFormat(String),
    #[error("interval {0} is too big, at most 400 days are allowed")]
    IntervalTooLarge(i64),
    #[error("interval {0} must be at least one day")]
    InvalidInterval(i64),
    #[error("wrong weekday number `{0}`")]
    InvalidWeekday(String),
    #[error("bad month day number `{0}`")]
    InvalidMonthDay(String),
    #[error("wrong month number `{0}`")]
    InvalidMonth(String),
    #[error("no date matching `{rule}` within {days} days of the reference date")]
    SearchExhausted { rule: String, days: u32 },
    #[error("date is outside the supported range")]
    DateOutOfRange,
}
