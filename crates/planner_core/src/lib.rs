pub mod clock;
pub mod date;
pub mod error;
pub mod next_date;
pub mod normalize;
pub mod rule;
pub mod task;

pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::date::CanonicalDate;
pub use crate::error::NextDateError;
pub use crate::next_date::{next_date, MAX_SEARCH_DAYS};
pub use crate::normalize::{check_date, normalize};
pub use crate::rule::{MonthDay, RecurrenceRule};
pub use crate::task::Task;
