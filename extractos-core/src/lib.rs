//! extractos-core: statement data model, normalizer and business-day utilities

pub mod account;
pub mod normalize;
pub mod statement;
pub mod time;

pub use account::{zero_pad, Account};
pub use normalize::{normalize, parse_timestamp, RawRecord};
pub use statement::{Cell, Row, StatementTable};
pub use time::{date_in_zone, is_business_day, previous_business_day, today_in, DEFAULT_TIMEZONE};
