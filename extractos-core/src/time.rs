//! Time utilities: business-day arithmetic and timezone-aware "today".

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;

/// Zone used to decide what "today" is when none is configured.
pub const DEFAULT_TIMEZONE: &str = "America/Argentina/Buenos_Aires";

/// Monday through Friday. Holidays are not considered.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The business day before `today`: Monday and weekends go back to Friday.
pub fn previous_business_day(today: NaiveDate) -> NaiveDate {
    let back = match today.weekday() {
        Weekday::Mon => 3,
        Weekday::Sun => 2,
        _ => 1,
    };
    today - Duration::days(back)
}

/// Calendar date of `now` in an IANA zone like "America/Argentina/Buenos_Aires".
pub fn date_in_zone(now: DateTime<Utc>, tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(now.with_timezone(&tz).date_naive())
}

pub fn today_in(tz: &str) -> Result<NaiveDate> {
    date_in_zone(Utc::now(), tz)
}
