use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};

/// midnight UTC on the first day of the instant's month
pub fn first_of_month(t: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(t.year(), t.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(t)
}

/// signed number of whole calendar months from `earlier` to `later`.
///
/// `later` is stepped back by the calendar month difference, with a day past
/// the end of the target month rolling into the next one. If that lands
/// before `earlier`, the last month is partial and does not count. Two end
/// of month cases count as full: a `later` on Feb 28 or 29 is treated as the
/// 30th, and a `later` on the last day of its month counts when the calendar
/// difference is a single month. So Jan 31 -> Feb 28 is one month and
/// Mar 31 -> Jun 30 is two.
pub fn calendar_month_distance(later: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
    let sign: i64 = match later.cmp(&earlier) {
        Ordering::Greater => 1,
        Ordering::Less => -1,
        Ordering::Equal => return 0,
    };

    let difference = ((later.year() as i64 - earlier.year() as i64) * 12
        + (later.month() as i64 - earlier.month() as i64))
        .abs();
    if difference < 1 {
        return 0;
    }

    let mut anchor = later;
    if later.month() == 2 && later.day() > 27 {
        anchor = roll(anchor, 0, 29).unwrap_or(anchor);
    }
    let anchor = roll(anchor, -sign * difference, anchor.day0()).unwrap_or(anchor);

    let partial = if sign > 0 {
        anchor < earlier && !(difference == 1 && is_last_day_of_month(later))
    } else {
        anchor > earlier
    };

    sign * (difference - i64::from(partial))
}

/// `t` moved by `months` with day-of-month index `day0`, keeping the time of
/// day; days past the end of the month roll forward
fn roll(t: DateTime<Utc>, months: i64, day0: u32) -> Option<DateTime<Utc>> {
    let total = t.year() as i64 * 12 + t.month0() as i64 + months;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = total.rem_euclid(12) as u32 + 1;

    let date = NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_days(Days::new(u64::from(day0)))?;
    Some(Utc.from_utc_datetime(&date.and_time(t.time())))
}

fn is_last_day_of_month(t: DateTime<Utc>) -> bool {
    t.date_naive().succ_opt().map_or(true, |next| next.month() != t.month())
}
