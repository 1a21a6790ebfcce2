/// month boundaries - interest counts calendar months crossed, not days
use chrono::{TimeZone, Utc};
use gold_loan_engine::{compute_interest, Money, Rate};

fn main() {
    let principal = Money::from_major(10_000);
    let rate = Rate::from_percentage(2);
    let start = Utc.with_ymd_and_hms(2024, 1, 28, 0, 0, 0).unwrap();

    for (y, m, d) in [(2024, 1, 31), (2024, 2, 1), (2024, 2, 28), (2024, 3, 1), (2025, 1, 1)] {
        let as_of = Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
        let (interest, months) = compute_interest(principal, start, as_of, rate);
        println!(
            "{} -> {}: {} days, {} months, interest {}",
            start.format("%Y-%m-%d"),
            as_of.format("%Y-%m-%d"),
            (as_of - start).num_days(),
            months,
            interest
        );
    }
}
