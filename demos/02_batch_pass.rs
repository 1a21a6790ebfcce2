/// batch pass - nightly accrual over the whole book
use chrono::{TimeZone, Utc};
use gold_loan_engine::{
    CollateralRef, InMemoryLoanStore, LoanBook, LoanBookConfig, Money, NewLoan, OwnerRef,
    SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 6, 1, 2, 0, 0).unwrap()));
    let book = LoanBook::new(InMemoryLoanStore::new(), LoanBookConfig::default(), time)?;

    let starts = [(2024, 5, 20), (2024, 1, 3), (2023, 6, 15), (2023, 5, 1)];
    for (i, (y, m, d)) in starts.into_iter().enumerate() {
        book.originate(NewLoan {
            owner_ref: OwnerRef(format!("customer-{}", i)),
            collateral_ref: CollateralRef(format!("gold-{}", i)),
            principal: Money::from_major(20_000 + 5_000 * i as i64),
            start_date: Some(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()),
        })?;
    }

    let report = book.run_accrual_pass()?;
    println!(
        "processed {}, updated {}, expired {}, failed {}",
        report.processed(),
        report.changed(),
        report.expired(),
        report.failed()
    );

    let summary = book.summary()?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    for record in book.completed_loans()? {
        println!("{} {} written off {}", record.loan_id, record.reason, record.written_off);
    }

    Ok(())
}
