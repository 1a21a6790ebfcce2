/// quick start - open a gold loan, let interest accrue, repay it
use chrono::{TimeZone, Utc};
use gold_loan_engine::{
    CollateralRef, InMemoryLoanStore, LoanBook, LoanBookConfig, Money, NewLoan, OwnerRef,
    PaymentDetails, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()));
    let control = time.test_control().unwrap();
    let book = LoanBook::new(InMemoryLoanStore::new(), LoanBookConfig::default(), time.clone())?;

    let loan = book.originate(NewLoan {
        owner_ref: OwnerRef("customer-42".to_string()),
        collateral_ref: CollateralRef("ring-22k-8g".to_string()),
        principal: Money::from_major(50_000),
        start_date: None,
    })?;
    println!("opened {} for {}", loan.id, loan.principal_amount);

    control.set(Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap());
    let settlement = book.refresh(&loan.id)?;
    println!(
        "after {} months: interest {}, due {}",
        settlement.computation.elapsed_months, settlement.loan.current_interest, settlement.loan.total_amount
    );

    let outcome = book.record_payment(&loan.id, settlement.loan.total_amount, PaymentDetails::default())?;
    if let Some(record) = outcome.completed {
        println!("closed as {}: paid {} over {} months", record.reason, record.total_paid, record.duration_months);
    }

    Ok(())
}
