use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{CompletionReason, LoanId};

/// events emitted by the loan book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    LoanOriginated {
        loan_id: LoanId,
        principal: Money,
        start_date: DateTime<Utc>,
    },
    InterestAccrued {
        loan_id: LoanId,
        interest: Money,
        elapsed_months: u32,
        total_amount: Money,
        timestamp: DateTime<Utc>,
    },
    PaymentReceived {
        loan_id: LoanId,
        amount: Money,
        remaining_amount: Money,
        timestamp: DateTime<Utc>,
    },
    LoanCompleted {
        loan_id: LoanId,
        reason: CompletionReason,
        total_paid: Money,
        written_off: Money,
        timestamp: DateTime<Utc>,
    },
    AccrualFailed {
        loan_id: LoanId,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
