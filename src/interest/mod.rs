pub mod months;
pub mod policy;

pub use months::{calendar_month_distance, first_of_month};
pub use policy::{compute_interest, InterestComputation, InterestPolicy};
