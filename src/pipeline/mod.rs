//! Customer sales-funnel model: the status state machine, the
//! closing-details invariant, and the lenient currency-amount parser
//! used when a sale is recorded.

pub mod amount;
pub mod customer;
pub mod status;

pub use amount::parse_amount;
pub use customer::{normalize_detail, validate_transition, InvariantViolation, TransitionError};
pub use status::{CustomerStatus, Tab};
