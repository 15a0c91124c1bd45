pub mod bill;
pub mod money;
pub mod period;
pub mod record;

pub use bill::{BillKey, BillMatch, DuplicateReason, DuplicateWarning, OccupantCount, OccupantShare};
pub use money::Money;
pub use period::{BillPeriod, DayWindow};
pub use record::TransactionRecord;
