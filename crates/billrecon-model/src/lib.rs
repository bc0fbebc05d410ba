pub mod order;
pub mod record;
pub mod reference;

pub use order::{OrderFields, field};
pub use record::{CustomerSummary, MatchVerdict, ReconciledRecord};
pub use reference::{CustomerAddress, CustomerRecord, VesselRecord};
