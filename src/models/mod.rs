mod category;
mod goal;
mod range;
mod transaction;

pub use category::{canonical_category, UNCATEGORIZED};
pub use goal::Goal;
pub use range::DateRange;
pub use transaction::Transaction;
