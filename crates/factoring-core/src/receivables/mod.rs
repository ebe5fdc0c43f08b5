//! Accounts receivable: typed settlement rows and their derived balance and
//! aging columns.

pub mod derivation;
pub mod record;

pub use derivation::{derive, AccountStatus, DerivationContext, DerivedReceivable, DERIVED_COLUMNS};
pub use record::{AccountsReceivableRecord, PaymentType};
