//! Wire types exchanged with the storefront backend.
//!
//! These mirror the JSON the backend sends and accepts. They are read-only to the
//! projection code; nothing here decides eligibility or totals.

pub mod checkout;
pub mod order;
pub mod returns;
pub mod wallet;

pub use checkout::*;
pub use order::*;
pub use returns::*;
pub use wallet::*;
