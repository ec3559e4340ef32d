//! View models for the Orders, Return Requests, Checkout and Wallet screens.
//!
//! Each view loads independently: one failing does not affect the others.

pub mod checkout;
pub mod orders;
pub mod returns;
pub mod wallet;
