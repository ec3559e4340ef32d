//! Client-side derivations over backend data.
//!
//! - [`tracking`]: order status → five tracking steps and a display bucket
//! - [`eligibility`]: backend eligibility answer → actions the UI may offer
//! - [`totals`]: cart lines → subtotal, shipping and total
//!
//! All three are pure functions; nothing here talks to the backend.

pub mod eligibility;
pub mod totals;
pub mod tracking;

pub use eligibility::*;
pub use totals::*;
pub use tracking::*;
