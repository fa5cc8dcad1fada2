//! # menuqr
//!
//! The MenuQR service layer. Everything the HTTP adapter calls lives
//! here:
//!
//! - [`guard`] — the trial/active/expired subscription state machine and
//!   the entitlement predicates built on it
//! - [`billing`] — order creation, dual-path payment verification
//!   (client callback + webhook), and the status read
//! - [`cafes`], [`menu`], [`offers`] — entitlement-gated CRUD over the
//!   menu domain
//! - [`context`] — constructor-injected wiring of storage, gateway, and
//!   logger

pub mod billing;
pub mod cafes;
pub mod context;
pub mod guard;
pub mod menu;
pub mod offers;
pub mod qr;

pub use context::AppContext;
pub use guard::{GuardDecision, SubscriptionGuard};
