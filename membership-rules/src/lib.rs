// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access rules of membership tiers.
//!
//! Every membership holds one [`Rule`] per [`RuleType`]. A rule decides whether members may access
//! a content item, optionally delayed by a drip schedule, merges with rules of other memberships
//! and derives include or exclude sets for content listings.
//!
//! The rule of the base membership, which every visitor belongs to, is special: items listed in
//! it are protected by default instead of granted.
pub mod config;
pub mod drip;
mod error;
pub mod event;
pub mod factory;
pub mod filter;
pub mod interval;
mod item;
pub mod membership;
pub mod merge;
mod rule;
pub mod rule_type;
pub mod summary;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
pub mod traits;

pub use config::Config;
pub use error::RuleError;
pub use item::{ItemId, MembershipId};
pub use rule::Rule;
pub use rule_type::RuleType;
