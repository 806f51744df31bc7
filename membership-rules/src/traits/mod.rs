// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interfaces of the collaborators surrounding the rule engine.
mod content;
mod listener;
mod membership;

pub use content::{ContentItem, ContentQuery, ContentSource};
pub use listener::RuleListener;
pub use membership::{Membership, MembershipProvider};
