// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Debug;

use crate::item::MembershipId;
use crate::rule::Rule;
use crate::rule_type::RuleType;

/// A membership tier holding one rule per rule type.
pub trait Membership {
    type Error: Debug;

    fn id(&self) -> MembershipId;

    fn name(&self) -> &str;

    /// Returns true for the default membership every visitor belongs to.
    fn is_base(&self) -> bool;

    /// Rule of the given type, `None` if the membership never created one.
    fn rule(&self, rule_type: RuleType) -> Option<&Rule>;

    fn set_rule(&mut self, rule_type: RuleType, rule: Rule);

    /// Persist the membership together with all of its rules.
    fn save(&mut self) -> Result<(), Self::Error>;
}

/// API for loading all memberships from storage.
pub trait MembershipProvider {
    type Membership: Membership + Clone;
    type Error: Debug;

    fn memberships(&self) -> Result<Vec<Self::Membership>, Self::Error>;
}
