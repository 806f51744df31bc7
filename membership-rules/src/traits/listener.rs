// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Debug;

use crate::event::RuleEvent;
use crate::rule::Rule;

/// Observer notified synchronously after every mutation of a rule.
pub trait RuleListener: Debug {
    fn on_rule_event(&self, event: &RuleEvent, rule: &Rule);
}
