// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::drip::{DripType, DripValue};
use crate::item::{ItemId, MembershipId};
use crate::rule_type::RuleType;

/// Events emitted after a rule was mutated.
///
/// Listeners observe the change together with the rule in its new state, nothing they do feeds
/// back into the rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleEvent {
    /// Access for an item was granted (`access` is true) or removed.
    AccessSet { id: ItemId, access: bool },

    /// All access entries were cleared.
    RuleValuesReset,

    /// Access entries of another rule were merged in.
    RuleValuesMerged {
        /// Membership owning the merged rule.
        source: MembershipId,

        /// Whether the merged rule was treated as the base rule.
        source_is_base: bool,
    },

    /// A single drip field was stored.
    DrippedValueSet {
        drip_type: DripType,
        id: ItemId,
        value: DripValue,
    },

    /// The whole drip schedule was replaced.
    DrippedSet,

    /// The rule type was changed.
    RuleTypeSet { rule_type: RuleType },
}
