// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

use crate::drip::DripField;
use crate::item::MembershipId;
use crate::rule_type::RuleType;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("unknown rule type \"{0}\"")]
    UnknownRuleType(String),

    #[error("rule type {0} is not registered")]
    UnregisteredRuleType(RuleType),

    #[error("invalid value \"{value}\" for drip field {field}")]
    InvalidDripValue { field: DripField, value: String },

    #[error("drip entry for item {item} under {drip_type} carries field {field}")]
    MalformedDripEntry {
        drip_type: String,
        item: String,
        field: DripField,
    },

    #[error("membership {0} not found")]
    MembershipNotFound(MembershipId),

    #[error("collaborator error: {0}")]
    Collaborator(String),
}
