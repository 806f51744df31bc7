// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::config::Config;
use crate::error::RuleError;
use crate::item::MembershipId;
use crate::rule::Rule;
use crate::rule_type::RuleType;
use crate::traits::RuleListener;

/// Builds the rules of a membership.
#[derive(Clone, Debug, Default)]
pub struct RuleFactory {
    config: Config,
    listener: Option<Arc<dyn RuleListener>>,
}

impl RuleFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            listener: None,
        }
    }

    /// Attach a listener to every rule built from now on.
    pub fn with_listener(mut self, listener: Arc<dyn RuleListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build an empty rule from a rule type tag.
    ///
    /// Unknown tags are an error. A known type which is not registered degrades to an
    /// unspecialized rule.
    pub fn create(
        &self,
        membership_id: MembershipId,
        is_base: bool,
        tag: &str,
    ) -> Result<Rule, RuleError> {
        let rule_type: RuleType = tag.parse()?;

        let rule_type = if self.config.is_registered(rule_type) {
            rule_type
        } else {
            warn!(
                membership_id,
                rule_type = %rule_type,
                "rule type not registered, falling back to unspecialized rule"
            );
            RuleType::Unspecialized
        };

        Ok(self.build(membership_id, is_base, rule_type))
    }

    /// Build one empty rule for every registered rule type.
    pub fn create_all(&self, membership_id: MembershipId, is_base: bool) -> BTreeMap<RuleType, Rule> {
        self.config
            .rule_types()
            .map(|rule_type| (rule_type, self.build(membership_id, is_base, rule_type)))
            .collect()
    }

    fn build(&self, membership_id: MembershipId, is_base: bool, rule_type: RuleType) -> Rule {
        let mut rule = Rule::new(membership_id, is_base, rule_type);
        rule.set_listener(self.listener.clone());
        rule
    }
}
