// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::rule_type::RuleType;

/// Configuration of the rule engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Rule types available in this installation. Memberships get one rule per registered type.
    pub(crate) rule_types: BTreeSet<RuleType>,
}

impl Config {
    /// Configuration with every built-in rule type registered.
    pub fn new() -> Self {
        Self {
            rule_types: RuleType::BUILTIN.into_iter().collect(),
        }
    }

    /// Replace the registered rule types.
    pub fn with_rule_types(mut self, rule_types: impl IntoIterator<Item = RuleType>) -> Self {
        self.rule_types = rule_types.into_iter().collect();
        self
    }

    /// Remove a single rule type, for example when the content it governs is unavailable.
    pub fn without_rule_type(mut self, rule_type: RuleType) -> Self {
        self.rule_types.remove(&rule_type);
        self
    }

    pub fn rule_types(&self) -> impl Iterator<Item = RuleType> + '_ {
        self.rule_types.iter().copied()
    }

    /// Returns true if rules of this type may be created.
    ///
    /// The unspecialized fallback is always allowed.
    pub fn is_registered(&self, rule_type: RuleType) -> bool {
        rule_type == RuleType::Unspecialized || self.rule_types.contains(&rule_type)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::rule_type::RuleType;

    #[test]
    fn registered_types() {
        let config = Config::new().without_rule_type(RuleType::Media);
        assert!(config.is_registered(RuleType::Page));
        assert!(!config.is_registered(RuleType::Media));
        assert!(config.is_registered(RuleType::Unspecialized));
        assert_eq!(config.rule_types().count(), RuleType::BUILTIN.len() - 1);
    }

    #[test]
    fn deserialize_from_json() {
        let config: Config = serde_json::from_str(r#"{"rule_types":["page","url"]}"#).unwrap();
        assert_eq!(
            config,
            Config::new().with_rule_types([RuleType::Url, RuleType::Page])
        );
    }
}
