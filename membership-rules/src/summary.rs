// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::filter::RuleStatus;
use crate::rule::Rule;
use crate::traits::{ContentQuery, ContentSource};

/// Number of items of a rule type and how many of them members can access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSummary {
    pub total: usize,
    pub accessible: usize,
    pub restricted: usize,
}

impl Rule {
    /// Count the listed items this rule grants and withholds.
    ///
    /// The content source reports the raw entry of each item. On the base rule an entry means
    /// protection, so the accessible and restricted counts are swapped.
    pub fn count_item_access<S>(
        &self,
        source: &S,
        rule_status: Option<RuleStatus>,
    ) -> Result<AccessSummary, RuleError>
    where
        S: ContentSource,
    {
        let query = ContentQuery {
            rule_status,
            limit: None,
            offset: 0,
        };

        let total = source
            .content_count(self, &query)
            .map_err(|err| RuleError::Collaborator(format!("{err:?}")))?;
        let contents = source
            .contents(self, &query)
            .map_err(|err| RuleError::Collaborator(format!("{err:?}")))?;

        let accessible = contents.iter().filter(|item| item.access).count();
        let restricted = contents.len() - accessible;

        let summary = if self.is_base_rule() {
            AccessSummary {
                total,
                accessible: restricted,
                restricted: accessible,
            }
        } else {
            AccessSummary {
                total,
                accessible,
                restricted,
            }
        };

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::AccessSummary;
    use crate::item::ItemId;
    use crate::rule::Rule;
    use crate::rule_type::RuleType;
    use crate::test_utils::MemoryContent;

    #[test]
    fn counts_granted_items() {
        let content = MemoryContent::new((1..=5).map(ItemId::from));
        let mut rule = Rule::new(2, false, RuleType::Page);
        rule.populate([1, 3]);

        assert_eq!(
            rule.count_item_access(&content, None).unwrap(),
            AccessSummary {
                total: 5,
                accessible: 2,
                restricted: 3
            }
        );
    }

    #[test]
    fn base_rule_counts_are_swapped() {
        let content = MemoryContent::new((1..=5).map(ItemId::from));
        let mut base = Rule::new(1, true, RuleType::Page);
        base.populate([1, 3]);

        assert_eq!(
            base.count_item_access(&content, None).unwrap(),
            AccessSummary {
                total: 5,
                accessible: 3,
                restricted: 2
            }
        );
    }
}
