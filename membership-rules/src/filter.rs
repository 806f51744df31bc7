// SPDX-License-Identifier: MIT OR Apache-2.0

//! Include and exclude sets for content listings.
//!
//! A listing asks which items of a rule type are protected, unprotected or dripped, optionally
//! scoped to a single membership. The answer is either a set of item ids the listing must be
//! restricted to, a set it must leave out, or no filter at all. When nothing qualifies the answer
//! is the sentinel set `{-1}` so the listing comes back empty instead of unfiltered.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RuleError;
use crate::item::{ItemId, MembershipId};
use crate::membership::MembershipCache;
use crate::rule::Rule;
use crate::traits::{Membership, MembershipProvider};

/// Protection status a listing is filtered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    /// Items protected by the base rule and granted by the scoped membership.
    Protected,

    /// Items the scoped membership does not grant.
    NotProtected,

    /// Items carrying drip metadata.
    Dripped,
}

/// Arguments of `Rule::exclude_include`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// Membership the listing is scoped to, `None` for the rule's own membership.
    pub membership_id: Option<MembershipId>,

    /// Protection status to filter by, `None` lists everything the base protects.
    pub rule_status: Option<RuleStatus>,
}

impl FilterArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn membership(mut self, membership_id: MembershipId) -> Self {
        self.membership_id = Some(membership_id);
        self
    }

    pub fn status(mut self, rule_status: RuleStatus) -> Self {
        self.rule_status = Some(rule_status);
        self
    }
}

/// Filter handed to a content listing. At most one of include and exclude is ever set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentFilter {
    /// List everything.
    Unfiltered,

    /// Only list these items.
    Include(BTreeSet<ItemId>),

    /// List everything except these items.
    Exclude(BTreeSet<ItemId>),
}

impl ContentFilter {
    pub fn include(&self) -> Option<&BTreeSet<ItemId>> {
        match self {
            ContentFilter::Include(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn exclude(&self) -> Option<&BTreeSet<ItemId>> {
        match self {
            ContentFilter::Exclude(ids) => Some(ids),
            _ => None,
        }
    }

    /// Returns true if the filter can never match an item.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, ContentFilter::Include(ids) if ids.iter().all(ItemId::is_sentinel))
    }
}

fn sentinel() -> BTreeSet<ItemId> {
    BTreeSet::from([ItemId::SENTINEL])
}

impl Rule {
    /// Derive the include or exclude set for a content listing of this rule's type.
    ///
    /// The base rule is this rule if it is the base rule, otherwise the rule of the base
    /// membership. The child rule is the rule of the scoped membership, or this rule when the
    /// listing is not scoped.
    pub fn exclude_include<P>(
        &self,
        args: &FilterArgs,
        cache: &mut MembershipCache<P::Membership>,
        provider: &P,
    ) -> Result<ContentFilter, RuleError>
    where
        P: MembershipProvider,
    {
        let memberships = cache.load(provider)?;
        let rule_type = self.rule_type();

        let base_rule = if self.is_base_rule() {
            Some(self)
        } else {
            memberships
                .iter()
                .find(|membership| membership.is_base())
                .and_then(|membership| membership.rule(rule_type))
        };

        let (child_rule, child_is_base) = match args.membership_id {
            Some(membership_id) => {
                let membership = memberships
                    .iter()
                    .find(|membership| membership.id() == membership_id)
                    .ok_or(RuleError::MembershipNotFound(membership_id))?;
                (membership.rule(rule_type), membership.is_base())
            }
            None => (Some(self), self.is_base_rule()),
        };

        let base_items: BTreeSet<ItemId> = base_rule
            .map(|rule| rule.granted_items().cloned().collect())
            .unwrap_or_default();
        let child_items: BTreeSet<ItemId> = child_rule
            .map(|rule| rule.granted_items().cloned().collect())
            .unwrap_or_default();

        let scoped = args.membership_id.is_some();
        let mut include = BTreeSet::new();
        let mut exclude = BTreeSet::new();

        match args.rule_status {
            Some(RuleStatus::Protected) => {
                include = if scoped {
                    child_items.intersection(&base_items).cloned().collect()
                } else {
                    child_items
                };

                if include.is_empty() {
                    include = sentinel();
                }
            }
            Some(RuleStatus::NotProtected) => {
                if scoped {
                    include = base_items.difference(&child_items).cloned().collect();

                    if include.is_empty() {
                        include = sentinel();
                    }
                } else {
                    exclude = child_items;

                    if exclude.is_empty() {
                        exclude = sentinel();
                    }
                }
            }
            Some(RuleStatus::Dripped) => {
                include = child_rule
                    .map(|rule| rule.dripped().items().cloned().collect())
                    .unwrap_or_default();

                if include.is_empty() {
                    include = sentinel();
                }
            }
            None => {
                // The base rule would otherwise exclude everything it protects from itself.
                if !child_is_base {
                    include = base_items;
                }
            }
        }

        let filter = if !include.is_empty() {
            ContentFilter::Include(include)
        } else if !exclude.is_empty() {
            ContentFilter::Exclude(exclude)
        } else if scoped {
            ContentFilter::Include(sentinel())
        } else {
            ContentFilter::Unfiltered
        };

        debug!(
            membership_id = self.membership_id(),
            rule_type = %rule_type,
            scope = ?args.membership_id,
            rule_status = ?args.rule_status,
            filter = ?filter,
            "derived content filter"
        );

        Ok(filter)
    }
}
