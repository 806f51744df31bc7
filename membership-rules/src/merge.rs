// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merging rule state between rules and memberships.
use tracing::debug;

use crate::config::Config;
use crate::error::RuleError;
use crate::event::RuleEvent;
use crate::item::ItemId;
use crate::membership::MembershipCache;
use crate::rule::Rule;
use crate::traits::{Membership, MembershipProvider};

impl Rule {
    /// Merge the entries of another rule of the same type into this one.
    ///
    /// When `src_is_base` is set, `src` is a base rule. Every item it protects which this rule has
    /// no entry for gets an explicit no-access entry here, shadowing the inverted base default.
    /// Items this rule already has an entry for stay untouched.
    ///
    /// Otherwise the entries of `src` only fill the gaps of this rule, existing entries win.
    ///
    /// Rules of different types are left unchanged.
    pub fn merge_rule_values(&mut self, src: &Rule, src_is_base: bool) {
        if self.rule_type() != src.rule_type() {
            debug!(
                rule_type = %self.rule_type(),
                src_rule_type = %src.rule_type(),
                "skip merge of rules with different types"
            );
            return;
        }

        if src_is_base {
            let shadowed: Vec<ItemId> = src
                .granted_items()
                .filter(|id| self.rule_value(id).is_none())
                .cloned()
                .collect();

            for id in shadowed {
                self.insert_rule_value(id, false);
            }
        } else {
            let missing: Vec<(ItemId, bool)> = src
                .rule_values()
                .iter()
                .filter(|(id, _)| self.rule_value(id).is_none())
                .map(|(id, access)| (id.clone(), *access))
                .collect();

            for (id, access) in missing {
                self.insert_rule_value(id, access);
            }
        }

        debug!(
            membership_id = self.membership_id(),
            src_membership_id = src.membership_id(),
            src_is_base,
            entries = self.count_rules(false),
            "merged rule values"
        );

        self.notify(RuleEvent::RuleValuesMerged {
            source: src.membership_id(),
            source_is_base: src_is_base,
        });
    }
}

/// Merge every rule of `source` into the rule of the same type of `target` and save `target`.
///
/// Rules `target` does not have yet are created empty before merging.
pub fn merge_membership_rules<T, S>(
    target: &mut T,
    source: &S,
    config: &Config,
) -> Result<(), RuleError>
where
    T: Membership,
    S: Membership,
{
    let src_is_base = source.is_base();

    for rule_type in config.rule_types() {
        let Some(src_rule) = source.rule(rule_type) else {
            continue;
        };

        let mut rule = target
            .rule(rule_type)
            .cloned()
            .unwrap_or_else(|| Rule::new(target.id(), target.is_base(), rule_type));
        rule.merge_rule_values(src_rule, src_is_base);
        target.set_rule(rule_type, rule);
    }

    target
        .save()
        .map_err(|err| RuleError::Collaborator(format!("{err:?}")))
}

/// Merge the rules of the base membership into `target`, shadowing everything the base protects
/// which `target` has no explicit entry for.
///
/// Nothing happens when `target` is the base membership itself or no base membership exists.
pub fn inherit_base_rules<P>(
    target: &mut P::Membership,
    config: &Config,
    cache: &mut MembershipCache<P::Membership>,
    provider: &P,
) -> Result<(), RuleError>
where
    P: MembershipProvider,
{
    if target.is_base() {
        debug!(membership_id = target.id(), "base membership inherits nothing");
        return Ok(());
    }

    let Some(base) = cache.base(provider)? else {
        debug!(membership_id = target.id(), "no base membership to inherit from");
        return Ok(());
    };

    merge_membership_rules(target, base, config)
}
