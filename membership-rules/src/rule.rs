// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::Config;
use crate::drip::{DripField, DripSchedule, DripType, DripValue};
use crate::error::RuleError;
use crate::event::RuleEvent;
use crate::item::{ItemId, MembershipId};
use crate::rule_type::RuleType;
use crate::traits::RuleListener;

/// Access rule of one membership for one content category.
///
/// The rule stores which items are explicitly accessible. Items without an entry are not
/// governed by the rule and stay accessible. On the base rule the meaning of an entry is
/// inverted: listing an item there protects it by default, so every other membership has to
/// grant it explicitly.
#[derive(Clone, Serialize, Deserialize)]
pub struct Rule {
    membership_id: MembershipId,

    is_base_rule: bool,

    rule_type: RuleType,

    /// Access entries. Removing access deletes the entry, so only merges ever store `false`.
    #[serde(default)]
    rule_value: BTreeMap<ItemId, bool>,

    #[serde(default)]
    dripped: DripSchedule,

    #[serde(skip)]
    listener: Option<Arc<dyn RuleListener>>,
}

impl Rule {
    pub fn new(membership_id: MembershipId, is_base_rule: bool, rule_type: RuleType) -> Self {
        Self {
            membership_id,
            is_base_rule,
            rule_type,
            rule_value: BTreeMap::new(),
            dripped: DripSchedule::new(),
            listener: None,
        }
    }

    /// Attach a listener which gets notified after every mutation.
    pub fn with_listener(mut self, listener: Arc<dyn RuleListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn set_listener(&mut self, listener: Option<Arc<dyn RuleListener>>) {
        self.listener = listener;
    }

    pub fn membership_id(&self) -> MembershipId {
        self.membership_id
    }

    pub fn is_base_rule(&self) -> bool {
        self.is_base_rule
    }

    pub fn rule_type(&self) -> RuleType {
        self.rule_type
    }

    /// All access entries, including explicit no-access entries stored by a merge.
    pub fn rule_values(&self) -> &BTreeMap<ItemId, bool> {
        &self.rule_value
    }

    pub fn dripped(&self) -> &DripSchedule {
        &self.dripped
    }

    /// Change the rule type, it has to be registered in the configuration.
    pub fn set_rule_type(&mut self, rule_type: RuleType, config: &Config) -> Result<(), RuleError> {
        if !config.is_registered(rule_type) {
            return Err(RuleError::UnregisteredRuleType(rule_type));
        }

        self.rule_type = rule_type;
        self.notify(RuleEvent::RuleTypeSet { rule_type });
        Ok(())
    }

    /// Replace the whole drip schedule after checking it is well-formed.
    pub fn set_dripped(&mut self, dripped: DripSchedule) -> Result<(), RuleError> {
        dripped.validate()?;
        self.dripped = dripped;
        self.notify(RuleEvent::DrippedSet);
        Ok(())
    }

    pub(crate) fn notify(&self, event: RuleEvent) {
        if let Some(listener) = &self.listener {
            listener.on_rule_event(&event, self);
        }
    }

    // Access entries
    // ~~~~~~~~~~~~~~

    /// Grant (`true`) or remove (`false`) access to an item.
    ///
    /// Removing access deletes the entry instead of storing `false`.
    pub fn set_access(&mut self, id: impl Into<ItemId>, access: bool) {
        let id = id.into();
        if access {
            self.rule_value.insert(id.clone(), true);
        } else {
            self.rule_value.remove(&id);
        }

        self.notify(RuleEvent::AccessSet { id, access });
    }

    pub fn give_access(&mut self, id: impl Into<ItemId>) {
        self.set_access(id, true);
    }

    pub fn remove_access(&mut self, id: impl Into<ItemId>) {
        self.set_access(id, false);
    }

    /// Flip the stored entry of an item. A missing or `false` entry becomes access.
    pub fn toggle_access(&mut self, id: impl Into<ItemId>) {
        let id = id.into();
        let current = self.rule_value(&id).unwrap_or(false);
        self.set_access(id, !current);
    }

    /// Raw entry of an item, `None` when the rule has no entry for it.
    pub fn rule_value(&self, id: &ItemId) -> Option<bool> {
        self.rule_value.get(id).copied()
    }

    /// Returns true if any item has access granted.
    pub fn has_rules(&self) -> bool {
        self.rule_value.values().any(|access| *access)
    }

    /// Number of entries, only those granting access when `only_granted` is set.
    pub fn count_rules(&self, only_granted: bool) -> usize {
        if only_granted {
            self.rule_value.values().filter(|access| **access).count()
        } else {
            self.rule_value.len()
        }
    }

    /// Items with access granted, in key order. This is the persisted form of the entries.
    pub fn serialize_values(&self) -> Vec<ItemId> {
        self.granted_items().cloned().collect()
    }

    /// Grant access to every given item.
    pub fn populate<I>(&mut self, ids: I)
    where
        I: IntoIterator,
        I::Item: Into<ItemId>,
    {
        for id in ids {
            self.give_access(id);
        }
    }

    /// Remove every access entry.
    pub fn reset_rule_values(&mut self) {
        self.rule_value.clear();
        self.notify(RuleEvent::RuleValuesReset);
    }

    pub(crate) fn granted_items(&self) -> impl Iterator<Item = &ItemId> {
        self.rule_value
            .iter()
            .filter_map(|(id, access)| if *access { Some(id) } else { None })
    }

    /// Store an entry as-is, bypassing the compaction of `set_access`.
    pub(crate) fn insert_rule_value(&mut self, id: ItemId, access: bool) {
        self.rule_value.insert(id, access);
    }

    // Access evaluation
    // ~~~~~~~~~~~~~~~~~

    /// Returns true if members may access the item.
    ///
    /// An empty id never grants access. Items without an entry are accessible. Entries of the
    /// base rule are inverted, entries of every other rule are taken as they are.
    pub fn has_access(&self, id: &ItemId) -> bool {
        if id.is_empty() {
            return false;
        }

        let access = match self.rule_value(id) {
            None => true,
            Some(value) if self.is_base_rule => !value,
            Some(value) => value,
        };

        trace!(
            membership_id = self.membership_id,
            rule_type = %self.rule_type,
            item = %id,
            access,
            "evaluated item access"
        );

        access
    }

    /// Returns true if the item is accessible and its drip date has passed.
    pub fn has_dripped_access(&self, start_date: Option<DateTime<Utc>>, id: &ItemId) -> bool {
        self.has_dripped_access_at(start_date, id, Utc::now())
    }

    pub fn has_dripped_access_at(
        &self,
        start_date: Option<DateTime<Utc>>,
        id: &ItemId,
        now: DateTime<Utc>,
    ) -> bool {
        let avail_date = self.dripped.avail_date_at(id, start_date, now);
        now >= avail_date && self.has_access(id)
    }

    // Drip schedule
    // ~~~~~~~~~~~~~

    /// Stored drip field of an item or its default.
    pub fn dripped_value(&self, drip_type: DripType, id: &ItemId, field: DripField) -> DripValue {
        self.dripped_value_at(drip_type, id, field, Utc::now())
    }

    pub fn dripped_value_at(
        &self,
        drip_type: DripType,
        id: &ItemId,
        field: DripField,
        now: DateTime<Utc>,
    ) -> DripValue {
        self.dripped.value_at(drip_type, id, field, now)
    }

    /// Store a drip field of an item and make `drip_type` the current policy of this rule.
    pub fn set_dripped_value(
        &mut self,
        drip_type: DripType,
        id: impl Into<ItemId>,
        value: DripValue,
    ) -> Result<(), RuleError> {
        self.set_dripped_value_at(drip_type, id, value, Utc::now())
    }

    pub fn set_dripped_value_at(
        &mut self,
        drip_type: DripType,
        id: impl Into<ItemId>,
        value: DripValue,
        now: DateTime<Utc>,
    ) -> Result<(), RuleError> {
        let id = id.into();
        self.dripped.set_value_at(drip_type, id.clone(), value, now)?;
        self.notify(RuleEvent::DrippedValueSet {
            drip_type,
            id,
            value,
        });
        Ok(())
    }

    /// Date the item becomes available under the current drip policy.
    pub fn dripped_avail_date(&self, id: &ItemId, start_date: Option<DateTime<Utc>>) -> DateTime<Utc> {
        self.dripped_avail_date_at(id, start_date, Utc::now())
    }

    pub fn dripped_avail_date_at(
        &self,
        id: &ItemId,
        start_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        self.dripped.avail_date_at(id, start_date, now)
    }

    /// Returns true if the item has drip metadata under the current policy.
    pub fn has_dripped_rules(&self, id: &ItemId) -> bool {
        self.dripped.has_entry(id)
    }
}

impl Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("membership_id", &self.membership_id)
            .field("is_base_rule", &self.is_base_rule)
            .field("rule_type", &self.rule_type)
            .field("rule_value", &self.rule_value)
            .field("dripped", &self.dripped)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.membership_id == other.membership_id
            && self.is_base_rule == other.is_base_rule
            && self.rule_type == other.rule_type
            && self.rule_value == other.rule_value
            && self.dripped == other.dripped
    }
}

impl Eq for Rule {}
