// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities.
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::convert::Infallible;

use crate::drip::DripType;
use crate::event::RuleEvent;
use crate::interval::PeriodType;
use crate::item::{ItemId, MembershipId};
use crate::rule::Rule;
use crate::rule_type::RuleType;
use crate::traits::{
    ContentItem, ContentQuery, ContentSource, Membership, MembershipProvider, RuleListener,
};

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// In-memory membership with one rule per built-in rule type.
#[derive(Clone, Debug)]
pub struct TestMembership {
    pub id: MembershipId,
    pub name: String,
    pub is_base: bool,
    pub rules: BTreeMap<RuleType, Rule>,

    /// Number of times the membership was saved.
    pub saved: usize,
}

impl TestMembership {
    pub fn new(id: MembershipId, name: &str, is_base: bool) -> Self {
        let rules = RuleType::BUILTIN
            .into_iter()
            .map(|rule_type| (rule_type, Rule::new(id, is_base, rule_type)))
            .collect();

        Self {
            id,
            name: name.to_string(),
            is_base,
            rules,
            saved: 0,
        }
    }

    pub fn rule_mut(&mut self, rule_type: RuleType) -> &mut Rule {
        let (id, is_base) = (self.id, self.is_base);
        self.rules
            .entry(rule_type)
            .or_insert_with(|| Rule::new(id, is_base, rule_type))
    }
}

impl Membership for TestMembership {
    type Error = Infallible;

    fn id(&self) -> MembershipId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_base(&self) -> bool {
        self.is_base
    }

    fn rule(&self, rule_type: RuleType) -> Option<&Rule> {
        self.rules.get(&rule_type)
    }

    fn set_rule(&mut self, rule_type: RuleType, rule: Rule) {
        self.rules.insert(rule_type, rule);
    }

    fn save(&mut self) -> Result<(), Self::Error> {
        self.saved += 1;
        Ok(())
    }
}

/// Membership storage counting how often all memberships were loaded.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    memberships: RefCell<Vec<TestMembership>>,
    loads: Cell<usize>,
}

impl MemoryProvider {
    pub fn new(memberships: Vec<TestMembership>) -> Self {
        Self {
            memberships: RefCell::new(memberships),
            loads: Cell::new(0),
        }
    }

    pub fn push(&self, membership: TestMembership) {
        self.memberships.borrow_mut().push(membership);
    }

    pub fn loads(&self) -> usize {
        self.loads.get()
    }

    pub fn memberships_snapshot(&self) -> Vec<TestMembership> {
        self.memberships.borrow().clone()
    }

    /// Copy of a stored rule, panics if the membership does not exist.
    pub fn rule(&self, membership_id: MembershipId, rule_type: RuleType) -> Rule {
        self.memberships
            .borrow()
            .iter()
            .find(|membership| membership.id == membership_id)
            .and_then(|membership| membership.rules.get(&rule_type))
            .cloned()
            .expect("membership and rule exist")
    }
}

impl MembershipProvider for MemoryProvider {
    type Membership = TestMembership;
    type Error = Infallible;

    fn memberships(&self) -> Result<Vec<TestMembership>, Self::Error> {
        self.loads.set(self.loads.get() + 1);
        Ok(self.memberships.borrow().clone())
    }
}

/// Content listing over a fixed list of item ids.
#[derive(Debug, Default)]
pub struct MemoryContent {
    items: Vec<ItemId>,
}

impl MemoryContent {
    pub fn new(items: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }
}

impl ContentSource for MemoryContent {
    type Error = Infallible;

    fn contents(&self, rule: &Rule, query: &ContentQuery) -> Result<Vec<ContentItem>, Self::Error> {
        let limit = query.limit.unwrap_or(self.items.len());
        let items = self
            .items
            .iter()
            .skip(query.offset)
            .take(limit)
            .map(|id| ContentItem {
                id: id.clone(),
                access: rule.rule_value(id).unwrap_or(false),
                ignore: false,
                delayed_period: delayed_period(rule, id),
            })
            .collect();

        Ok(items)
    }

    fn content_count(&self, _rule: &Rule, _query: &ContentQuery) -> Result<usize, Self::Error> {
        Ok(self.items.len())
    }
}

fn delayed_period(rule: &Rule, id: &ItemId) -> Option<(u32, PeriodType)> {
    let drip_type = rule.dripped().drip_type();
    if drip_type == DripType::SpecificDate {
        return None;
    }

    rule.dripped().entry(drip_type, id).map(|entry| {
        (
            entry.period_unit.unwrap_or(0),
            entry.period_type.unwrap_or_default(),
        )
    })
}

/// Listener keeping every event it observed.
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: RefCell<Vec<RuleEvent>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<RuleEvent> {
        self.events.borrow().clone()
    }
}

impl RuleListener for RecordingListener {
    fn on_rule_event(&self, event: &RuleEvent, _rule: &Rule) {
        self.events.borrow_mut().push(event.clone());
    }
}
