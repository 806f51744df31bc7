// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Debug;

use crate::filter::RuleStatus;
use crate::interval::PeriodType;
use crate::item::ItemId;
use crate::rule::Rule;

/// Content item as listed for a rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentItem {
    pub id: ItemId,

    /// Raw entry of the rule for the item, `false` when there is none.
    pub access: bool,

    /// Item is listed but not governed by the rule.
    pub ignore: bool,

    /// Drip delay configured for the item.
    pub delayed_period: Option<(u32, PeriodType)>,
}

/// Arguments of a content listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentQuery {
    /// Only list items with this protection status.
    pub rule_status: Option<RuleStatus>,

    /// Maximum number of items, `None` lists everything.
    pub limit: Option<usize>,

    pub offset: usize,
}

/// API for enumerating the content governed by a rule type.
pub trait ContentSource {
    type Error: Debug;

    fn contents(&self, rule: &Rule, query: &ContentQuery) -> Result<Vec<ContentItem>, Self::Error>;

    fn content_count(&self, rule: &Rule, query: &ContentQuery) -> Result<usize, Self::Error>;
}
