// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drip scheduling.
//!
//! Dripped content is released on a computed availability date. Three policies exist: a fixed
//! calendar date per item, a delay counted from the moment the delay was configured, and a delay
//! counted from the member's registration. Every item keeps its metadata under the policy it was
//! configured for. Only the entries of the rule's current policy take effect, entries stored
//! under other policies stay around untouched until that policy is selected again.
use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::interval::{PeriodType, add_interval};
use crate::item::ItemId;

/// Release policy of dripped content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DripType {
    /// Item becomes available on an explicitly stored date.
    #[default]
    SpecificDate,

    /// Item becomes available a period after the drip value was set.
    FromToday,

    /// Item becomes available a period after the member registered.
    FromRegistration,
}

impl DripType {
    /// Returns true if entries of this policy may carry the given field.
    pub fn accepts(&self, field: DripField) -> bool {
        match self {
            DripType::SpecificDate => matches!(field, DripField::SpecDate),
            DripType::FromToday => matches!(
                field,
                DripField::PeriodUnit | DripField::PeriodType | DripField::AvailDate
            ),
            DripType::FromRegistration => {
                matches!(field, DripField::PeriodUnit | DripField::PeriodType)
            }
        }
    }
}

impl Display for DripType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DripType::SpecificDate => "specific_date",
            DripType::FromToday => "from_today",
            DripType::FromRegistration => "from_registration",
        };

        write!(f, "{}", s)
    }
}

/// Fields stored per dripped item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DripField {
    PeriodUnit,
    PeriodType,
    SpecDate,
    AvailDate,
}

impl Display for DripField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DripField::PeriodUnit => "period_unit",
            DripField::PeriodType => "period_type",
            DripField::SpecDate => "spec_date",
            DripField::AvailDate => "avail_date",
        };

        write!(f, "{}", s)
    }
}

/// Typed value of a single drip field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DripValue {
    PeriodUnit(u32),
    PeriodType(PeriodType),
    SpecDate(DateTime<Utc>),
    AvailDate(DateTime<Utc>),
}

impl DripValue {
    pub fn field(&self) -> DripField {
        match self {
            DripValue::PeriodUnit(_) => DripField::PeriodUnit,
            DripValue::PeriodType(_) => DripField::PeriodType,
            DripValue::SpecDate(_) => DripField::SpecDate,
            DripValue::AvailDate(_) => DripField::AvailDate,
        }
    }

    /// Parses raw form input for a drip field.
    ///
    /// Period units are non-negative integers, period types accept singular and plural unit
    /// names and dates are either `YYYY-MM-DD` (midnight UTC) or RFC 3339 timestamps.
    pub fn parse(field: DripField, raw: &str) -> Result<Self, RuleError> {
        let invalid = || RuleError::InvalidDripValue {
            field,
            value: raw.to_string(),
        };
        let raw_trimmed = raw.trim();

        let value = match field {
            DripField::PeriodUnit => {
                DripValue::PeriodUnit(raw_trimmed.parse::<u32>().map_err(|_| invalid())?)
            }
            DripField::PeriodType => {
                DripValue::PeriodType(raw_trimmed.parse::<PeriodType>().map_err(|_| invalid())?)
            }
            DripField::SpecDate => DripValue::SpecDate(parse_date(raw_trimmed).ok_or_else(invalid)?),
            DripField::AvailDate => {
                DripValue::AvailDate(parse_date(raw_trimmed).ok_or_else(invalid)?)
            }
        };

        Ok(value)
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}

/// Drip metadata of one item under one policy. Unset fields fall back to their defaults on read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DripEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_unit: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_type: Option<PeriodType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avail_date: Option<DateTime<Utc>>,
}

impl DripEntry {
    fn set(&mut self, value: DripValue) {
        match value {
            DripValue::PeriodUnit(unit) => self.period_unit = Some(unit),
            DripValue::PeriodType(period) => self.period_type = Some(period),
            DripValue::SpecDate(date) => self.spec_date = Some(date),
            DripValue::AvailDate(date) => self.avail_date = Some(date),
        }
    }

    fn fields(&self) -> impl Iterator<Item = DripField> + '_ {
        [
            self.period_unit.map(|_| DripField::PeriodUnit),
            self.period_type.map(|_| DripField::PeriodType),
            self.spec_date.map(|_| DripField::SpecDate),
            self.avail_date.map(|_| DripField::AvailDate),
        ]
        .into_iter()
        .flatten()
    }

    fn period_unit_or_default(&self) -> u32 {
        self.period_unit.unwrap_or(0)
    }

    fn period_type_or_default(&self) -> PeriodType {
        self.period_type.unwrap_or_default()
    }
}

/// Drip metadata of all items of a rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DripSchedule {
    /// Per-policy item metadata.
    #[serde(default)]
    entries: BTreeMap<DripType, BTreeMap<ItemId, DripEntry>>,

    /// Policy used by the last drip change, `None` until the first one.
    #[serde(default)]
    drip_type: Option<DripType>,

    /// Time of the last drip change.
    #[serde(default)]
    modified_at: Option<DateTime<Utc>>,
}

impl DripSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected policy, `SpecificDate` when none was ever selected.
    pub fn drip_type(&self) -> DripType {
        self.drip_type.unwrap_or_default()
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    /// Stored metadata for an item under the given policy.
    pub fn entry(&self, drip_type: DripType, id: &ItemId) -> Option<&DripEntry> {
        self.entries.get(&drip_type).and_then(|items| items.get(id))
    }

    /// Items carrying metadata under the current policy.
    pub fn items(&self) -> impl Iterator<Item = &ItemId> {
        self.entries
            .get(&self.drip_type())
            .into_iter()
            .flat_map(|items| items.keys())
    }

    /// Checks every stored entry only carries fields meaningful for its policy.
    pub fn validate(&self) -> Result<(), RuleError> {
        for (drip_type, items) in &self.entries {
            for (id, entry) in items {
                if let Some(field) = entry.fields().find(|field| !drip_type.accepts(*field)) {
                    return Err(RuleError::MalformedDripEntry {
                        drip_type: drip_type.to_string(),
                        item: id.to_string(),
                        field,
                    });
                }
            }
        }

        Ok(())
    }

    /// Returns the stored value of a field or its default.
    ///
    /// Period units default to zero, period types to days, and both dates to `now`.
    pub fn value_at(
        &self,
        drip_type: DripType,
        id: &ItemId,
        field: DripField,
        now: DateTime<Utc>,
    ) -> DripValue {
        let entry = self.entry(drip_type, id);

        match field {
            DripField::PeriodUnit => DripValue::PeriodUnit(
                entry.map(DripEntry::period_unit_or_default).unwrap_or(0),
            ),
            DripField::PeriodType => DripValue::PeriodType(
                entry
                    .map(DripEntry::period_type_or_default)
                    .unwrap_or_default(),
            ),
            DripField::SpecDate => {
                DripValue::SpecDate(entry.and_then(|entry| entry.spec_date).unwrap_or(now))
            }
            DripField::AvailDate => {
                DripValue::AvailDate(entry.and_then(|entry| entry.avail_date).unwrap_or(now))
            }
        }
    }

    /// Stores a field for an item and makes `drip_type` the current policy.
    ///
    /// Under `FromToday` the availability date of the item is recomputed right away. That date
    /// is derived, so `AvailDate` is never accepted as input.
    pub fn set_value_at(
        &mut self,
        drip_type: DripType,
        id: ItemId,
        value: DripValue,
        now: DateTime<Utc>,
    ) -> Result<(), RuleError> {
        if value.field() == DripField::AvailDate || !drip_type.accepts(value.field()) {
            return Err(RuleError::MalformedDripEntry {
                drip_type: drip_type.to_string(),
                item: id.to_string(),
                field: value.field(),
            });
        }

        let entry = self
            .entries
            .entry(drip_type)
            .or_default()
            .entry(id)
            .or_default();
        entry.set(value);

        if drip_type == DripType::FromToday {
            let avail_date = add_interval(
                entry.period_unit_or_default(),
                entry.period_type_or_default(),
                now,
            );
            entry.avail_date = Some(avail_date);
        }

        self.drip_type = Some(drip_type);
        self.modified_at = Some(now);

        Ok(())
    }

    /// Computes when an item becomes available under the current policy.
    ///
    /// `start_date` is the member's registration date and only used by `FromRegistration`.
    pub fn avail_date_at(
        &self,
        id: &ItemId,
        start_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let drip_type = self.drip_type();
        let entry = self.entry(drip_type, id);
        let period = |entry: Option<&DripEntry>| {
            entry
                .map(|entry| (entry.period_unit_or_default(), entry.period_type_or_default()))
                .unwrap_or((0, PeriodType::default()))
        };

        match drip_type {
            DripType::SpecificDate => entry.and_then(|entry| entry.spec_date).unwrap_or(now),
            DripType::FromToday => match entry.and_then(|entry| entry.avail_date) {
                Some(avail_date) => avail_date,
                None => {
                    let (unit, period_type) = period(entry);
                    add_interval(unit, period_type, self.modified_at.unwrap_or(now))
                }
            },
            DripType::FromRegistration => {
                let (unit, period_type) = period(entry);
                add_interval(unit, period_type, start_date.unwrap_or(now))
            }
        }
    }

    /// Returns true if the item has metadata under the current policy.
    pub fn has_entry(&self, id: &ItemId) -> bool {
        self.entry(self.drip_type(), id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    use super::{DripField, DripSchedule, DripType, DripValue};
    use crate::error::RuleError;
    use crate::interval::PeriodType;
    use crate::item::ItemId;

    #[test]
    fn defaults_for_unset_fields() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let schedule = DripSchedule::new();
        let id = ItemId::from(1);

        assert_eq!(schedule.drip_type(), DripType::SpecificDate);
        assert_eq!(
            schedule.value_at(DripType::FromToday, &id, DripField::PeriodUnit, now),
            DripValue::PeriodUnit(0)
        );
        assert_eq!(
            schedule.value_at(DripType::FromToday, &id, DripField::PeriodType, now),
            DripValue::PeriodType(PeriodType::Days)
        );
        assert_eq!(
            schedule.value_at(DripType::SpecificDate, &id, DripField::SpecDate, now),
            DripValue::SpecDate(now)
        );
        assert_eq!(schedule.avail_date_at(&id, None, now), now);
    }

    #[test]
    fn from_today_caches_avail_date() {
        let day_0 = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let id = ItemId::from(4);
        let mut schedule = DripSchedule::new();

        schedule
            .set_value_at(DripType::FromToday, id.clone(), DripValue::PeriodUnit(2), day_0)
            .unwrap();
        schedule
            .set_value_at(
                DripType::FromToday,
                id.clone(),
                DripValue::PeriodType(PeriodType::Weeks),
                day_0,
            )
            .unwrap();

        let entry = schedule.entry(DripType::FromToday, &id).unwrap();
        assert_eq!(entry.avail_date, Some(day_0 + Duration::days(14)));
        assert_eq!(schedule.modified_at(), Some(day_0));

        let later = day_0 + Duration::days(3);
        assert_eq!(
            schedule.avail_date_at(&id, None, later),
            day_0 + Duration::days(14)
        );
    }

    #[test]
    fn from_today_dates_are_kept_per_item() {
        let day_0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let day_10 = day_0 + Duration::days(10);
        let first = ItemId::from(1);
        let mut schedule = DripSchedule::new();

        schedule
            .set_value_at(DripType::FromToday, first.clone(), DripValue::PeriodUnit(2), day_0)
            .unwrap();
        schedule
            .set_value_at(
                DripType::FromToday,
                first.clone(),
                DripValue::PeriodType(PeriodType::Weeks),
                day_0,
            )
            .unwrap();

        // Configuring another item later must not move the release of the first one.
        schedule
            .set_value_at(DripType::FromToday, ItemId::from(2), DripValue::PeriodUnit(3), day_10)
            .unwrap();
        assert_eq!(schedule.modified_at(), Some(day_10));

        let release = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(schedule.avail_date_at(&first, None, day_10), release);
        assert_eq!(
            schedule.value_at(DripType::FromToday, &first, DripField::AvailDate, day_10),
            DripValue::AvailDate(release)
        );
        assert_eq!(
            schedule.avail_date_at(&ItemId::from(2), None, day_10),
            day_10 + Duration::days(3)
        );
    }

    #[test]
    fn from_today_rejects_explicit_avail_date() {
        let day_0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let id = ItemId::from(1);
        let mut schedule = DripSchedule::new();

        schedule
            .set_value_at(DripType::FromToday, id.clone(), DripValue::PeriodUnit(5), day_0)
            .unwrap();
        let before = schedule.clone();

        assert_matches!(
            schedule.set_value_at(
                DripType::FromToday,
                id.clone(),
                DripValue::AvailDate(day_0 + Duration::days(1)),
                day_0 + Duration::days(1)
            ),
            Err(RuleError::MalformedDripEntry {
                field: DripField::AvailDate,
                ..
            })
        );
        assert_eq!(schedule, before);

        // Stored entries keep carrying the derived date.
        assert!(schedule.validate().is_ok());
        assert_eq!(
            schedule.entry(DripType::FromToday, &id).unwrap().avail_date,
            Some(day_0 + Duration::days(5))
        );
    }

    #[test]
    fn from_registration_counts_from_start_date() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let id = ItemId::from("bonus");
        let mut schedule = DripSchedule::new();

        schedule
            .set_value_at(DripType::FromRegistration, id.clone(), DripValue::PeriodUnit(1), now)
            .unwrap();
        schedule
            .set_value_at(
                DripType::FromRegistration,
                id.clone(),
                DripValue::PeriodType(PeriodType::Months),
                now,
            )
            .unwrap();

        assert_eq!(
            schedule.avail_date_at(&id, Some(start), now),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
        // Without a start date the delay counts from now.
        assert_eq!(
            schedule.avail_date_at(&id, None, now),
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn switching_policy_keeps_stale_entries_inert() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let release = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let id = ItemId::from(9);
        let other = ItemId::from(10);
        let mut schedule = DripSchedule::new();

        schedule
            .set_value_at(DripType::SpecificDate, id.clone(), DripValue::SpecDate(release), now)
            .unwrap();
        assert!(schedule.has_entry(&id));
        assert_eq!(schedule.avail_date_at(&id, None, now), release);

        schedule
            .set_value_at(DripType::FromToday, other, DripValue::PeriodUnit(1), now)
            .unwrap();
        assert_eq!(schedule.drip_type(), DripType::FromToday);
        assert!(!schedule.has_entry(&id));
        assert!(schedule.entry(DripType::SpecificDate, &id).is_some());
        assert_eq!(schedule.avail_date_at(&id, None, now), now);
    }

    #[test]
    fn rejects_fields_foreign_to_policy() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut schedule = DripSchedule::new();

        assert_matches!(
            schedule.set_value_at(
                DripType::SpecificDate,
                ItemId::from(1),
                DripValue::PeriodUnit(3),
                now
            ),
            Err(RuleError::MalformedDripEntry {
                field: DripField::PeriodUnit,
                ..
            })
        );
        assert_eq!(schedule, DripSchedule::new());
    }

    #[test]
    fn parse_raw_values() {
        assert_eq!(
            DripValue::parse(DripField::PeriodUnit, " 3 ").unwrap(),
            DripValue::PeriodUnit(3)
        );
        assert_eq!(
            DripValue::parse(DripField::PeriodType, "month").unwrap(),
            DripValue::PeriodType(PeriodType::Months)
        );
        assert_eq!(
            DripValue::parse(DripField::SpecDate, "2024-12-24").unwrap(),
            DripValue::SpecDate(Utc.with_ymd_and_hms(2024, 12, 24, 0, 0, 0).unwrap())
        );
        assert_eq!(
            DripValue::parse(DripField::AvailDate, "2024-12-24T08:30:00+02:00").unwrap(),
            DripValue::AvailDate(Utc.with_ymd_and_hms(2024, 12, 24, 6, 30, 0).unwrap())
        );
        assert_matches!(
            DripValue::parse(DripField::PeriodUnit, "-2"),
            Err(RuleError::InvalidDripValue {
                field: DripField::PeriodUnit,
                ..
            })
        );
        assert_matches!(
            DripValue::parse(DripField::SpecDate, "tomorrow"),
            Err(RuleError::InvalidDripValue { .. })
        );
    }
}
