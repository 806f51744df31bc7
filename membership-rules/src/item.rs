// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a membership owning a set of rules.
pub type MembershipId = u64;

/// Opaque key of a content item governed by a rule.
///
/// Content ids are either numeric (posts, pages, terms) or textual (urls, menu slugs, special
/// pages). Both forms are only ever compared, never interpreted.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Str(String),
}

impl ItemId {
    /// Id which can never match a real content item.
    ///
    /// Handing `{-1}` to a content query makes it return zero rows, which is different from
    /// handing it an empty set (no filter at all).
    pub const SENTINEL: ItemId = ItemId::Int(-1);

    /// Returns true when the id does not point at any item.
    ///
    /// The empty string, `"0"` and `0` are all treated as "no item".
    pub fn is_empty(&self) -> bool {
        match self {
            ItemId::Int(id) => *id == 0,
            ItemId::Str(id) => id.is_empty() || id == "0",
        }
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemId::Int(id) => write!(f, "{}", id),
            ItemId::Str(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        ItemId::Int(value)
    }
}

impl From<i32> for ItemId {
    fn from(value: i32) -> Self {
        ItemId::Int(value as i64)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(id) => ItemId::Int(id),
            Err(_) => ItemId::Str(value.to_string()),
        }
    }
}

impl From<&str> for ItemId {
    /// Numeric strings collapse into integer ids so `"12"` and `12` address the same item.
    fn from(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(id) if id.to_string() == value => ItemId::Int(id),
            _ => ItemId::Str(value.to_string()),
        }
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        ItemId::from(value.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ItemIdVisitor;

        impl Visitor<'_> for ItemIdVisitor {
            type Value = ItemId;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("an integer or string item id")
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(ItemId::Int(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(ItemId::from(value))
            }

            // Map keys arrive as strings, numeric ones are turned back into integers here.
            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(ItemId::from(value))
            }
        }

        deserializer.deserialize_any(ItemIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::ItemId;

    #[test]
    fn numeric_strings_collapse() {
        assert_eq!(ItemId::from("12"), ItemId::Int(12));
        assert_eq!(ItemId::from("-1"), ItemId::SENTINEL);
        assert_eq!(ItemId::from("012"), ItemId::Str("012".into()));
        assert_eq!(ItemId::from("about-us"), ItemId::Str("about-us".into()));
    }

    #[test]
    fn emptiness() {
        assert!(ItemId::from(0).is_empty());
        assert!(ItemId::from("").is_empty());
        assert!(ItemId::Str("0".into()).is_empty());
        assert!(!ItemId::from(7).is_empty());
        assert!(!ItemId::SENTINEL.is_empty());
    }

    #[test]
    fn untagged_serialization() {
        let ids = vec![ItemId::from(3), ItemId::from("/shop")];
        let json = serde_json::to_string(&ids).unwrap();
        assert_eq!(json, r#"[3,"/shop"]"#);
        let back: Vec<ItemId> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ids);
    }

    #[test]
    fn map_keys_keep_integer_ids() {
        let mut map = BTreeMap::new();
        map.insert(ItemId::from(5), true);
        map.insert(ItemId::from("news"), true);
        let json = serde_json::to_string(&map).unwrap();
        let back: BTreeMap<ItemId, bool> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
