// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Content category a rule governs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Single pages.
    Page,

    /// Single posts.
    Post,

    /// Post categories.
    Category,

    /// Individual items of a custom post type.
    CptItem,

    /// Whole custom post types.
    CptGroup,

    /// Comments and "read more" content.
    Content,

    /// Media attachments.
    Media,

    /// Navigation menu items.
    Menu,

    /// Shortcodes.
    Shortcode,

    /// Arbitrary urls.
    Url,

    /// Special pages (archives, search, 404, ..).
    Special,

    /// Minimal rule without any content-specific behaviour. Built when a known type is not
    /// registered for the running installation.
    Unspecialized,
}

impl RuleType {
    /// All specialized rule types in their display order.
    pub const BUILTIN: [RuleType; 11] = [
        RuleType::Page,
        RuleType::Post,
        RuleType::Category,
        RuleType::CptItem,
        RuleType::CptGroup,
        RuleType::Content,
        RuleType::Media,
        RuleType::Menu,
        RuleType::Shortcode,
        RuleType::Url,
        RuleType::Special,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Page => "page",
            RuleType::Post => "post",
            RuleType::Category => "category",
            RuleType::CptItem => "cpt_item",
            RuleType::CptGroup => "cpt_group",
            RuleType::Content => "content",
            RuleType::Media => "media",
            RuleType::Menu => "menu",
            RuleType::Shortcode => "shortcode",
            RuleType::Url => "url",
            RuleType::Special => "special",
            RuleType::Unspecialized => "unspecialized",
        }
    }
}

impl Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rule_type = match s.trim() {
            "page" => RuleType::Page,
            "post" => RuleType::Post,
            "category" => RuleType::Category,
            "cpt_item" => RuleType::CptItem,
            "cpt_group" => RuleType::CptGroup,
            "content" => RuleType::Content,
            "media" => RuleType::Media,
            "menu" => RuleType::Menu,
            "shortcode" => RuleType::Shortcode,
            "url" => RuleType::Url,
            "special" => RuleType::Special,
            "unspecialized" => RuleType::Unspecialized,
            other => return Err(RuleError::UnknownRuleType(other.to_string())),
        };
        Ok(rule_type)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::RuleType;
    use crate::error::RuleError;

    #[test]
    fn parse_known_tags() {
        for rule_type in RuleType::BUILTIN {
            assert_eq!(rule_type.as_str().parse::<RuleType>().unwrap(), rule_type);
        }
        assert_eq!(" page ".parse::<RuleType>().unwrap(), RuleType::Page);
    }

    #[test]
    fn unknown_tag_is_typed_error() {
        assert_matches!(
            "forum".parse::<RuleType>(),
            Err(RuleError::UnknownRuleType(tag)) if tag == "forum"
        );
    }
}
