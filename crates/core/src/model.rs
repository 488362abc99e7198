//! Closed enumerations catalog items are classified by.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Storefront visibility of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    Hidden,
    Visible,
}

impl Visibility {
    pub const ALL: [Visibility; 2] = [Visibility::Hidden, Visibility::Visible];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Hidden => "HIDDEN",
            Visibility::Visible => "VISIBLE",
        }
    }
}

/// Growth-share (BCG matrix) classification tag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BcgTag {
    CashCow,
    Dog,
    QuestionMark,
    Star,
    #[default]
    Unclassified,
}

impl BcgTag {
    pub const ALL: [BcgTag; 5] = [
        BcgTag::CashCow,
        BcgTag::Dog,
        BcgTag::QuestionMark,
        BcgTag::Star,
        BcgTag::Unclassified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BcgTag::CashCow => "CASH_COW",
            BcgTag::Dog => "DOG",
            BcgTag::QuestionMark => "QUESTION_MARK",
            BcgTag::Star => "STAR",
            BcgTag::Unclassified => "UNCLASSIFIED",
        }
    }
}

macro_rules! impl_enum_text {
    ($t:ident, $kind:literal) => {
        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_uppercase();
                $t::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let expected: Vec<&str> = $t::ALL.iter().map(|v| v.as_str()).collect();
                        DomainError::invalid_enum($kind, s, &expected)
                    })
            }
        }
    };
}

impl_enum_text!(Visibility, "visibility");
impl_enum_text!(BcgTag, "bcgTag");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("visible".parse::<Visibility>().unwrap(), Visibility::Visible);
        assert_eq!("cash_cow".parse::<BcgTag>().unwrap(), BcgTag::CashCow);
    }

    #[test]
    fn unknown_value_lists_expected_members() {
        let err = "SHINY".parse::<BcgTag>().unwrap_err();
        match err {
            DomainError::InvalidEnum { kind, expected, .. } => {
                assert_eq!(kind, "bcgTag");
                assert!(expected.contains("QUESTION_MARK"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn serde_matches_display() {
        for tag in BcgTag::ALL {
            let json = serde_json::to_string(&tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag.as_str()));
        }
        for v in Visibility::ALL {
            let json = serde_json::to_string(&v).unwrap();
            assert_eq!(json, format!("\"{}\"", v.as_str()));
        }
    }
}
