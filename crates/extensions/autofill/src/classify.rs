//! Value classification.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What kind of personal datum a value looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Name,
    Phone,
    Email,
    NationalId,
    Date,
    Address,
    Unclassified,
}

impl FieldKind {
    /// Fingerprint keywords that make a field eligible for this kind.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            FieldKind::Name => &["name", "姓名", "名字"],
            FieldKind::Phone => &["phone", "tel", "电话", "手机"],
            FieldKind::Email => &["email", "邮箱", "邮件"],
            FieldKind::NationalId => &["id", "身份证", "证件"],
            FieldKind::Date => &["date", "birth", "日期", "出生"],
            FieldKind::Address => &["address", "city", "地址", "城市"],
            FieldKind::Unclassified => &[],
        }
    }

    pub fn is_classified(&self) -> bool {
        *self != FieldKind::Unclassified
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Name => "name",
            FieldKind::Phone => "phone",
            FieldKind::Email => "email",
            FieldKind::NationalId => "national id",
            FieldKind::Date => "date",
            FieldKind::Address => "address",
            FieldKind::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("classification pattern is valid")
}

static CJK_NAME: Lazy<Regex> = Lazy::new(|| pattern(r"^[\x{4e00}-\x{9fa5}]{2,4}$"));
static LATIN_NAME: Lazy<Regex> = Lazy::new(|| pattern(r"^[a-zA-Z\s]{2,20}$"));
static MOBILE: Lazy<Regex> = Lazy::new(|| pattern(r"^1[3-9][0-9]{9}$"));
static ELEVEN_DIGITS: Lazy<Regex> = Lazy::new(|| pattern(r"^[0-9]{11}$"));
static EMAIL: Lazy<Regex> = Lazy::new(|| pattern(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));
static NATIONAL_ID: Lazy<Regex> = Lazy::new(|| pattern(r"^[0-9]{17}[0-9Xx]$"));
static DASHED_DATE: Lazy<Regex> = Lazy::new(|| pattern(r"^[0-9]{4}[-/][0-9]{1,2}[-/][0-9]{1,2}$"));
static CJK_DATE: Lazy<Regex> = Lazy::new(|| pattern(r"^[0-9]{4}年[0-9]{1,2}月[0-9]{1,2}日$"));

const ADDRESS_MARKERS: [char; 4] = ['市', '省', '区', '县'];

fn is_name(value: &str) -> bool {
    CJK_NAME.is_match(value) || LATIN_NAME.is_match(value)
}

fn is_phone(value: &str) -> bool {
    MOBILE.is_match(value) || ELEVEN_DIGITS.is_match(value)
}

fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

fn is_national_id(value: &str) -> bool {
    NATIONAL_ID.is_match(value)
}

fn is_date(value: &str) -> bool {
    DASHED_DATE.is_match(value) || CJK_DATE.is_match(value)
}

fn is_address(value: &str) -> bool {
    value.chars().count() > 5 && value.contains(ADDRESS_MARKERS)
}

/// Classify a value; the first matching kind wins.
pub fn classify(value: &str) -> FieldKind {
    const ORDER: [(FieldKind, fn(&str) -> bool); 6] = [
        (FieldKind::Name, is_name),
        (FieldKind::Phone, is_phone),
        (FieldKind::Email, is_email),
        (FieldKind::NationalId, is_national_id),
        (FieldKind::Date, is_date),
        (FieldKind::Address, is_address),
    ];
    ORDER
        .iter()
        .find(|(_, predicate)| predicate(value))
        .map(|(kind, _)| *kind)
        .unwrap_or(FieldKind::Unclassified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_values() {
        assert_eq!(classify("13812345678"), FieldKind::Phone);
        assert_eq!(classify("a@b.com"), FieldKind::Email);
        assert_eq!(classify("2023-05-01"), FieldKind::Date);
        assert_eq!(classify("北京市朝阳区"), FieldKind::Address);
        assert_eq!(classify("random!!text##"), FieldKind::Unclassified);
    }

    #[test]
    fn test_names() {
        assert_eq!(classify("张三"), FieldKind::Name);
        assert_eq!(classify("欧阳娜娜"), FieldKind::Name);
        assert_eq!(classify("John Smith"), FieldKind::Name);
        assert_eq!(classify("A"), FieldKind::Unclassified);
    }

    #[test]
    fn test_phone_variants() {
        assert_eq!(classify("02012345678"), FieldKind::Phone);
        assert_eq!(classify("1381234567"), FieldKind::Unclassified);
    }

    #[test]
    fn test_national_id() {
        assert_eq!(classify("11010519491231002X"), FieldKind::NationalId);
        assert_eq!(classify("110105194912310021"), FieldKind::NationalId);
    }

    #[test]
    fn test_dates() {
        assert_eq!(classify("2023/5/1"), FieldKind::Date);
        assert_eq!(classify("2023年5月1日"), FieldKind::Date);
        assert_eq!(classify("05-01-2023"), FieldKind::Unclassified);
    }

    #[test]
    fn test_short_cjk_with_marker_is_name_first() {
        // Four CJK characters match the name pattern before the address rule.
        assert_eq!(classify("朝阳区县"), FieldKind::Name);
    }

    #[test]
    fn test_address_needs_more_than_five_chars() {
        assert_eq!(classify("海淀区12"), FieldKind::Unclassified);
        assert_eq!(classify("海淀区123号"), FieldKind::Address);
    }

    #[test]
    fn test_idempotent() {
        for value in ["13812345678", "a@b.com", "random!!text##", "北京市朝阳区"] {
            assert_eq!(classify(value), classify(value));
        }
    }

    #[test]
    fn test_keywords() {
        assert!(FieldKind::Phone.keywords().contains(&"tel"));
        assert!(FieldKind::Unclassified.keywords().is_empty());
        assert!(!FieldKind::Unclassified.is_classified());
    }
}
