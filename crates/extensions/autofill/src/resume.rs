//! Resume field extraction from parsed plain text.

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9])(1[3-9][0-9]{9})(?:[^0-9]|$)").expect("valid phone pattern"));
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email pattern")
});
static ID_CARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^0-9])([0-9]{17}[0-9Xx])(?:[^0-9Xx]|$)").expect("valid id card pattern")
});

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y年%m月%d日"];

/// Fields recovered from a resume; anything not found stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_card: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
}

impl ResumeInfo {
    /// Populated fields as `(key, display label, value)`, in display order.
    pub fn fields(&self) -> Vec<(&'static str, &'static str, String)> {
        let age = self.age.map(|a| a.to_string());
        [
            ("name", "姓名", self.name.as_ref()),
            ("age", "年龄", age.as_ref()),
            ("idCard", "身份证号", self.id_card.as_ref()),
            ("birthDate", "出生日期", self.birth_date.as_ref()),
            ("gender", "性别", self.gender.as_ref()),
            ("nationality", "民族", self.nationality.as_ref()),
            ("city", "现居住城市", self.city.as_ref()),
            ("phone", "电话", self.phone.as_ref()),
            ("email", "邮箱", self.email.as_ref()),
            ("education", "教育背景", self.education.as_ref()),
            ("experience", "工作经历", self.experience.as_ref()),
        ]
        .into_iter()
        .filter_map(|(key, label, value)| value.map(|v| (key, label, v.clone())))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Name,
    IdCard,
    BirthDate,
    Gender,
    Nationality,
    City,
    Phone,
    Email,
    Education,
    Experience,
}

const LABELS: &[(&str, Slot)] = &[
    ("姓名", Slot::Name),
    ("name", Slot::Name),
    ("身份证号", Slot::IdCard),
    ("身份证", Slot::IdCard),
    ("出生日期", Slot::BirthDate),
    ("birth date", Slot::BirthDate),
    ("性别", Slot::Gender),
    ("gender", Slot::Gender),
    ("民族", Slot::Nationality),
    ("nationality", Slot::Nationality),
    ("现居住城市", Slot::City),
    ("居住城市", Slot::City),
    ("city", Slot::City),
    ("电话", Slot::Phone),
    ("手机", Slot::Phone),
    ("phone", Slot::Phone),
    ("邮箱", Slot::Email),
    ("email", Slot::Email),
    ("教育背景", Slot::Education),
    ("education", Slot::Education),
    ("工作经历", Slot::Experience),
    ("experience", Slot::Experience),
];

fn slot_for(key: &str) -> Option<Slot> {
    let key = key.trim().to_lowercase();
    LABELS.iter().find(|(label, _)| *label == key).map(|(_, slot)| *slot)
}

/// Split `key：value` or `key: value`; the first separator wins.
fn split_label(line: &str) -> Option<(&str, &str)> {
    let at = line.find([':', '：'])?;
    let sep_len = line[at..].chars().next().map_or(1, char::len_utf8);
    let value = line[at + sep_len..].trim();
    (!value.is_empty()).then(|| (&line[..at], value))
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text.trim(), format).ok())
}

/// Full years between `birth` and `today`; `None` for a future birth date.
fn age_on(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Birth date and gender encoded in an 18-digit id card number.
fn decode_id_card(id: &str) -> Option<(NaiveDate, &'static str)> {
    if id.len() != 18 || !id.is_ascii() {
        return None;
    }
    let birth = NaiveDate::parse_from_str(&id[6..14], "%Y%m%d").ok()?;
    let order = id[16..17].parse::<u32>().ok()?;
    let gender = if order % 2 == 1 { "男" } else { "女" };
    Some((birth, gender))
}

/// Pulls resume fields out of plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResumeExtractor;

impl ResumeExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract using today's local date for the age.
    pub fn extract(&self, text: &str) -> ResumeInfo {
        self.extract_at(text, Local::now().date_naive())
    }

    pub fn extract_at(&self, text: &str, today: NaiveDate) -> ResumeInfo {
        let mut info = ResumeInfo::default();

        for line in text.lines() {
            let Some((key, value)) = split_label(line) else {
                continue;
            };
            let Some(slot) = slot_for(key) else {
                continue;
            };
            let target = match slot {
                Slot::Name => &mut info.name,
                Slot::IdCard => &mut info.id_card,
                Slot::BirthDate => &mut info.birth_date,
                Slot::Gender => &mut info.gender,
                Slot::Nationality => &mut info.nationality,
                Slot::City => &mut info.city,
                Slot::Phone => &mut info.phone,
                Slot::Email => &mut info.email,
                Slot::Education => &mut info.education,
                Slot::Experience => &mut info.experience,
            };
            if target.is_none() {
                *target = Some(value.to_string());
            }
        }

        if info.phone.is_none() {
            info.phone = PHONE.captures(text).map(|c| c[1].to_string());
        }
        if info.email.is_none() {
            info.email = EMAIL.find(text).map(|m| m.as_str().to_string());
        }
        if info.id_card.is_none() {
            info.id_card = ID_CARD.captures(text).map(|c| c[1].to_uppercase());
        }

        if let Some((birth, gender)) = info.id_card.as_deref().and_then(decode_id_card) {
            if info.birth_date.is_none() {
                info.birth_date = Some(birth.format("%Y-%m-%d").to_string());
            }
            if info.gender.is_none() {
                info.gender = Some(gender.to_string());
            }
        }

        info.age = info
            .birth_date
            .as_deref()
            .and_then(parse_date)
            .and_then(|birth| age_on(birth, today));

        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_labelled_lines() {
        let text = "姓名：张三\n民族: 汉族\n现居住城市：北京\nEducation: 清华大学 本科\n工作经历：某公司 工程师";
        let info = ResumeExtractor::new().extract_at(text, today());
        assert_eq!(info.name.as_deref(), Some("张三"));
        assert_eq!(info.nationality.as_deref(), Some("汉族"));
        assert_eq!(info.city.as_deref(), Some("北京"));
        assert_eq!(info.education.as_deref(), Some("清华大学 本科"));
        assert_eq!(info.experience.as_deref(), Some("某公司 工程师"));
    }

    #[test]
    fn test_unlabelled_shapes() {
        let text = "Contact 13812345678 or zhang.san@example.com\nID 11010519900307123X";
        let info = ResumeExtractor::new().extract_at(text, today());
        assert_eq!(info.phone.as_deref(), Some("13812345678"));
        assert_eq!(info.email.as_deref(), Some("zhang.san@example.com"));
        assert_eq!(info.id_card.as_deref(), Some("11010519900307123X"));
    }

    #[test]
    fn test_id_card_derives_birth_gender_age() {
        let info = ResumeExtractor::new().extract_at("身份证号：110105199006071234", today());
        assert_eq!(info.birth_date.as_deref(), Some("1990-06-07"));
        assert_eq!(info.gender.as_deref(), Some("男"));
        assert_eq!(info.age, Some(33));

        let info = ResumeExtractor::new().extract_at("110105199001011224", today());
        assert_eq!(info.gender.as_deref(), Some("女"));
        assert_eq!(info.age, Some(34));
    }

    #[test]
    fn test_labels_take_precedence() {
        let text = "出生日期：1985/02/03\n性别：女\n身份证：110105199006071234";
        let info = ResumeExtractor::new().extract_at(text, today());
        assert_eq!(info.birth_date.as_deref(), Some("1985/02/03"));
        assert_eq!(info.gender.as_deref(), Some("女"));
        assert_eq!(info.age, Some(39));
    }

    #[test]
    fn test_phone_not_taken_from_id_card() {
        let info = ResumeExtractor::new().extract_at("110105199006071234", today());
        assert_eq!(info.phone, None);
    }

    #[test]
    fn test_future_birth_date_has_no_age() {
        let info = ResumeExtractor::new().extract_at("出生日期：2030-01-01", today());
        assert_eq!(info.age, None);
    }

    #[test]
    fn test_fields_for_display() {
        let info = ResumeExtractor::new().extract_at("Name: Li Lei\nPhone: 13900001111", today());
        let keys: Vec<&str> = info.fields().iter().map(|(k, _, _)| *k).collect();
        assert_eq!(keys, vec!["name", "phone"]);
        assert_eq!(info.fields()[0].1, "姓名");
        assert!(ResumeInfo::default().is_empty());
    }

    #[test]
    fn test_serializes_camel_case_without_missing() {
        let info = ResumeExtractor::new().extract_at("身份证号：110105199006071234", today());
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["idCard"], "110105199006071234");
        assert_eq!(json["birthDate"], "1990-06-07");
        assert!(json.get("name").is_none());
    }
}
