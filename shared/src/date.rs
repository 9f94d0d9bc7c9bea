//! 日期类型模块
//!
//! 后端对同一个字段既可能返回 `2024-05-01`（表单原样提交），
//! 也可能返回 `2024-05-01T00:00:00.000Z`（数据库序列化）。
//! `CalendarDate` 统一接受两种写法，序列化时总是输出 `YYYY-MM-DD`。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 日历日期（不含时间）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// 从年月日构造，非法日期返回 `None`
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// 解析日期字符串
    ///
    /// 依次尝试 `YYYY-MM-DD` 与 RFC 3339；RFC 3339 按 UTC 取日期部分。
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(d) = NaiveDate::parse_from_str(s, Self::FORMAT) {
            return Some(Self(d));
        }
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| Self(t.with_timezone(&Utc).date_naive()))
    }

    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    #[inline]
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for CalendarDate {
    type Err = InvalidDate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidDate(s.to_string()))
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(d: NaiveDate) -> Self {
        Self(d)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom(InvalidDate(raw)))
    }
}

/// 无法识别的日期字符串
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDate(pub String);

impl fmt::Display for InvalidDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid date: {:?}", self.0)
    }
}

impl std::error::Error for InvalidDate {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_both_shapes() {
        let plain = CalendarDate::parse("2024-05-01").unwrap();
        let stamped = CalendarDate::parse("2024-05-01T00:00:00.000Z").unwrap();
        assert_eq!(plain, stamped);
        assert_eq!(plain.to_string(), "2024-05-01");
    }

    #[test]
    fn test_rfc3339_offset_is_normalised_to_utc() {
        // +03:00 的 02:00 是 UTC 前一天 23:00
        let d = CalendarDate::parse("2024-05-01T02:00:00+03:00").unwrap();
        assert_eq!(d, CalendarDate::from_ymd(2024, 4, 30).unwrap());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(CalendarDate::parse("tomorrow").is_none());
        assert!("2024-13-40".parse::<CalendarDate>().is_err());
        let err = serde_json::from_str::<CalendarDate>("\"nope\"").unwrap_err();
        assert!(err.to_string().contains("invalid date"));
    }
}
