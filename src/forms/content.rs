//! 新闻与成功故事的编辑表单

use super::{FormModel, ImageField, ValidationError};
use crate::resources::content::{ContentDraft, ContentUpdate};
use huraymila_shared::CalendarDate;
use huraymila_shared::models::{News, SuccessStory};
use std::marker::PhantomData;

/// 可被 `ContentForm` 编辑的记录
pub trait ContentRecord {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn subtitle(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
    fn date(&self) -> Option<CalendarDate>;
    fn priority(&self) -> Option<u32>;
    fn image(&self) -> Option<&str>;
}

macro_rules! impl_content_record {
    ($($ty:ty),+) => {
        $(impl ContentRecord for $ty {
            fn id(&self) -> &str {
                &self.id
            }
            fn title(&self) -> &str {
                &self.title
            }
            fn subtitle(&self) -> Option<&str> {
                self.subtitle.as_deref()
            }
            fn description(&self) -> Option<&str> {
                self.description.as_deref()
            }
            fn date(&self) -> Option<CalendarDate> {
                self.date
            }
            fn priority(&self) -> Option<u32> {
                self.priority
            }
            fn image(&self) -> Option<&str> {
                self.image.as_deref()
            }
        })+
    };
}

impl_content_record!(News, SuccessStory);

/// 表单输入，字段保持输入框中的原始文本
#[derive(Debug, Clone, PartialEq)]
pub struct ContentForm<R> {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub priority: Option<u32>,
    pub image: ImageField,
    _record: PhantomData<R>,
}

pub type NewsForm = ContentForm<News>;
pub type SuccessStoryForm = ContentForm<SuccessStory>;

impl<R> ContentForm<R> {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.date.trim().is_empty() {
            missing.push("date");
        }
        missing
    }

    /// 校验必填项并解析日期
    fn checked_date(&self) -> Result<CalendarDate, ValidationError> {
        ValidationError::missing(self.missing_fields()).into_result()?;
        CalendarDate::parse(&self.date).ok_or(ValidationError::invalid("date"))
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl<R: ContentRecord> FormModel for ContentForm<R> {
    type Record = R;
    type Draft = ContentDraft;
    type Update = ContentUpdate;

    fn blank() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            description: String::new(),
            date: CalendarDate::today().to_string(),
            priority: None,
            image: ImageField::default(),
            _record: PhantomData,
        }
    }

    fn from_record(record: &R) -> Self {
        Self {
            title: record.title().to_string(),
            subtitle: record.subtitle().unwrap_or_default().to_string(),
            description: record.description().unwrap_or_default().to_string(),
            date: record.date().map(|d| d.to_string()).unwrap_or_default(),
            priority: record.priority(),
            image: ImageField::with_current(record.image().map(str::to_string)),
            _record: PhantomData,
        }
    }

    fn record_id(record: &R) -> &str {
        record.id()
    }

    fn to_draft(&self) -> Result<ContentDraft, ValidationError> {
        let date = self.checked_date()?;
        Ok(ContentDraft {
            title: self.title.trim().to_string(),
            subtitle: non_empty(&self.subtitle),
            description: self.description.trim().to_string(),
            date,
            priority: self.priority,
            image: self.image.selected().cloned(),
        })
    }

    fn to_update(&self, original: &R) -> Result<ContentUpdate, ValidationError> {
        let date = self.checked_date()?;

        let title = self.title.trim();
        let subtitle = self.subtitle.trim();
        let description = self.description.trim();

        Ok(ContentUpdate {
            title: (title != original.title()).then(|| title.to_string()),
            // 清空副标题时发送空字符串
            subtitle: (subtitle != original.subtitle().unwrap_or_default())
                .then(|| subtitle.to_string()),
            description: (description != original.description().unwrap_or_default())
                .then(|| description.to_string()),
            date: (Some(date) != original.date()).then_some(date),
            priority: (self.priority != original.priority()).then_some(self.priority),
            image: self.image.selected().cloned(),
        })
    }
}
