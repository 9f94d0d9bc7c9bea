//! 倡议编辑表单（机构控制台）

use super::{FormModel, ImageField, ValidationError};
use crate::resources::initiatives::{InitiativeDraft, InitiativeUpdate};
use huraymila_shared::CalendarDate;
use huraymila_shared::models::Initiative;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitiativeForm {
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub category: String,
    /// 名额上限；留空表示不限
    pub max_volunteers: String,
    pub image: ImageField,
}

/// 已校验的字段值
struct Checked {
    start: CalendarDate,
    end: CalendarDate,
    max_volunteers: Option<u32>,
}

impl InitiativeForm {
    fn check(&self) -> Result<Checked, ValidationError> {
        let mut err = ValidationError::default();
        for (name, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
        ] {
            if value.trim().is_empty() {
                err.missing.push(name);
            }
        }
        err.into_result()?;

        let start = CalendarDate::parse(&self.start_date)
            .ok_or_else(|| ValidationError::invalid("startDate"))?;
        let end = CalendarDate::parse(&self.end_date)
            .ok_or_else(|| ValidationError::invalid("endDate"))?;
        if end < start {
            return Err(ValidationError::invalid("endDate"));
        }

        let max_volunteers = match self.max_volunteers.trim() {
            "" => None,
            raw => match raw.parse::<u32>() {
                Ok(n) if n > 0 => Some(n),
                _ => return Err(ValidationError::invalid("maxVolunteers")),
            },
        };

        Ok(Checked {
            start,
            end,
            max_volunteers,
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// 与原值不同时返回新值
fn changed(new: &str, old: Option<&str>) -> Option<String> {
    let new = new.trim();
    (new != old.unwrap_or_default()).then(|| new.to_string())
}

impl FormModel for InitiativeForm {
    type Record = Initiative;
    type Draft = InitiativeDraft;
    type Update = InitiativeUpdate;

    fn blank() -> Self {
        Self::default()
    }

    fn from_record(record: &Initiative) -> Self {
        let date = |d: Option<CalendarDate>| d.map(|d| d.to_string()).unwrap_or_default();
        Self {
            title: record.title.clone(),
            description: record.description.clone().unwrap_or_default(),
            start_date: date(record.start_date),
            end_date: date(record.end_date),
            location: record.location.clone().unwrap_or_default(),
            category: record.category.clone().unwrap_or_default(),
            max_volunteers: record
                .max_volunteers
                .map(|n| n.to_string())
                .unwrap_or_default(),
            image: ImageField::with_current(record.image.clone()),
        }
    }

    fn record_id(record: &Initiative) -> &str {
        &record.id
    }

    fn to_draft(&self) -> Result<InitiativeDraft, ValidationError> {
        let checked = self.check()?;
        Ok(InitiativeDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            start_date: checked.start,
            end_date: checked.end,
            location: non_empty(&self.location),
            category: non_empty(&self.category),
            max_volunteers: checked.max_volunteers,
            image: self.image.selected().cloned(),
        })
    }

    fn to_update(&self, original: &Initiative) -> Result<InitiativeUpdate, ValidationError> {
        let checked = self.check()?;
        Ok(InitiativeUpdate {
            title: changed(&self.title, Some(&original.title)),
            description: changed(&self.description, original.description.as_deref()),
            start_date: (Some(checked.start) != original.start_date).then_some(checked.start),
            end_date: (Some(checked.end) != original.end_date).then_some(checked.end),
            location: changed(&self.location, original.location.as_deref()),
            category: changed(&self.category, original.category.as_deref()),
            max_volunteers: (checked.max_volunteers != original.max_volunteers)
                .then_some(checked.max_volunteers),
            image: self.image.selected().cloned(),
        })
    }
}
