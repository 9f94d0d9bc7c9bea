//! 后端 REST 资源的传输模型
//!
//! 所有资源都带有 `extra` 字段收集未识别的属性，客户端不会因为后端新增字段而丢数据。

use crate::UserRecord;
use crate::date::CalendarDate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 以字符串传输的枚举；未知取值保存在 `Other` 中
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $text,)+
                    $name::Other(s) => s,
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.as_str() {
                    $($text => $name::$variant,)+
                    _ => $name::Other(s),
                }
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                v.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(
    /// 审核状态（倡议、标准提交、志愿者申请）
    ReviewStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Declined => "declined",
    }
);

impl Default for ReviewStatus {
    fn default() -> Self {
        ReviewStatus::Pending
    }
}

string_enum!(
    /// 倡议的生命周期状态
    InitiativeStatus {
        Pending => "pending",
        Active => "active",
        Completed => "completed",
        Cancelled => "cancelled",
        Declined => "declined",
    }
);

string_enum!(
    /// 市民报告的处理状态
    ReportStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Resolved => "resolved",
        Rejected => "rejected",
    }
);

impl Default for ReportStatus {
    fn default() -> Self {
        ReportStatus::Pending
    }
}

// =========================================================
// 通用包装 (Envelope)
// =========================================================

/// 后端统一响应格式 `{ success, message, data, pagination }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// 无数据的确认响应（删除、撤回等）
///
/// `204 No Content` 的空响应体解析为 `null`，此时得到 `Ack::default()`。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<AckBody>")]
pub struct Ack {
    pub success: Option<bool>,
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct AckBody {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

impl From<Option<AckBody>> for Ack {
    fn from(body: Option<AckBody>) -> Self {
        body.map(|b| Ack {
            success: b.success,
            message: b.message,
        })
        .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default, alias = "currentPage")]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default, alias = "totalItems")]
    pub total: u64,
    #[serde(default, alias = "totalPages")]
    pub pages: u32,
}

/// 上传后的文件引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(alias = "path")]
    pub url: String,
    #[serde(default, alias = "originalname")]
    pub original_name: Option<String>,
    #[serde(default, alias = "mimetype")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

// =========================================================
// 认证 (Auth)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

// =========================================================
// 内容资源 (Content)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct News {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<CalendarDate>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessStory {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<CalendarDate>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiative {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<CalendarDate>,
    #[serde(default)]
    pub end_date: Option<CalendarDate>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<InitiativeStatus>,
    #[serde(default)]
    pub approval_status: Option<ReviewStatus>,
    #[serde(default)]
    pub max_volunteers: Option<u32>,
    /// 已报名的志愿者；后端可能返回 id 或展开后的对象
    #[serde(default)]
    pub volunteers: Vec<Value>,
    /// 发起机构；后端可能返回 id 或展开后的对象
    #[serde(default)]
    pub agency: Option<Value>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Initiative {
    /// 剩余名额；未设置上限时为 `None`
    pub fn remaining_slots(&self) -> Option<u32> {
        self.max_volunteers
            .map(|max| max.saturating_sub(self.volunteers.len() as u32))
    }
}

// =========================================================
// 标准与提交 (Standards & Submissions)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standard {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub number: Option<u32>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub assigned_agencies: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub standard: Value,
    #[serde(default)]
    pub agency: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default)]
    pub reviewer_notes: Option<String>,
    #[serde(default)]
    pub files: Vec<Attachment>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =========================================================
// 参与者 (Agencies & Volunteers)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agency {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub agency_type: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(alias = "name")]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub status: Option<ReviewStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =========================================================
// 报告与指标 (Reports & Health Indicators)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatistics {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub in_progress: u64,
    #[serde(default)]
    pub resolved: u64,
    #[serde(default)]
    pub rejected: u64,
    #[serde(default)]
    pub by_category: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthIndicator {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HealthIndicator {
    /// 当前值占目标值的比例；缺少任一值或目标为 0 时为 `None`
    pub fn progress(&self) -> Option<f64> {
        match (self.value, self.target) {
            (Some(v), Some(t)) if t != 0.0 => Some(v / t),
            _ => None,
        }
    }
}
