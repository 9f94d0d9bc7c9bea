use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod date;
pub mod models;
pub mod patch;
pub mod protocol;

pub use chrono;
pub use date::CalendarDate;
pub use patch::{FileUpload, IntoPatch, Patch, PatchValue};
pub use protocol::{HttpMethod, Resource};

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 持久化存储中保存 Bearer Token 的键
pub const STORAGE_TOKEN_KEY: &str = "token";
/// 持久化存储中保存用户 JSON 的键
pub const STORAGE_USER_KEY: &str = "user";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 用户角色
///
/// 后端返回的 `type` 字段。未知角色原样保留，便于写回存储。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserType {
    Governor,
    Agency,
    Volunteer,
    Other(String),
}

impl UserType {
    pub fn as_str(&self) -> &str {
        match self {
            UserType::Governor => "governor",
            UserType::Agency => "agency",
            UserType::Volunteer => "volunteer",
            UserType::Other(s) => s,
        }
    }
}

impl From<String> for UserType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "governor" => UserType::Governor,
            "agency" => UserType::Agency,
            "volunteer" => UserType::Volunteer,
            _ => UserType::Other(s),
        }
    }
}

impl From<&str> for UserType {
    fn from(s: &str) -> Self {
        UserType::from(s.to_string())
    }
}

impl From<UserType> for String {
    fn from(t: UserType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 客户端缓存的用户记录
///
/// 除 `type` 之外的字段对客户端是不透明的，保存在 `profile` 中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl UserRecord {
    pub fn new(email: impl Into<String>, user_type: UserType) -> Self {
        Self {
            id: None,
            email: email.into(),
            user_type,
            name: None,
            profile: Map::new(),
        }
    }
}
