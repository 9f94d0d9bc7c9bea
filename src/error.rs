use std::fmt;

use serde_json::Value;

// =========================================================
// 错误类型枚举
// =========================================================

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 网络层失败：请求未能发出或连接中断
    Transport,
    /// 服务端返回非 2xx 状态码
    Status,
    /// 响应体无法解析为期望的类型
    Decode,
    /// 本地校验失败，请求未发出
    Validation,
    /// 持久化存储读写失败
    Storage,
}

impl ApiErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorKind::Transport => "NETWORK_ERROR",
            ApiErrorKind::Status => "HTTP_ERROR",
            ApiErrorKind::Decode => "RESPONSE_PARSE_ERROR",
            ApiErrorKind::Validation => "VALIDATION_ERROR",
            ApiErrorKind::Storage => "STORAGE_ERROR",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpan {
    /// 操作名称，如 "news.update", "auth.login"
    pub operation: String,
    /// 额外细节，如资源 id
    pub detail: Option<String>,
}

// =========================================================
// 核心错误类型
// =========================================================

/// 客户端统一错误
///
/// - kind: 错误类别
/// - message: 面向用户的消息（优先使用服务端返回的 `message`）
/// - status: HTTP 状态码（仅 `Status` 类别）
/// - spans: 调用追踪栈
/// - source: 原始错误
#[derive(Debug)]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
    status: Option<u16>,
    spans: Vec<ErrorSpan>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            spans: Vec::new(),
            source: None,
        }
    }

    // --- Convenience constructors ---

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        let mut e = Self::new(ApiErrorKind::Status, message);
        e.status = Some(status);
        e
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Storage, message)
    }

    /// 从非 2xx 响应构造错误
    ///
    /// 依次取 JSON 体中的 `message`、`error` 字段；都没有时使用带状态码的通用消息。
    pub fn from_response(status: u16, body: &str) -> Self {
        let server_message = serde_json::from_str::<Value>(body).ok().and_then(|v| {
            ["message", "error"].iter().find_map(|key| {
                v.get(*key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
        });

        let message =
            server_message.unwrap_or_else(|| format!("Request failed with status {}", status));
        Self::status(status, message)
    }

    // --- Context builders ---

    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: None,
        });
        self
    }

    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: Some(detail.into()),
        });
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // --- Accessors ---

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// 面向用户展示的消息
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status
    }

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }

    /// 服务端是否拒绝了当前凭据（401）
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

// =========================================================
// Display & Error trait 实现
// =========================================================

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.error_code())?;
        if let Some(status) = self.status {
            write!(f, " {}", status)?;
        }
        write!(f, "] {}", self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

// =========================================================
// 类型转换实现
// =========================================================

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::decode(e.to_string()).with_source(e)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::transport(format!("Network error: {}", e)).with_source(e)
    }
}
