//! 运行时配置
//!
//! 从环境变量读取，缺省时使用默认值。

use huraymila_shared::DEFAULT_API_BASE_URL;
use std::path::PathBuf;

pub const ENV_API_BASE_URL: &str = "VITE_API_BASE_URL";
pub const ENV_SESSION_FILE: &str = "HURAYMILA_SESSION_FILE";

const API_SUFFIX: &str = "/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API 根地址（包含 `/api` 后缀），不带结尾斜杠
    pub api_base_url: String,
    /// 原生环境下会话文件的位置；为 `None` 时只保存在内存中
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: normalize_base(&api_base_url.into()),
            session_file: None,
        }
    }

    /// 从进程环境变量读取
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取，便于测试
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup(ENV_API_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Self {
            api_base_url: normalize_base(&api_base_url),
            session_file: lookup(ENV_SESSION_FILE)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    /// 静态资源根地址：API 地址去掉 `/api` 后缀
    pub fn asset_base_url(&self) -> &str {
        self.api_base_url
            .strip_suffix(API_SUFFIX)
            .unwrap_or(&self.api_base_url)
    }

    /// 将后端返回的上传路径转换为完整 URL；已是绝对地址的原样返回
    pub fn asset_url(&self, path: &str) -> String {
        if path.starts_with("http://")
            || path.starts_with("https://")
            || path.starts_with("data:")
        {
            return path.to_string();
        }
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.asset_base_url(), path)
    }
}

fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
