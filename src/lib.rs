//! Huraymila 健康城市门户的客户端核心
//!
//! - `api` / `resources`: REST 后端的类型化客户端
//! - `auth` / `storage`: 会话的恢复、登录、注销与持久化
//! - `route` / `router`: 页面表与带角色校验的路由守卫
//! - `forms` / `dashboard`: 控制台的编辑弹窗与首页数据
//!
//! 库本身只通过 `tracing` 输出日志，不安装任何 subscriber。

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod request;
pub mod resources;
pub mod route;
pub mod router;
pub mod storage;

pub use api::{ApiClient, ListQuery};
pub use auth::{AuthContext, AuthState, LoginOutcome, Session};
pub use config::ClientConfig;
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use request::{HttpClient, ReqwestHttpClient};
pub use route::AppRoute;
pub use router::{GuardDecision, Guarded, Navigator, ProtectedRoute, Router};
pub use storage::SessionStorage;

pub use huraymila_shared as shared;

/// 生产环境的默认组合：reqwest 传输 + 环境变量配置 + 平台默认存储
///
/// 返回的上下文尚未 `init`。
pub fn connect_from_env() -> AuthContext<ReqwestHttpClient> {
    let config = ClientConfig::from_env();
    let storage = storage::default_storage(&config);
    let api = ApiClient::new(ReqwestHttpClient::new(), config);
    AuthContext::new(api, storage)
}
