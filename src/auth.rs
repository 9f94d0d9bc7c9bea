//! 认证模块
//!
//! 管理登录会话：恢复、登录、注销和请求头构造。
//! 与路由系统解耦，路由通过 `subscribe` 监听状态变化。

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::request::HttpClient;
use crate::route::AppRoute;
use crate::storage::SessionStorage;
use huraymila_shared::models::{LoginRequest, LoginResponse};
use huraymila_shared::{
    CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, STORAGE_TOKEN_KEY,
    STORAGE_USER_KEY, UserRecord, UserType,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{info, warn};

/// 已登录的会话；token 与用户总是同时存在
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
}

/// 认证状态
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub session: Option<Session>,
    /// 正在从存储恢复会话
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            session: None,
            loading: true,
        }
    }
}

impl AuthState {
    pub fn logged_out() -> Self {
        Self {
            session: None,
            loading: false,
        }
    }

    pub fn logged_in(token: impl Into<String>, user: UserRecord) -> Self {
        Self {
            session: Some(Session {
                token: token.into(),
                user,
            }),
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn user_type(&self) -> Option<&UserType> {
        self.user().map(|u| &u.user_type)
    }
}

/// 登录结果
///
/// 失败不会以 `Err` 返回：调用方总能通过 `success()` 得到布尔结果。
#[derive(Debug)]
pub enum LoginOutcome {
    Success {
        redirect_to: String,
        user_type: UserType,
    },
    Failure {
        error: ApiError,
    },
}

impl LoginOutcome {
    pub fn success(&self) -> bool {
        matches!(self, LoginOutcome::Success { .. })
    }

    pub fn redirect_to(&self) -> Option<&str> {
        match self {
            LoginOutcome::Success { redirect_to, .. } => Some(redirect_to),
            LoginOutcome::Failure { .. } => None,
        }
    }

    pub fn user_type(&self) -> Option<&UserType> {
        match self {
            LoginOutcome::Success { user_type, .. } => Some(user_type),
            LoginOutcome::Failure { .. } => None,
        }
    }

    /// 面向用户的错误消息
    pub fn error_message(&self) -> Option<&str> {
        match self {
            LoginOutcome::Success { .. } => None,
            LoginOutcome::Failure { error } => Some(error.message()),
        }
    }
}

/// 登录入口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginPortal {
    /// `/auth/login`，市长与志愿者
    Users,
    /// `/agencies/login`
    Agencies,
}

type Listener = Box<dyn Fn(&AuthState)>;

/// 认证上下文
///
/// 克隆后共享同一份状态与监听器。
pub struct AuthContext<C: HttpClient> {
    api: ApiClient<C>,
    storage: Rc<dyn SessionStorage>,
    state: Rc<RefCell<AuthState>>,
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl<C: HttpClient> Clone for AuthContext<C> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            storage: Rc::clone(&self.storage),
            state: Rc::clone(&self.state),
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<C: HttpClient> AuthContext<C> {
    /// 创建上下文；在 `init` 完成前处于 loading 状态
    pub fn new(api: ApiClient<C>, storage: Rc<dyn SessionStorage>) -> Self {
        Self {
            api,
            storage,
            state: Rc::new(RefCell::new(AuthState::default())),
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn api(&self) -> &ApiClient<C> {
        &self.api
    }

    // =========================================================
    // 生命周期
    // =========================================================

    /// 从存储恢复会话
    ///
    /// token 与用户必须同时存在且用户 JSON 可解析；否则清除两个键并进入未登录状态。
    /// 从不失败。
    pub fn init(&self) {
        let token = self
            .storage
            .get(STORAGE_TOKEN_KEY)
            .filter(|t| !t.is_empty());
        let user_raw = self.storage.get(STORAGE_USER_KEY);

        let session = match (token, user_raw) {
            (Some(token), Some(raw)) => match serde_json::from_str::<UserRecord>(&raw) {
                Ok(user) => Some(Session { token, user }),
                Err(err) => {
                    warn!(error = %err, "stored user is not valid, clearing session");
                    self.clear_storage();
                    None
                }
            },
            (None, None) => None,
            _ => {
                warn!("incomplete session in storage, clearing");
                self.clear_storage();
                None
            }
        };

        if let Some(s) = &session {
            info!(user_type = %s.user.user_type, "session restored");
        }
        self.replace_state(AuthState {
            session,
            loading: false,
        });
    }

    /// 门户登录（市长、志愿者）
    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        self.authenticate(LoginPortal::Users, email, password).await
    }

    /// 机构登录
    pub async fn agency_login(&self, email: &str, password: &str) -> LoginOutcome {
        self.authenticate(LoginPortal::Agencies, email, password)
            .await
    }

    async fn authenticate(&self, portal: LoginPortal, email: &str, password: &str) -> LoginOutcome {
        match self.try_login(portal, email, password).await {
            Ok((redirect_to, user_type)) => {
                info!(user_type = %user_type, redirect_to = %redirect_to, "logged in");
                LoginOutcome::Success {
                    redirect_to,
                    user_type,
                }
            }
            Err(error) => {
                warn!(error = %error, "login failed");
                // 失败的登录不保留任何旧会话，内存与存储保持一致
                if self.is_authenticated() {
                    self.clear_storage();
                    self.replace_state(AuthState::logged_out());
                }
                LoginOutcome::Failure { error }
            }
        }
    }

    async fn try_login(
        &self,
        portal: LoginPortal,
        email: &str,
        password: &str,
    ) -> ApiResult<(String, UserType)> {
        let op = match portal {
            LoginPortal::Users => "session.login",
            LoginPortal::Agencies => "session.agency_login",
        };

        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::validation("Email and password are required").in_op(op));
        }

        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: LoginResponse = match portal {
            LoginPortal::Users => self.api.auth().login(&credentials).await,
            LoginPortal::Agencies => self.api.agencies().login(&credentials).await,
        }
        .map_err(|e| e.in_op(op))?;

        if resp.token.is_empty() {
            return Err(ApiError::decode("Login response did not include a token").in_op(op));
        }

        self.persist(&resp.token, &resp.user)
            .map_err(|e| e.in_op(op))?;

        let redirect_to = resp
            .redirect_to
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| AppRoute::landing_for(&resp.user.user_type).to_path());
        let user_type = resp.user.user_type.clone();

        self.replace_state(AuthState::logged_in(resp.token, resp.user));
        Ok((redirect_to, user_type))
    }

    /// 注销：清除存储和内存状态
    ///
    /// 不负责导航；路由会监听状态变化并自动重定向。
    pub fn logout(&self) {
        self.clear_storage();
        self.replace_state(AuthState::logged_out());
        info!("logged out");
    }

    /// 释放所有监听器；之后的状态变化不再通知任何人
    pub fn dispose(&self) {
        self.listeners.borrow_mut().clear();
    }

    // =========================================================
    // 查询
    // =========================================================

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn user(&self) -> Option<UserRecord> {
        self.state.borrow().user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    pub fn user_type(&self) -> Option<UserType> {
        self.state.borrow().user_type().cloned()
    }

    /// 请求头：总是包含 JSON Content-Type；仅在持有 token 时包含 Authorization
    pub fn auth_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert(HEADER_CONTENT_TYPE.to_string(), CONTENT_TYPE_JSON.to_string());
        if let Some(token) = self.state.borrow().token() {
            headers.insert(HEADER_AUTHORIZATION.to_string(), format!("Bearer {}", token));
        }
        headers
    }

    // =========================================================
    // 变更
    // =========================================================

    /// 替换缓存的用户（资料编辑之后），并重新写入存储
    ///
    /// 未登录时不做任何事。
    pub fn update_user(&self, user: UserRecord) -> ApiResult<()> {
        let token = match self.token() {
            Some(token) => token,
            None => return Ok(()),
        };
        let raw = serde_json::to_string(&user)?;
        self.storage
            .set(STORAGE_USER_KEY, &raw)
            .map_err(|e| e.in_op("session.update_user"))?;
        self.replace_state(AuthState::logged_in(token, user));
        Ok(())
    }

    /// 监听状态变化
    ///
    /// 监听器内部不能再调用 `subscribe` 或 `dispose`。
    pub fn subscribe(&self, listener: impl Fn(&AuthState) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    fn persist(&self, token: &str, user: &UserRecord) -> ApiResult<()> {
        let raw = serde_json::to_string(user)?;
        self.storage.set(STORAGE_TOKEN_KEY, token)?;
        if let Err(e) = self.storage.set(STORAGE_USER_KEY, &raw) {
            // 不留下只有 token 的半个会话
            self.clear_storage();
            return Err(e);
        }
        Ok(())
    }

    fn clear_storage(&self) {
        for key in [STORAGE_TOKEN_KEY, STORAGE_USER_KEY] {
            if let Err(e) = self.storage.delete(key) {
                warn!(key, error = %e, "failed to clear session key");
            }
        }
    }

    fn replace_state(&self, next: AuthState) {
        *self.state.borrow_mut() = next.clone();
        for listener in self.listeners.borrow().iter() {
            listener(&next);
        }
    }
}
