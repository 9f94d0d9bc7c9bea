//! 路由服务模块 - 核心引擎
//!
//! 实现「请求 -> 守卫 -> 处理 -> 加载」的导航流程。
//! `ProtectedRoute` 是无状态的守卫，`Router` 是进程内的导航器，
//! 持有当前路由与历史记录，并监听认证状态自动重定向。

use crate::auth::{AuthContext, AuthState};
use crate::request::HttpClient;
use crate::route::AppRoute;
use huraymila_shared::UserType;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{debug, info};

/// 导航副作用通道
pub trait Navigator {
    /// 跳转并替换当前位置（重定向语义）
    fn redirect(&self, path: &str);
}

// =========================================================
// 守卫 (ProtectedRoute)
// =========================================================

/// 守卫判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// 会话仍在恢复中，显示加载状态，不导航
    Loading,
    Redirect(String),
    Allow,
}

/// 守卫渲染结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    Spinner,
    Content(T),
    Redirected(String),
}

impl<T> Guarded<T> {
    pub fn content(self) -> Option<T> {
        match self {
            Guarded::Content(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRoute {
    pub required_user_type: Option<UserType>,
    pub fallback: String,
}

impl Default for ProtectedRoute {
    fn default() -> Self {
        Self {
            required_user_type: None,
            fallback: AppRoute::auth_failure_redirect().to_path(),
        }
    }
}

impl ProtectedRoute {
    /// 只要求登录
    pub fn new() -> Self {
        Self::default()
    }

    /// 要求指定角色
    pub fn for_role(user_type: UserType) -> Self {
        Self {
            required_user_type: Some(user_type),
            ..Self::default()
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// 路由自带的守卫；公开页面返回 `None`
    pub fn for_route(route: &AppRoute) -> Option<Self> {
        if !route.requires_auth() {
            return None;
        }
        Some(match route.required_user_type() {
            Some(t) => Self::for_role(t),
            None => Self::new(),
        })
    }

    pub fn decide(&self, state: &AuthState) -> GuardDecision {
        if state.loading {
            return GuardDecision::Loading;
        }
        let user = match state.user() {
            Some(user) => user,
            None => return GuardDecision::Redirect(self.fallback.clone()),
        };
        match &self.required_user_type {
            Some(required) if *required != user.user_type => {
                let target = AppRoute::home_for(&user.user_type)
                    .map(|r| r.to_path())
                    .unwrap_or_else(|| self.fallback.clone());
                GuardDecision::Redirect(target)
            }
            _ => GuardDecision::Allow,
        }
    }

    /// 按判定结果渲染
    ///
    /// `children` 只在放行时才会被求值。
    pub fn render<T, N>(
        &self,
        state: &AuthState,
        navigator: &N,
        children: impl FnOnce() -> T,
    ) -> Guarded<T>
    where
        N: Navigator + ?Sized,
    {
        match self.decide(state) {
            GuardDecision::Loading => Guarded::Spinner,
            GuardDecision::Redirect(path) => {
                navigator.redirect(&path);
                Guarded::Redirected(path)
            }
            GuardDecision::Allow => Guarded::Content(children()),
        }
    }
}

// =========================================================
// 路由器 (Router)
// =========================================================

/// 保留的历史记录条数，超出后丢弃最早的记录
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug)]
struct RouterState {
    current: AppRoute,
    history: VecDeque<AppRoute>,
    auth: AuthState,
}

impl RouterState {
    /// 目标路由经守卫处理后的实际落点
    fn resolve(&self, target: AppRoute) -> AppRoute {
        if target.should_redirect_when_authenticated() {
            if let Some(user_type) = self.auth.user_type() {
                return AppRoute::landing_for(user_type);
            }
        }
        match ProtectedRoute::for_route(&target).map(|g| g.decide(&self.auth)) {
            Some(GuardDecision::Redirect(path)) => {
                debug!(from = %target, to = %path, "access denied, redirecting");
                AppRoute::from_path(&path)
            }
            // Loading 时先停留在目标路由，状态就绪后由监听器再校验
            _ => target,
        }
    }

    fn push_route(&mut self, target: AppRoute) {
        let resolved = self.resolve(target);
        if resolved != self.current {
            let previous = std::mem::replace(&mut self.current, resolved);
            self.remember(previous);
        }
    }

    fn remember(&mut self, route: AppRoute) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(route);
    }

    fn replace_current(&mut self, target: AppRoute) {
        self.current = self.resolve(target);
    }

    /// 认证状态变化后重新校验当前路由
    fn on_auth_changed(&mut self, auth: &AuthState) {
        self.auth = auth.clone();
        let resolved = self.resolve(self.current.clone());
        if resolved != self.current {
            info!(from = %self.current, to = %resolved, "auth state changed, redirecting");
            let previous = std::mem::replace(&mut self.current, resolved);
            self.remember(previous);
        }
    }
}

/// 进程内路由器
///
/// 克隆后共享同一份状态。
#[derive(Clone)]
pub struct Router {
    state: Rc<RefCell<RouterState>>,
}

impl Router {
    /// 创建路由器并订阅认证状态
    pub fn new<C: HttpClient>(auth: &AuthContext<C>, initial_path: &str) -> Self {
        let state = Rc::new(RefCell::new(RouterState {
            current: AppRoute::default(),
            history: VecDeque::new(),
            auth: auth.state(),
        }));
        state
            .borrow_mut()
            .replace_current(AppRoute::from_path(initial_path));

        let listener_state = Rc::clone(&state);
        auth.subscribe(move |next| listener_state.borrow_mut().on_auth_changed(next));

        Self { state }
    }

    pub fn current(&self) -> AppRoute {
        self.state.borrow().current.clone()
    }

    pub fn current_path(&self) -> String {
        self.current().to_path()
    }

    /// 导航到指定路径，经过守卫校验
    pub fn navigate(&self, path: &str) {
        let target = AppRoute::from_path(path);
        debug!(to = %target, "navigate");
        self.state.borrow_mut().push_route(target);
    }

    /// 返回上一页；没有历史时返回 `false`
    ///
    /// 历史中的页面同样要经过守卫，注销后无法退回控制台。
    pub fn back(&self) -> bool {
        let mut state = self.state.borrow_mut();
        match state.history.pop_back() {
            Some(previous) => {
                state.replace_current(previous);
                true
            }
            None => false,
        }
    }

    pub fn history_len(&self) -> usize {
        self.state.borrow().history.len()
    }

    /// 用路由器当前持有的认证快照渲染受保护内容
    pub fn guard<T>(&self, guard: &ProtectedRoute, children: impl FnOnce() -> T) -> Guarded<T> {
        let auth = self.state.borrow().auth.clone();
        guard.render(&auth, self, children)
    }
}

impl Navigator for Router {
    fn redirect(&self, path: &str) {
        self.state.borrow_mut().replace_current(AppRoute::from_path(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::ClientConfig;
    use crate::request::MockHttpClient;
    use crate::storage::MemoryStorage;
    use huraymila_shared::{HttpMethod, UserRecord};
    use serde_json::json;
    use std::cell::Cell;

    /// 记录所有重定向
    #[derive(Default)]
    struct RecordingNavigator {
        redirects: RefCell<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn redirect(&self, path: &str) {
            self.redirects.borrow_mut().push(path.to_string());
        }
    }

    fn state_for(user_type: &str) -> AuthState {
        AuthState::logged_in("t", UserRecord::new("u@test.sa", UserType::from(user_type)))
    }

    fn create_auth() -> (Rc<MockHttpClient>, AuthContext<MockHttpClient>) {
        let mock = Rc::new(MockHttpClient::new());
        let api = ApiClient::from_shared(mock.clone(), ClientConfig::new("http://h/api"));
        (mock, AuthContext::new(api, Rc::new(MemoryStorage::new())))
    }

    // --- ProtectedRoute ---

    #[test]
    fn test_role_mismatch_redirects_to_role_home() {
        let guard = ProtectedRoute::for_role(UserType::Governor);
        let nav = RecordingNavigator::default();
        let rendered = Cell::new(false);

        let out = guard.render(&state_for("agency"), &nav, || rendered.set(true));

        assert_eq!(out, Guarded::Redirected("/agency-dashboard".into()));
        assert!(!rendered.get());
        assert_eq!(*nav.redirects.borrow(), vec!["/agency-dashboard".to_string()]);
    }

    #[test]
    fn test_decisions() {
        let guard = ProtectedRoute::for_role(UserType::Agency);
        assert_eq!(guard.decide(&AuthState::default()), GuardDecision::Loading);
        assert_eq!(
            guard.decide(&AuthState::logged_out()),
            GuardDecision::Redirect("/auth".into())
        );
        assert_eq!(
            guard.decide(&state_for("governor")),
            GuardDecision::Redirect("/admin".into())
        );
        assert_eq!(
            guard.decide(&state_for("volunteer")),
            GuardDecision::Redirect("/auth".into())
        );
        assert_eq!(guard.decide(&state_for("agency")), GuardDecision::Allow);
        assert_eq!(
            ProtectedRoute::new().decide(&state_for("volunteer")),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_custom_fallback_and_spinner() {
        let guard = ProtectedRoute::for_role(UserType::Governor).with_fallback("/login-required");
        let nav = RecordingNavigator::default();

        let out = guard.render(&AuthState::default(), &nav, || "content");
        assert_eq!(out, Guarded::Spinner);
        assert!(nav.redirects.borrow().is_empty());

        let out = guard.render(&state_for("inspector"), &nav, || "content");
        assert_eq!(out, Guarded::Redirected("/login-required".into()));

        let out = guard.render(&state_for("governor"), &nav, || "content");
        assert_eq!(out.content(), Some("content"));
    }

    // --- Router ---

    #[test]
    fn test_router_guards_initial_path() {
        let (_, auth) = create_auth();
        auth.init();

        let router = Router::new(&auth, "/admin");
        assert_eq!(router.current(), AppRoute::Auth);
    }

    #[test]
    fn test_router_waits_for_session_restore() {
        let (_, auth) = create_auth();
        let router = Router::new(&auth, "/agency-dashboard");
        assert_eq!(router.current(), AppRoute::AgencyDashboard);

        // 存储为空：恢复后应被送去登录
        auth.init();
        assert_eq!(router.current(), AppRoute::Auth);
    }

    #[tokio::test]
    async fn test_login_on_auth_page_redirects_to_role_home() {
        let (mock, auth) = create_auth();
        auth.init();
        let router = Router::new(&auth, "/auth");
        mock.mock_response(
            HttpMethod::Post,
            "http://h/api/auth/login",
            200,
            json!({ "token": "t", "user": { "email": "gov@test.sa", "type": "governor" } }),
        );

        assert!(auth.login("gov@test.sa", "pw").await.success());
        assert_eq!(router.current(), AppRoute::Admin);

        // 已登录时再访问登录页会被送回控制台
        router.navigate("/auth");
        assert_eq!(router.current(), AppRoute::Admin);
    }

    #[tokio::test]
    async fn test_logout_on_protected_page_redirects_to_auth() {
        let (mock, auth) = create_auth();
        auth.init();
        mock.mock_response(
            HttpMethod::Post,
            "http://h/api/agencies/login",
            200,
            json!({ "token": "t", "user": { "email": "a@test.sa", "type": "agency" } }),
        );
        assert!(auth.agency_login("a@test.sa", "pw").await.success());

        let router = Router::new(&auth, "/");
        router.navigate("/agency-dashboard");
        assert_eq!(router.current(), AppRoute::AgencyDashboard);

        auth.logout();
        assert_eq!(router.current(), AppRoute::Auth);

        // 历史中的控制台同样受守卫保护
        assert!(router.back());
        assert_eq!(router.current(), AppRoute::Auth);
    }

    #[tokio::test]
    async fn test_wrong_role_navigation_and_back() {
        let (mock, auth) = create_auth();
        auth.init();
        mock.mock_response(
            HttpMethod::Post,
            "http://h/api/auth/login",
            200,
            json!({ "token": "t", "user": { "email": "a@test.sa", "type": "agency" } }),
        );
        auth.login("a@test.sa", "pw").await;

        let router = Router::new(&auth, "/news");
        router.navigate("/admin");
        assert_eq!(router.current(), AppRoute::AgencyDashboard);
        assert_eq!(router.history_len(), 1);

        assert!(router.back());
        assert_eq!(router.current(), AppRoute::News);
        assert!(!router.back());
    }

    #[test]
    fn test_history_keeps_only_recent_entries() {
        let (_, auth) = create_auth();
        auth.init();
        let router = Router::new(&auth, "/faq");

        for i in 0..HISTORY_LIMIT * 2 {
            router.navigate(if i % 2 == 0 { "/news" } else { "/about" });
        }
        assert_eq!(router.history_len(), HISTORY_LIMIT);

        let mut steps = 0;
        while router.back() {
            steps += 1;
            assert_ne!(router.current(), AppRoute::Faq);
        }
        assert_eq!(steps, HISTORY_LIMIT);
    }

    #[test]
    fn test_router_guard_renders_through_router() {
        let (_, auth) = create_auth();
        auth.init();
        let router = Router::new(&auth, "/news");

        let out = router.guard(&ProtectedRoute::for_role(UserType::Governor), || "panel");
        assert_eq!(out, Guarded::Redirected("/auth".into()));
        assert_eq!(router.current(), AppRoute::Auth);
    }
}
