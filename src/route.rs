//! 路由定义模块 - 领域模型
//!
//! 纯业务逻辑，不依赖 DOM。定义门户的所有页面及其访问要求。

use huraymila_shared::UserType;
use std::fmt::Display;

/// 门户页面
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    #[default]
    Home,
    About,
    Initiatives,
    InitiativeDetail(String),
    News,
    NewsDetail(String),
    SuccessStories,
    Faq,
    Downloads,
    /// 登录页
    Auth,
    VolunteerRegister,
    AgencyRegister,
    /// 市长（governor）控制台
    Admin,
    /// 机构控制台
    AgencyDashboard,
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由
    ///
    /// 忽略查询串、片段和结尾斜杠。
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };

        match path {
            "/" | "/home" => Self::Home,
            "/about" => Self::About,
            "/initiatives" => Self::Initiatives,
            "/news" => Self::News,
            "/success-stories" => Self::SuccessStories,
            "/faq" => Self::Faq,
            "/downloads" => Self::Downloads,
            "/auth" | "/login" => Self::Auth,
            "/volunteer-registration" => Self::VolunteerRegister,
            "/agency-registration" => Self::AgencyRegister,
            "/admin" => Self::Admin,
            "/agency-dashboard" => Self::AgencyDashboard,
            _ => Self::parse_detail(path).unwrap_or(Self::NotFound),
        }
    }

    fn parse_detail(path: &str) -> Option<Self> {
        let (prefix, id) = path.trim_start_matches('/').split_once('/')?;
        if id.is_empty() || id.contains('/') {
            return None;
        }
        let id = urlencoding::decode(id).ok()?.into_owned();
        match prefix {
            "initiatives" => Some(Self::InitiativeDetail(id)),
            "news" => Some(Self::NewsDetail(id)),
            _ => None,
        }
    }

    /// 路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".into(),
            Self::About => "/about".into(),
            Self::Initiatives => "/initiatives".into(),
            Self::InitiativeDetail(id) => format!("/initiatives/{}", urlencoding::encode(id)),
            Self::News => "/news".into(),
            Self::NewsDetail(id) => format!("/news/{}", urlencoding::encode(id)),
            Self::SuccessStories => "/success-stories".into(),
            Self::Faq => "/faq".into(),
            Self::Downloads => "/downloads".into(),
            Self::Auth => "/auth".into(),
            Self::VolunteerRegister => "/volunteer-registration".into(),
            Self::AgencyRegister => "/agency-registration".into(),
            Self::Admin => "/admin".into(),
            Self::AgencyDashboard => "/agency-dashboard".into(),
            Self::NotFound => "/404".into(),
        }
    }

    /// **守卫逻辑：该路由是否需要登录**
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Admin | Self::AgencyDashboard)
    }

    /// 进入该路由所需的角色
    pub fn required_user_type(&self) -> Option<UserType> {
        match self {
            Self::Admin => Some(UserType::Governor),
            Self::AgencyDashboard => Some(UserType::Agency),
            _ => None,
        }
    }

    /// 已登录用户访问时应离开的路由（登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Auth)
    }

    /// 未登录时的默认跳转目标
    pub fn auth_failure_redirect() -> Self {
        Self::Auth
    }

    /// 角色对应的控制台；其他角色没有专属页面
    pub fn home_for(user_type: &UserType) -> Option<Self> {
        match user_type {
            UserType::Governor => Some(Self::Admin),
            UserType::Agency => Some(Self::AgencyDashboard),
            _ => None,
        }
    }

    /// 登录成功后的落地页：角色控制台，没有时回到首页
    pub fn landing_for(user_type: &UserType) -> Self {
        Self::home_for(user_type).unwrap_or(Self::Home)
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_path())
    }
}
