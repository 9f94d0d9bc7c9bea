//! 控制台首页数据
//!
//! 每个概览同时发出多个请求（`futures::try_join!`），任一失败则整体失败。

use crate::api::ApiClient;
use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::request::HttpClient;
use huraymila_shared::UserType;
use huraymila_shared::models::{Agency, Initiative, News, ReportStatistics};
use tracing::debug;

/// 市长控制台
#[derive(Debug, Clone, PartialEq)]
pub struct GovernorOverview {
    pub statistics: ReportStatistics,
    pub pending_initiatives: Vec<Initiative>,
    pub prioritized_news: Vec<News>,
}

/// 机构控制台
#[derive(Debug, Clone, PartialEq)]
pub struct AgencyOverview {
    pub profile: Agency,
    pub initiatives: Vec<Initiative>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Overview {
    Governor(GovernorOverview),
    Agency(AgencyOverview),
}

pub async fn load_governor_overview<C: HttpClient>(
    api: &ApiClient<C>,
    token: &str,
) -> ApiResult<GovernorOverview> {
    let reports = api.reports();
    let initiatives = api.initiatives();
    let news = api.news();

    let (statistics, pending, prioritized) = futures::try_join!(
        reports.statistics(token),
        initiatives.pending(token),
        news.prioritized(),
    )
    .map_err(|e| e.in_op("dashboard.governor"))?;

    Ok(GovernorOverview {
        statistics: statistics.data,
        pending_initiatives: pending.data,
        prioritized_news: prioritized.data,
    })
}

pub async fn load_agency_overview<C: HttpClient>(
    api: &ApiClient<C>,
    token: &str,
    agency_id: &str,
) -> ApiResult<AgencyOverview> {
    let agencies = api.agencies();
    let initiatives = api.initiatives();

    let (profile, mine) = futures::try_join!(
        agencies.profile(token),
        initiatives.by_agency(token, agency_id),
    )
    .map_err(|e| e.in_op_with("dashboard.agency", agency_id))?;

    Ok(AgencyOverview {
        profile: profile.data,
        initiatives: mine.data,
    })
}

/// 按当前会话的角色加载概览；没有控制台的角色返回 `None`
pub async fn load_overview<C: HttpClient>(auth: &AuthContext<C>) -> ApiResult<Option<Overview>> {
    let state = auth.state();
    let session = state
        .session
        .as_ref()
        .ok_or_else(|| ApiError::validation("Not signed in").in_op("dashboard.load"))?;

    debug!(user_type = %session.user.user_type, "loading dashboard overview");
    match &session.user.user_type {
        UserType::Governor => load_governor_overview(auth.api(), &session.token)
            .await
            .map(|o| Some(Overview::Governor(o))),
        UserType::Agency => {
            let agency_id = session.user.id.as_deref().ok_or_else(|| {
                ApiError::validation("Signed-in agency has no id").in_op("dashboard.load")
            })?;
            load_agency_overview(auth.api(), &session.token, agency_id)
                .await
                .map(|o| Some(Overview::Agency(o)))
        }
        _ => Ok(None),
    }
}
