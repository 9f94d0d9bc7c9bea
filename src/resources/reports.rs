use crate::api::{ApiClient, ListQuery};
use crate::error::ApiResult;
use crate::request::HttpClient;
use huraymila_shared::models::{Ack, Envelope, Report, ReportStatistics, ReportStatus};
use huraymila_shared::{FileUpload, HttpMethod, IntoPatch, Patch, Resource};
use serde::Serialize;

/// 市民提交的报告
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDraft {
    pub title: Option<String>,
    pub description: String,
    pub category: Option<String>,
    pub location: Option<String>,
    pub reporter_name: Option<String>,
    pub reporter_phone: Option<String>,
    pub attachments: Vec<FileUpload>,
}

impl IntoPatch for ReportDraft {
    fn into_patch(self) -> Patch {
        Patch::new()
            .opt_text("title", self.title)
            .text("description", self.description)
            .opt_text("category", self.category)
            .opt_text("location", self.location)
            .opt_text("reporterName", self.reporter_name)
            .opt_text("reporterPhone", self.reporter_phone)
            .files("attachments", self.attachments)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatusChange {
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

/// `/reports` 接口
pub struct ReportApi<'a, C: HttpClient> {
    api: &'a ApiClient<C>,
}

impl<'a, C: HttpClient> ReportApi<'a, C> {
    pub(crate) fn new(api: &'a ApiClient<C>) -> Self {
        Self { api }
    }

    /// 提交报告；未登录的访客也可提交
    pub async fn create(
        &self,
        token: Option<&str>,
        draft: ReportDraft,
    ) -> ApiResult<Envelope<Report>> {
        self.api
            .send_multipart(
                "reports.create",
                HttpMethod::Post,
                Resource::Reports.base(),
                token,
                draft.into_patch(),
            )
            .await
    }

    pub async fn list(&self, token: &str, query: &ListQuery) -> ApiResult<Envelope<Vec<Report>>> {
        self.api
            .get_with_query("reports.list", Resource::Reports.base(), query, Some(token))
            .await
    }

    /// 当前用户提交过的报告
    pub async fn mine(&self, token: &str) -> ApiResult<Envelope<Vec<Report>>> {
        self.api
            .get(
                "reports.mine",
                &Resource::Reports.child("my-reports"),
                Some(token),
            )
            .await
    }

    pub async fn statistics(&self, token: &str) -> ApiResult<Envelope<ReportStatistics>> {
        self.api
            .get(
                "reports.statistics",
                &Resource::Reports.child("statistics"),
                Some(token),
            )
            .await
    }

    pub async fn get(&self, token: &str, id: &str) -> ApiResult<Envelope<Report>> {
        self.api
            .get("reports.get", &Resource::Reports.item(id), Some(token))
            .await
    }

    pub async fn update_status(
        &self,
        token: &str,
        id: &str,
        change: &ReportStatusChange,
    ) -> ApiResult<Envelope<Report>> {
        self.api
            .send_json(
                "reports.update_status",
                HttpMethod::Patch,
                &Resource::Reports.item_child(id, "status"),
                Some(token),
                change,
            )
            .await
    }

    pub async fn delete(&self, token: &str, id: &str) -> ApiResult<Ack> {
        self.api
            .send_empty(
                "reports.delete",
                HttpMethod::Delete,
                &Resource::Reports.item(id),
                Some(token),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::request::MockHttpClient;
    use serde_json::json;
    use std::rc::Rc;

    fn setup() -> (Rc<MockHttpClient>, ApiClient<MockHttpClient>) {
        let mock = Rc::new(MockHttpClient::new());
        let api = ApiClient::from_shared(mock.clone(), ClientConfig::new("http://h/api"));
        (mock, api)
    }

    #[tokio::test]
    async fn test_anonymous_report_with_attachments() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Post,
            "http://h/api/reports",
            201,
            json!({ "data": { "_id": "r1", "description": "Broken streetlight", "status": "pending" } }),
        );

        let draft = ReportDraft {
            title: None,
            description: "Broken streetlight".into(),
            category: Some("infrastructure".into()),
            location: None,
            reporter_name: None,
            reporter_phone: None,
            attachments: vec![FileUpload::new("p.jpg", "image/jpeg", vec![1])],
        };
        let created = api.reports().create(None, draft).await.unwrap();
        assert_eq!(created.data.status, ReportStatus::Pending);

        let req = mock.last_request();
        assert!(!req.headers.contains_key("Authorization"));
        assert_eq!(req.form_names(), vec!["description", "category", "attachments"]);
    }

    #[tokio::test]
    async fn test_statistics_and_status_change() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Get,
            "http://h/api/reports/statistics",
            200,
            json!({ "data": { "total": 12, "pending": 5, "inProgress": 4, "resolved": 3 } }),
        );
        mock.mock_response(
            HttpMethod::Patch,
            "http://h/api/reports/r1/status",
            200,
            json!({ "data": { "_id": "r1", "description": "x", "status": "resolved" } }),
        );

        let stats = api.reports().statistics("t-gov").await.unwrap();
        assert_eq!(stats.data.total, 12);
        assert_eq!(stats.data.in_progress, 4);
        assert_eq!(stats.data.rejected, 0);

        let change = ReportStatusChange {
            status: ReportStatus::Resolved,
            admin_notes: Some("Fixed by municipality".into()),
        };
        let updated = api.reports().update_status("t-gov", "r1", &change).await.unwrap();
        assert_eq!(updated.data.status, ReportStatus::Resolved);
        assert_eq!(
            mock.last_request().json_body(),
            json!({ "status": "resolved", "adminNotes": "Fixed by municipality" })
        );
    }

    #[tokio::test]
    async fn test_my_reports() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Get,
            "http://h/api/reports/my-reports",
            200,
            json!({ "data": [] }),
        );
        let mine = api.reports().mine("t-vol").await.unwrap();
        assert!(mine.data.is_empty());
        assert_eq!(
            mock.last_request().headers.get("Authorization").unwrap(),
            "Bearer t-vol"
        );
    }
}
