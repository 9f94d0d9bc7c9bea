use crate::api::{ApiClient, ListQuery};
use crate::error::ApiResult;
use crate::request::HttpClient;
use huraymila_shared::models::{Ack, Envelope, ReviewStatus, Submission};
use huraymila_shared::{FileUpload, HttpMethod, IntoPatch, Patch, Resource};
use serde::Serialize;

/// 机构针对某项标准提交的证明材料
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionDraft {
    pub standard_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub files: Vec<FileUpload>,
}

impl IntoPatch for SubmissionDraft {
    fn into_patch(self) -> Patch {
        Patch::new()
            .text("standard", self.standard_id)
            .opt_text("title", self.title)
            .opt_text("description", self.description)
            .files("files", self.files)
    }
}

/// 审核结论
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDecision {
    pub status: ReviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_notes: Option<String>,
}

/// `/submissions` 接口
pub struct SubmissionApi<'a, C: HttpClient> {
    api: &'a ApiClient<C>,
}

impl<'a, C: HttpClient> SubmissionApi<'a, C> {
    pub(crate) fn new(api: &'a ApiClient<C>) -> Self {
        Self { api }
    }

    /// 可按 `standard`、`agency`、`status` 过滤
    pub async fn list(
        &self,
        token: &str,
        query: &ListQuery,
    ) -> ApiResult<Envelope<Vec<Submission>>> {
        self.api
            .get_with_query(
                "submissions.list",
                Resource::Submissions.base(),
                query,
                Some(token),
            )
            .await
    }

    pub async fn get(&self, token: &str, id: &str) -> ApiResult<Envelope<Submission>> {
        self.api
            .get("submissions.get", &Resource::Submissions.item(id), Some(token))
            .await
    }

    pub async fn create(
        &self,
        token: &str,
        draft: SubmissionDraft,
    ) -> ApiResult<Envelope<Submission>> {
        self.api
            .send_multipart(
                "submissions.create",
                HttpMethod::Post,
                Resource::Submissions.base(),
                Some(token),
                draft.into_patch(),
            )
            .await
    }

    pub async fn review(
        &self,
        token: &str,
        id: &str,
        decision: &ReviewDecision,
    ) -> ApiResult<Envelope<Submission>> {
        self.api
            .send_json(
                "submissions.review",
                HttpMethod::Patch,
                &Resource::Submissions.item_child(id, "status"),
                Some(token),
                decision,
            )
            .await
    }

    pub async fn delete(&self, token: &str, id: &str) -> ApiResult<Ack> {
        self.api
            .send_empty(
                "submissions.delete",
                HttpMethod::Delete,
                &Resource::Submissions.item(id),
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

    const BASE: &str = "http://h/api";

    fn setup() -> (Rc<MockHttpClient>, ApiClient<MockHttpClient>) {
        let mock = Rc::new(MockHttpClient::new());
        let api = ApiClient::from_shared(mock.clone(), ClientConfig::new(BASE));
        (mock, api)
    }

    #[tokio::test]
    async fn test_create_attaches_every_file() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Post,
            "http://h/api/submissions",
            201,
            json!({ "data": { "_id": "sub1", "standard": "s1", "status": "pending" } }),
        );

        let draft = SubmissionDraft {
            standard_id: "s1".into(),
            title: None,
            description: Some("Evidence for Q3".into()),
            files: vec![
                FileUpload::new("a.pdf", "application/pdf", vec![1]),
                FileUpload::new("b.pdf", "application/pdf", vec![2]),
            ],
        };
        let created = api.submissions().create("t", draft).await.unwrap();
        assert_eq!(created.data.status, ReviewStatus::Pending);
        assert_eq!(
            mock.last_request().form_names(),
            vec!["standard", "description", "files", "files"]
        );
    }

    #[tokio::test]
    async fn test_review_patches_status() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Patch,
            "http://h/api/submissions/sub1/status",
            200,
            json!({ "data": { "_id": "sub1", "standard": { "_id": "s1" }, "status": "approved" } }),
        );
        mock.mock_response(
            HttpMethod::Get,
            "http://h/api/submissions?status=pending&standard=s1",
            200,
            json!({ "data": [] }),
        );

        let decision = ReviewDecision {
            status: ReviewStatus::Approved,
            reviewer_notes: None,
        };
        let resp = api.submissions().review("t", "sub1", &decision).await.unwrap();
        assert_eq!(resp.data.status, ReviewStatus::Approved);
        assert_eq!(mock.last_request().json_body(), json!({ "status": "approved" }));

        let q = ListQuery::new().status(ReviewStatus::Pending).filter("standard", "s1");
        let pending = api.submissions().list("t", &q).await.unwrap();
        assert!(pending.data.is_empty());
    }
}
