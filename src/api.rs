//! REST 客户端核心
//!
//! 所有资源模块共用同一条流程：构造请求 -> 发送 -> 检查状态码 -> 解析 JSON 或归一化错误。
//! 不做重试、退避、超时或取消，每次调用要么完整成功，要么返回一次错误。

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::request::{FormPart, HttpClient, HttpRequest};
use crate::resources::{
    agencies::AgencyApi, auth::AuthApi, content::ContentApi, health_indicators::HealthIndicatorApi,
    initiatives::InitiativeApi, news::NewsApi, reports::ReportApi, standards::StandardApi,
    submissions::SubmissionApi, success_stories::SuccessStoryApi, volunteers::VolunteerApi,
};
use huraymila_shared::{
    CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, HttpMethod, Patch, PatchValue,
    Resource,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::rc::Rc;
use tracing::{debug, warn};

// =========================================================
// 查询参数
// =========================================================

/// 列表查询参数；未设置的参数不会出现在 URL 中
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
    filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.trim().is_empty() {
            None
        } else {
            Some(term)
        };
        self
    }

    pub fn status(mut self, status: impl ToString) -> Self {
        self.status = Some(status.to_string());
        self
    }

    /// 资源特有的过滤条件，如 `category`、`agency`
    pub fn filter(mut self, key: &str, value: impl ToString) -> Self {
        self.filters.push((key.to_string(), value.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), status.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        pairs
    }

    /// 渲染为 `?a=1&b=2`；没有参数时为空字符串
    pub fn to_query_string(&self) -> String {
        let pairs = self.pairs();
        if pairs.is_empty() {
            return String::new();
        }
        let joined = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{}", joined)
    }
}

// =========================================================
// ApiClient
// =========================================================

pub struct ApiClient<C: HttpClient> {
    client: Rc<C>,
    config: Rc<ClientConfig>,
}

impl<C: HttpClient> Clone for ApiClient<C> {
    fn clone(&self) -> Self {
        Self {
            client: Rc::clone(&self.client),
            config: Rc::clone(&self.config),
        }
    }
}

impl<C: HttpClient> ApiClient<C> {
    pub fn new(client: C, config: ClientConfig) -> Self {
        Self::from_shared(Rc::new(client), config)
    }

    /// 与调用方共享同一个传输实例
    pub fn from_shared(client: Rc<C>, config: ClientConfig) -> Self {
        Self {
            client,
            config: Rc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.config.api_base_url, path)
        } else {
            format!("{}/{}", self.config.api_base_url, path)
        }
    }

    fn request(&self, method: HttpMethod, path: &str, token: Option<&str>) -> HttpRequest {
        let mut req = HttpRequest::new(&self.url(path), method);
        if let Some(token) = token {
            req = req.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }
        req
    }

    async fn execute<T: DeserializeOwned>(&self, op: &str, req: HttpRequest) -> ApiResult<T> {
        let method = req.method.as_str();
        let url = req.url.clone();
        debug!(op, method, url = %url, "api request");

        let resp = match self.client.send(req).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(op, url = %url, error = %e, "api transport failure");
                return Err(e.in_op(op));
            }
        };

        if !resp.ok() {
            let err = ApiError::from_response(resp.status, &resp.body).in_op(op);
            warn!(
                op,
                url = %url,
                status = resp.status,
                reason = err.message(),
                "api request rejected"
            );
            return Err(err);
        }

        resp.json().map_err(|e| e.in_op(op))
    }

    // --- 通用请求方法 ---

    pub async fn get<T: DeserializeOwned>(
        &self,
        op: &str,
        path: &str,
        token: Option<&str>,
    ) -> ApiResult<T> {
        self.execute(op, self.request(HttpMethod::Get, path, token))
            .await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        op: &str,
        path: &str,
        query: &ListQuery,
        token: Option<&str>,
    ) -> ApiResult<T> {
        let path = format!("{}{}", path, query.to_query_string());
        self.get(op, &path, token).await
    }

    /// 发送 JSON 请求体
    pub async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        op: &str,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body).map_err(|e| {
            ApiError::validation(format!("Invalid request body: {}", e)).in_op(op)
        })?;
        let req = self
            .request(method, path, token)
            .with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON)
            .with_json(&body);
        self.execute(op, req).await
    }

    /// 发送不带请求体的请求（如 `apply`、`DELETE`）
    pub async fn send_empty<T: DeserializeOwned>(
        &self,
        op: &str,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
    ) -> ApiResult<T> {
        self.execute(op, self.request(method, path, token)).await
    }

    /// 以 JSON 发送部分更新，只包含 patch 中存在的字段
    pub async fn send_patch_json<T: DeserializeOwned>(
        &self,
        op: &str,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        patch: &Patch,
    ) -> ApiResult<T> {
        self.send_json(op, method, path, token, &patch.to_json())
            .await
    }

    /// 以 multipart 发送
    ///
    /// 不设置 `Content-Type`，由传输层写入带 boundary 的值。
    pub async fn send_multipart<T: DeserializeOwned>(
        &self,
        op: &str,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        patch: Patch,
    ) -> ApiResult<T> {
        let req = self
            .request(method, path, token)
            .with_multipart(patch_to_parts(patch));
        self.execute(op, req).await
    }

    // --- 资源模块 ---

    pub fn auth(&self) -> AuthApi<'_, C> {
        AuthApi::new(self)
    }

    pub fn agencies(&self) -> AgencyApi<'_, C> {
        AgencyApi::new(self)
    }

    pub fn standards(&self) -> StandardApi<'_, C> {
        StandardApi::new(self)
    }

    pub fn submissions(&self) -> SubmissionApi<'_, C> {
        SubmissionApi::new(self)
    }

    pub fn initiatives(&self) -> InitiativeApi<'_, C> {
        InitiativeApi::new(self)
    }

    pub fn news(&self) -> NewsApi<'_, C> {
        ContentApi::new(self, Resource::News, "news")
    }

    pub fn success_stories(&self) -> SuccessStoryApi<'_, C> {
        ContentApi::new(self, Resource::SuccessStories, "success_stories")
    }

    pub fn reports(&self) -> ReportApi<'_, C> {
        ReportApi::new(self)
    }

    pub fn health_indicators(&self) -> HealthIndicatorApi<'_, C> {
        HealthIndicatorApi::new(self)
    }

    pub fn volunteers(&self) -> VolunteerApi<'_, C> {
        VolunteerApi::new(self)
    }
}

/// Patch -> multipart 表单部分，保持字段顺序
pub(crate) fn patch_to_parts(patch: Patch) -> Vec<FormPart> {
    patch
        .into_fields()
        .into_iter()
        .map(|(name, value)| match value {
            PatchValue::File(file) => FormPart::File { name, file },
            other => FormPart::Text {
                name,
                value: other.as_form_text().unwrap_or_default(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;
    use crate::request::{MockHttpClient, RequestBody};
    use huraymila_shared::FileUpload;
    use serde_json::{Value, json};

    const BASE: &str = "http://localhost:5000/api";

    fn setup() -> (Rc<MockHttpClient>, ApiClient<MockHttpClient>) {
        let mock = Rc::new(MockHttpClient::new());
        let api = ApiClient::from_shared(mock.clone(), ClientConfig::new(BASE));
        (mock, api)
    }

    #[test]
    fn test_query_string_skips_absent_params() {
        let q = ListQuery::new().page(2).search("  ").filter("category", "health & safety");
        assert_eq!(q.to_query_string(), "?page=2&category=health%20%26%20safety");
        assert_eq!(ListQuery::new().to_query_string(), "");
    }

    #[tokio::test]
    async fn test_json_request_carries_headers() {
        let (mock, api) = setup();
        mock.mock_response(HttpMethod::Post, &format!("{}/x", BASE), 201, json!({ "ok": true }));

        let resp: Value = api
            .send_json("x.create", HttpMethod::Post, "/x", Some("t1"), &json!({ "a": 1 }))
            .await
            .unwrap();
        assert_eq!(resp, json!({ "ok": true }));

        let req = mock.last_request();
        assert_eq!(req.headers.get("Authorization").unwrap(), "Bearer t1");
        assert_eq!(req.headers.get("Content-Type").unwrap(), "application/json");
        assert_eq!(req.json_body(), json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn test_multipart_request_has_no_content_type() {
        let (mock, api) = setup();
        mock.mock_response(HttpMethod::Post, &format!("{}/x", BASE), 201, json!({}));

        let patch = Patch::new()
            .text("title", "X")
            .json("priority", 1)
            .file("image", FileUpload::new("a.png", "image/png", vec![1]));
        let _: Value = api
            .send_multipart("x.create", HttpMethod::Post, "/x", Some("t1"), patch)
            .await
            .unwrap();

        let req = mock.last_request();
        assert!(!req.headers.contains_key("Content-Type"));
        assert_eq!(req.form_names(), vec!["title", "priority", "image"]);
        assert_eq!(req.form_text("priority").as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Get,
            &format!("{}/x", BASE),
            400,
            json!({ "message": "Foo" }),
        );

        let err = api.get::<Value>("x.get", "/x", None).await.unwrap_err();
        assert_eq!(err.message(), "Foo");
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.spans()[0].operation, "x.get");
    }

    #[tokio::test]
    async fn test_unparseable_error_body_uses_fallback() {
        let (mock, api) = setup();
        mock.mock_raw(HttpMethod::Get, &format!("{}/x", BASE), 500, "Internal Server Error");

        let err = api.get::<Value>("x.get", "/x", None).await.unwrap_err();
        assert_eq!(err.message(), "Request failed with status 500");
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported_once() {
        let (mock, api) = setup();
        mock.go_offline();

        let err = api.get::<Value>("x.get", "/x", None).await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Transport);
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_success_body() {
        let (mock, api) = setup();
        mock.mock_raw(HttpMethod::Get, &format!("{}/x", BASE), 200, "<html>");

        let err = api.get::<Value>("x.get", "/x", None).await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_patch_json_sends_only_present_fields() {
        let (mock, api) = setup();
        mock.mock_response(HttpMethod::Put, &format!("{}/x/1", BASE), 200, json!({}));

        let patch = Patch::new().opt_text("name", Some("A")).opt_text::<&str>("unit", None);
        let _: Value = api
            .send_patch_json("x.update", HttpMethod::Put, "/x/1", Some("t"), &patch)
            .await
            .unwrap();
        match mock.last_request().body {
            Some(RequestBody::Json(s)) => assert_eq!(s, r#"{"name":"A"}"#),
            other => panic!("unexpected body {:?}", other),
        }
    }
}
