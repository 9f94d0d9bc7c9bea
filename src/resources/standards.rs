use crate::api::{ApiClient, ListQuery};
use crate::error::ApiResult;
use crate::request::HttpClient;
use huraymila_shared::models::{Envelope, Standard};
use huraymila_shared::{HttpMethod, IntoPatch, Patch, Resource};

/// 标准的部分更新（JSON）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandardUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    /// 负责该标准的机构 id
    pub assigned_agencies: Option<Vec<String>>,
}

impl IntoPatch for StandardUpdate {
    fn into_patch(self) -> Patch {
        Patch::new()
            .opt_text("title", self.title)
            .opt_text("description", self.description)
            .opt_json("requirements", self.requirements)
            .opt_json("assignedAgencies", self.assigned_agencies)
    }
}

/// `/standards` 接口
pub struct StandardApi<'a, C: HttpClient> {
    api: &'a ApiClient<C>,
}

impl<'a, C: HttpClient> StandardApi<'a, C> {
    pub(crate) fn new(api: &'a ApiClient<C>) -> Self {
        Self { api }
    }

    pub async fn list(
        &self,
        token: &str,
        query: &ListQuery,
    ) -> ApiResult<Envelope<Vec<Standard>>> {
        self.api
            .get_with_query("standards.list", Resource::Standards.base(), query, Some(token))
            .await
    }

    pub async fn get(&self, token: &str, id: &str) -> ApiResult<Envelope<Standard>> {
        self.api
            .get("standards.get", &Resource::Standards.item(id), Some(token))
            .await
    }

    pub async fn update(
        &self,
        token: &str,
        id: &str,
        update: StandardUpdate,
    ) -> ApiResult<Envelope<Standard>> {
        self.api
            .send_patch_json(
                "standards.update",
                HttpMethod::Put,
                &Resource::Standards.item(id),
                Some(token),
                &update.into_patch(),
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

    #[tokio::test]
    async fn test_update_sends_arrays_as_json() {
        let mock = Rc::new(MockHttpClient::new());
        let api = ApiClient::from_shared(mock.clone(), ClientConfig::new("http://h/api"));
        mock.mock_response(
            HttpMethod::Put,
            "http://h/api/standards/s7",
            200,
            json!({ "data": { "_id": "s7", "number": 7, "title": "Safe schools" } }),
        );

        let update = StandardUpdate {
            assigned_agencies: Some(vec!["a1".into(), "a2".into()]),
            ..Default::default()
        };
        let resp = api.standards().update("t", "s7", update).await.unwrap();
        assert_eq!(resp.data.number, Some(7));
        assert_eq!(
            mock.last_request().json_body(),
            json!({ "assignedAgencies": ["a1", "a2"] })
        );
    }
}
