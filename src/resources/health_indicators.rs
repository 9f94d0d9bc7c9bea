use crate::api::{ApiClient, ListQuery};
use crate::error::ApiResult;
use crate::request::HttpClient;
use huraymila_shared::models::{Ack, Envelope, HealthIndicator};
use huraymila_shared::{HttpMethod, IntoPatch, Patch, Resource};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthIndicatorDraft {
    pub name: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthIndicatorUpdate {
    pub name: Option<String>,
    pub value: Option<f64>,
    pub target: Option<f64>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub year: Option<i32>,
}

impl IntoPatch for HealthIndicatorUpdate {
    fn into_patch(self) -> Patch {
        Patch::new()
            .opt_text("name", self.name)
            .opt_json("value", self.value)
            .opt_json("target", self.target)
            .opt_text("unit", self.unit)
            .opt_text("category", self.category)
            .opt_json("year", self.year)
    }
}

/// `/health-indicators` 接口
pub struct HealthIndicatorApi<'a, C: HttpClient> {
    api: &'a ApiClient<C>,
}

impl<'a, C: HttpClient> HealthIndicatorApi<'a, C> {
    pub(crate) fn new(api: &'a ApiClient<C>) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &ListQuery) -> ApiResult<Envelope<Vec<HealthIndicator>>> {
        self.api
            .get_with_query(
                "health_indicators.list",
                Resource::HealthIndicators.base(),
                query,
                None,
            )
            .await
    }

    pub async fn get(&self, id: &str) -> ApiResult<Envelope<HealthIndicator>> {
        self.api
            .get(
                "health_indicators.get",
                &Resource::HealthIndicators.item(id),
                None,
            )
            .await
    }

    pub async fn create(
        &self,
        token: &str,
        draft: &HealthIndicatorDraft,
    ) -> ApiResult<Envelope<HealthIndicator>> {
        self.api
            .send_json(
                "health_indicators.create",
                HttpMethod::Post,
                Resource::HealthIndicators.base(),
                Some(token),
                draft,
            )
            .await
    }

    pub async fn update(
        &self,
        token: &str,
        id: &str,
        update: HealthIndicatorUpdate,
    ) -> ApiResult<Envelope<HealthIndicator>> {
        self.api
            .send_patch_json(
                "health_indicators.update",
                HttpMethod::Put,
                &Resource::HealthIndicators.item(id),
                Some(token),
                &update.into_patch(),
            )
            .await
    }

    pub async fn delete(&self, token: &str, id: &str) -> ApiResult<Ack> {
        self.api
            .send_empty(
                "health_indicators.delete",
                HttpMethod::Delete,
                &Resource::HealthIndicators.item(id),
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

    #[tokio::test]
    async fn test_create_and_update_are_json() {
        let mock = Rc::new(MockHttpClient::new());
        let api = ApiClient::from_shared(mock.clone(), ClientConfig::new("http://h/api"));
        mock.mock_response(
            HttpMethod::Post,
            "http://h/api/health-indicators",
            201,
            json!({ "data": { "_id": "h1", "name": "Obesity rate", "value": 31.5 } }),
        );
        mock.mock_response(
            HttpMethod::Put,
            "http://h/api/health-indicators/h1",
            200,
            json!({ "data": { "_id": "h1", "name": "Obesity rate", "value": 29.0 } }),
        );

        let draft = HealthIndicatorDraft {
            name: "Obesity rate".into(),
            value: 31.5,
            target: None,
            unit: Some("%".into()),
            category: None,
            year: Some(2024),
        };
        api.health_indicators().create("t", &draft).await.unwrap();
        let req = mock.last_request();
        assert_eq!(req.headers.get("Content-Type").unwrap(), "application/json");
        assert_eq!(
            req.json_body(),
            json!({ "name": "Obesity rate", "value": 31.5, "unit": "%", "year": 2024 })
        );

        let update = HealthIndicatorUpdate {
            value: Some(29.0),
            ..Default::default()
        };
        let updated = api.health_indicators().update("t", "h1", update).await.unwrap();
        assert_eq!(updated.data.value, Some(29.0));
        assert_eq!(mock.last_request().json_body(), json!({ "value": 29.0 }));
    }
}
