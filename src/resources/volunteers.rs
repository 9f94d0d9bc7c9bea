use crate::api::{ApiClient, ListQuery};
use crate::error::ApiResult;
use crate::request::HttpClient;
use huraymila_shared::models::{Ack, Envelope, Volunteer};
use huraymila_shared::{HttpMethod, IntoPatch, Patch, Resource};
use serde::Serialize;

/// 志愿者注册表单
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerRegistration {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolunteerUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<Vec<String>>,
}

impl IntoPatch for VolunteerUpdate {
    fn into_patch(self) -> Patch {
        Patch::new()
            .opt_text("fullName", self.full_name)
            .opt_text("phone", self.phone)
            .opt_json("skills", self.skills)
    }
}

/// `/volunteers` 接口
pub struct VolunteerApi<'a, C: HttpClient> {
    api: &'a ApiClient<C>,
}

impl<'a, C: HttpClient> VolunteerApi<'a, C> {
    pub(crate) fn new(api: &'a ApiClient<C>) -> Self {
        Self { api }
    }

    pub async fn register(
        &self,
        registration: &VolunteerRegistration,
    ) -> ApiResult<Envelope<Volunteer>> {
        self.api
            .send_json(
                "volunteers.register",
                HttpMethod::Post,
                &Resource::Volunteers.child("register"),
                None,
                registration,
            )
            .await
    }

    pub async fn list(
        &self,
        token: &str,
        query: &ListQuery,
    ) -> ApiResult<Envelope<Vec<Volunteer>>> {
        self.api
            .get_with_query("volunteers.list", Resource::Volunteers.base(), query, Some(token))
            .await
    }

    pub async fn get(&self, token: &str, id: &str) -> ApiResult<Envelope<Volunteer>> {
        self.api
            .get("volunteers.get", &Resource::Volunteers.item(id), Some(token))
            .await
    }

    pub async fn update(
        &self,
        token: &str,
        id: &str,
        update: VolunteerUpdate,
    ) -> ApiResult<Envelope<Volunteer>> {
        self.api
            .send_patch_json(
                "volunteers.update",
                HttpMethod::Put,
                &Resource::Volunteers.item(id),
                Some(token),
                &update.into_patch(),
            )
            .await
    }

    pub async fn delete(&self, token: &str, id: &str) -> ApiResult<Ack> {
        self.api
            .send_empty(
                "volunteers.delete",
                HttpMethod::Delete,
                &Resource::Volunteers.item(id),
                Some(token),
            )
            .await
    }
}
