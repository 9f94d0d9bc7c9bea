use crate::api::{ApiClient, ListQuery};
use crate::error::ApiResult;
use crate::request::HttpClient;
use huraymila_shared::models::{Ack, Agency, Envelope, LoginRequest, LoginResponse};
use huraymila_shared::{FileUpload, HttpMethod, IntoPatch, Patch, Resource};

/// 机构注册表单
#[derive(Debug, Clone, PartialEq)]
pub struct AgencyRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub agency_type: Option<String>,
    pub contact_person: Option<String>,
    pub logo: Option<FileUpload>,
}

impl IntoPatch for AgencyRegistration {
    fn into_patch(self) -> Patch {
        Patch::new()
            .text("name", self.name)
            .text("email", self.email)
            .text("password", self.password)
            .opt_text("phone", self.phone)
            .opt_text("agencyType", self.agency_type)
            .opt_text("contactPerson", self.contact_person)
            .opt_file("logo", self.logo)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgencyUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub agency_type: Option<String>,
    pub contact_person: Option<String>,
    pub is_active: Option<bool>,
    pub logo: Option<FileUpload>,
}

impl IntoPatch for AgencyUpdate {
    fn into_patch(self) -> Patch {
        Patch::new()
            .opt_text("name", self.name)
            .opt_text("email", self.email)
            .opt_text("phone", self.phone)
            .opt_text("agencyType", self.agency_type)
            .opt_text("contactPerson", self.contact_person)
            .opt_json("isActive", self.is_active)
            .opt_file("logo", self.logo)
    }
}

/// `/agencies` 接口
pub struct AgencyApi<'a, C: HttpClient> {
    api: &'a ApiClient<C>,
}

impl<'a, C: HttpClient> AgencyApi<'a, C> {
    pub(crate) fn new(api: &'a ApiClient<C>) -> Self {
        Self { api }
    }

    pub async fn list(&self, token: &str, query: &ListQuery) -> ApiResult<Envelope<Vec<Agency>>> {
        self.api
            .get_with_query("agencies.list", Resource::Agencies.base(), query, Some(token))
            .await
    }

    pub async fn get(&self, token: &str, id: &str) -> ApiResult<Envelope<Agency>> {
        self.api
            .get("agencies.get", &Resource::Agencies.item(id), Some(token))
            .await
    }

    /// 公开注册入口，无需 token
    pub async fn register(&self, registration: AgencyRegistration) -> ApiResult<Envelope<Agency>> {
        self.api
            .send_multipart(
                "agencies.register",
                HttpMethod::Post,
                Resource::Agencies.base(),
                None,
                registration.into_patch(),
            )
            .await
    }

    pub async fn update(
        &self,
        token: &str,
        id: &str,
        update: AgencyUpdate,
    ) -> ApiResult<Envelope<Agency>> {
        self.api
            .send_multipart(
                "agencies.update",
                HttpMethod::Put,
                &Resource::Agencies.item(id),
                Some(token),
                update.into_patch(),
            )
            .await
    }

    pub async fn delete(&self, token: &str, id: &str) -> ApiResult<Ack> {
        self.api
            .send_empty(
                "agencies.delete",
                HttpMethod::Delete,
                &Resource::Agencies.item(id),
                Some(token),
            )
            .await
    }

    /// 机构门户登录
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<LoginResponse> {
        self.api
            .send_json(
                "agencies.login",
                HttpMethod::Post,
                &Resource::Agencies.child("login"),
                None,
                credentials,
            )
            .await
    }

    /// 当前登录机构的资料
    pub async fn profile(&self, token: &str) -> ApiResult<Envelope<Agency>> {
        self.api
            .get(
                "agencies.profile",
                &Resource::Agencies.child("profile"),
                Some(token),
            )
            .await
    }

    pub async fn update_profile(
        &self,
        token: &str,
        update: AgencyUpdate,
    ) -> ApiResult<Envelope<Agency>> {
        self.api
            .send_multipart(
                "agencies.update_profile",
                HttpMethod::Put,
                &Resource::Agencies.child("profile"),
                Some(token),
                update.into_patch(),
            )
            .await
    }
}
