use crate::api::{ApiClient, ListQuery};
use crate::error::ApiResult;
use crate::request::HttpClient;
use huraymila_shared::models::{Ack, Envelope, Initiative, Volunteer};
use huraymila_shared::{CalendarDate, FileUpload, HttpMethod, IntoPatch, Patch, Resource};
use serde_json::json;

#[derive(Debug, Clone, PartialEq)]
pub struct InitiativeDraft {
    pub title: String,
    pub description: String,
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
    pub location: Option<String>,
    pub category: Option<String>,
    pub max_volunteers: Option<u32>,
    pub image: Option<FileUpload>,
}

impl IntoPatch for InitiativeDraft {
    fn into_patch(self) -> Patch {
        Patch::new()
            .text("title", self.title)
            .text("description", self.description)
            .text("startDate", self.start_date)
            .text("endDate", self.end_date)
            .opt_text("location", self.location)
            .opt_text("category", self.category)
            .opt_json("maxVolunteers", self.max_volunteers)
            .opt_file("image", self.image)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitiativeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<CalendarDate>,
    pub end_date: Option<CalendarDate>,
    pub location: Option<String>,
    pub category: Option<String>,
    /// `Some(None)` 取消名额上限
    pub max_volunteers: Option<Option<u32>>,
    pub image: Option<FileUpload>,
}

impl InitiativeUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl IntoPatch for InitiativeUpdate {
    fn into_patch(self) -> Patch {
        Patch::new()
            .opt_text("title", self.title)
            .opt_text("description", self.description)
            .opt_text("startDate", self.start_date)
            .opt_text("endDate", self.end_date)
            .opt_text("location", self.location)
            .opt_text("category", self.category)
            .opt_clearable("maxVolunteers", self.max_volunteers)
            .opt_file("image", self.image)
    }
}

/// `/initiatives` 接口
pub struct InitiativeApi<'a, C: HttpClient> {
    api: &'a ApiClient<C>,
}

impl<'a, C: HttpClient> InitiativeApi<'a, C> {
    pub(crate) fn new(api: &'a ApiClient<C>) -> Self {
        Self { api }
    }

    /// 公开列表；带 token 时后端会附带当前志愿者的报名状态
    pub async fn list(
        &self,
        query: &ListQuery,
        token: Option<&str>,
    ) -> ApiResult<Envelope<Vec<Initiative>>> {
        self.api
            .get_with_query("initiatives.list", Resource::Initiatives.base(), query, token)
            .await
    }

    pub async fn get(&self, id: &str, token: Option<&str>) -> ApiResult<Envelope<Initiative>> {
        self.api
            .get("initiatives.get", &Resource::Initiatives.item(id), token)
            .await
    }

    pub async fn create(
        &self,
        token: &str,
        draft: InitiativeDraft,
    ) -> ApiResult<Envelope<Initiative>> {
        self.api
            .send_multipart(
                "initiatives.create",
                HttpMethod::Post,
                Resource::Initiatives.base(),
                Some(token),
                draft.into_patch(),
            )
            .await
    }

    pub async fn update(
        &self,
        token: &str,
        id: &str,
        update: InitiativeUpdate,
    ) -> ApiResult<Envelope<Initiative>> {
        self.api
            .send_multipart(
                "initiatives.update",
                HttpMethod::Put,
                &Resource::Initiatives.item(id),
                Some(token),
                update.into_patch(),
            )
            .await
    }

    pub async fn delete(&self, token: &str, id: &str) -> ApiResult<Ack> {
        self.api
            .send_empty(
                "initiatives.delete",
                HttpMethod::Delete,
                &Resource::Initiatives.item(id),
                Some(token),
            )
            .await
    }

    // --- 志愿者报名 ---

    pub async fn apply(&self, token: &str, id: &str) -> ApiResult<Ack> {
        self.api
            .send_empty(
                "initiatives.apply",
                HttpMethod::Post,
                &Resource::Initiatives.item_child(id, "apply"),
                Some(token),
            )
            .await
    }

    pub async fn withdraw(&self, token: &str, id: &str) -> ApiResult<Ack> {
        self.api
            .send_empty(
                "initiatives.withdraw",
                HttpMethod::Post,
                &Resource::Initiatives.item_child(id, "withdraw"),
                Some(token),
            )
            .await
    }

    pub async fn volunteers(&self, token: &str, id: &str) -> ApiResult<Envelope<Vec<Volunteer>>> {
        self.api
            .get(
                "initiatives.volunteers",
                &Resource::Initiatives.item_child(id, "volunteers"),
                Some(token),
            )
            .await
    }

    // --- 审批 ---

    pub async fn approve(&self, token: &str, id: &str) -> ApiResult<Envelope<Initiative>> {
        self.api
            .send_empty(
                "initiatives.approve",
                HttpMethod::Put,
                &Resource::Initiatives.item_child(id, "approve"),
                Some(token),
            )
            .await
    }

    /// 驳回倡议；`reason` 为空时不发送该字段
    pub async fn decline(
        &self,
        token: &str,
        id: &str,
        reason: Option<&str>,
    ) -> ApiResult<Envelope<Initiative>> {
        let body = match reason.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => json!({ "reason": r }),
            None => json!({}),
        };
        self.api
            .send_json(
                "initiatives.decline",
                HttpMethod::Put,
                &Resource::Initiatives.item_child(id, "decline"),
                Some(token),
                &body,
            )
            .await
    }

    pub async fn by_agency(
        &self,
        token: &str,
        agency_id: &str,
    ) -> ApiResult<Envelope<Vec<Initiative>>> {
        let path = format!(
            "{}/{}",
            Resource::Initiatives.child("agency"),
            urlencoding::encode(agency_id)
        );
        self.api
            .get("initiatives.by_agency", &path, Some(token))
            .await
    }

    /// 等待审批的倡议
    pub async fn pending(&self, token: &str) -> ApiResult<Envelope<Vec<Initiative>>> {
        self.api
            .get(
                "initiatives.pending",
                &Resource::Initiatives.child("pending/all"),
                Some(token),
            )
            .await
    }
}
