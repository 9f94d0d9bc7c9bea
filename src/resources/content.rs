//! 带优先级排序的内容资源（新闻、成功故事）
//!
//! 两类资源的接口形状完全一致：列表、置顶列表、可用优先级、详情、
//! multipart 创建/部分更新、删除。

use crate::api::{ApiClient, ListQuery};
use crate::error::ApiResult;
use crate::request::HttpClient;
use huraymila_shared::models::{Ack, Envelope};
use huraymila_shared::{CalendarDate, FileUpload, HttpMethod, IntoPatch, Patch, Resource};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// 新建内容所需字段
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDraft {
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub date: CalendarDate,
    pub priority: Option<u32>,
    pub image: Option<FileUpload>,
}

impl IntoPatch for ContentDraft {
    fn into_patch(self) -> Patch {
        Patch::new()
            .text("title", self.title)
            .opt_text("subtitle", self.subtitle)
            .text("description", self.description)
            .text("date", self.date)
            .opt_json("priority", self.priority)
            .opt_file("image", self.image)
    }
}

/// 部分更新；`None` 的字段不会被发送
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub date: Option<CalendarDate>,
    /// `Some(None)` 取消置顶优先级
    pub priority: Option<Option<u32>>,
    pub image: Option<FileUpload>,
}

impl ContentUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl IntoPatch for ContentUpdate {
    fn into_patch(self) -> Patch {
        Patch::new()
            .opt_text("title", self.title)
            .opt_text("subtitle", self.subtitle)
            .opt_text("description", self.description)
            .opt_text("date", self.date)
            .opt_clearable("priority", self.priority)
            .opt_file("image", self.image)
    }
}

pub struct ContentApi<'a, C: HttpClient, T> {
    api: &'a ApiClient<C>,
    resource: Resource,
    label: &'static str,
    _item: PhantomData<T>,
}

impl<'a, C: HttpClient, T: DeserializeOwned> ContentApi<'a, C, T> {
    pub(crate) fn new(api: &'a ApiClient<C>, resource: Resource, label: &'static str) -> Self {
        Self {
            api,
            resource,
            label,
            _item: PhantomData,
        }
    }

    fn op(&self, action: &str) -> String {
        format!("{}.{}", self.label, action)
    }

    pub async fn list(&self, query: &ListQuery) -> ApiResult<Envelope<Vec<T>>> {
        self.api
            .get_with_query(&self.op("list"), self.resource.base(), query, None)
            .await
    }

    /// 按优先级排序、用于首页展示的条目
    pub async fn prioritized(&self) -> ApiResult<Envelope<Vec<T>>> {
        self.api
            .get(&self.op("prioritized"), &self.resource.child("prioritized"), None)
            .await
    }

    /// 尚未被占用的优先级
    pub async fn available_priorities(&self, token: &str) -> ApiResult<Envelope<Vec<u32>>> {
        self.api
            .get(
                &self.op("available_priorities"),
                &self.resource.child("available-priorities"),
                Some(token),
            )
            .await
    }

    pub async fn get(&self, id: &str) -> ApiResult<Envelope<T>> {
        self.api
            .get(&self.op("get"), &self.resource.item(id), None)
            .await
    }

    pub async fn create(&self, token: &str, draft: ContentDraft) -> ApiResult<Envelope<T>> {
        self.api
            .send_multipart(
                &self.op("create"),
                HttpMethod::Post,
                self.resource.base(),
                Some(token),
                draft.into_patch(),
            )
            .await
    }

    pub async fn update(
        &self,
        token: &str,
        id: &str,
        update: ContentUpdate,
    ) -> ApiResult<Envelope<T>> {
        self.api
            .send_multipart(
                &self.op("update"),
                HttpMethod::Put,
                &self.resource.item(id),
                Some(token),
                update.into_patch(),
            )
            .await
    }

    pub async fn delete(&self, token: &str, id: &str) -> ApiResult<Ack> {
        self.api
            .send_empty(
                &self.op("delete"),
                HttpMethod::Delete,
                &self.resource.item(id),
                Some(token),
            )
            .await
    }
}
