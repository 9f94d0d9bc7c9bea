use crate::api::ApiClient;
use crate::error::ApiResult;
use crate::request::HttpClient;
use huraymila_shared::models::{LoginRequest, LoginResponse};
use huraymila_shared::{HttpMethod, Resource};

/// `/auth` 接口
pub struct AuthApi<'a, C: HttpClient> {
    api: &'a ApiClient<C>,
}

impl<'a, C: HttpClient> AuthApi<'a, C> {
    pub(crate) fn new(api: &'a ApiClient<C>) -> Self {
        Self { api }
    }

    /// 用户名密码登录，返回 token、用户与跳转地址
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<LoginResponse> {
        self.api
            .send_json(
                "auth.login",
                HttpMethod::Post,
                &Resource::Auth.child("login"),
                None,
                credentials,
            )
            .await
    }
}
