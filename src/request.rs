use crate::error::{ApiError, ApiResult};
use huraymila_shared::{FileUpload, HttpMethod};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

#[cfg(test)]
use std::cell::RefCell;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// multipart 表单的单个部分
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file: FileUpload },
}

impl FormPart {
    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

/// 请求体
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// 已序列化的 JSON 文本
    Json(String),
    /// multipart 表单；边界由传输层生成
    Multipart(Vec<FormPart>),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_json(mut self, body: &serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body.to_string()));
        self
    }

    pub fn with_multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = Some(RequestBody::Multipart(parts));
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 解析 JSON 响应体；空响应体按 `null` 处理
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body).map_err(ApiError::from)
    }
}

/// HTTP 客户端特性
///
/// 客户端运行在单线程事件循环中，故使用 `?Send`。
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;
}

// =========================================================
// 实现层: reqwest 客户端
// =========================================================

#[derive(Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(m: HttpMethod) -> reqwest::Method {
    match m {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn to_multipart_form(parts: Vec<FormPart>) -> ApiResult<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File { name, file } => {
                let part = reqwest::multipart::Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(|e| {
                        ApiError::validation(format!("Invalid file type: {}", e))
                            .in_op_with("multipart.part", name.clone())
                    })?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

#[async_trait::async_trait(?Send)]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let mut builder = self
            .client
            .request(to_reqwest_method(req.method), &req.url);

        for (k, v) in &req.headers {
            builder = builder.header(k, v);
        }

        builder = match req.body {
            Some(RequestBody::Json(body)) => builder.body(body),
            Some(RequestBody::Multipart(parts)) => builder.multipart(to_multipart_form(parts)?),
            None => builder,
        };

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

/// 记录下来的请求
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<RequestBody>,
}

#[cfg(test)]
impl RecordedRequest {
    pub fn json_body(&self) -> serde_json::Value {
        match &self.body {
            Some(RequestBody::Json(s)) => serde_json::from_str(s).unwrap(),
            other => panic!("expected JSON body, got {:?}", other),
        }
    }

    pub fn form_names(&self) -> Vec<String> {
        match &self.body {
            Some(RequestBody::Multipart(parts)) => {
                parts.iter().map(|p| p.name().to_string()).collect()
            }
            other => panic!("expected multipart body, got {:?}", other),
        }
    }

    pub fn form_text(&self, name: &str) -> Option<String> {
        match &self.body {
            Some(RequestBody::Multipart(parts)) => parts.iter().find_map(|p| match p {
                FormPart::Text { name: n, value } if n == name => Some(value.clone()),
                _ => None,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
pub struct MockHttpClient {
    // (Method, URL) -> (Status, Response Body)
    responses: RefCell<HashMap<(HttpMethod, String), (u16, String)>>,
    pub requests: RefCell<Vec<RecordedRequest>>,
    offline: std::cell::Cell<bool>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
            offline: std::cell::Cell::new(false),
        }
    }

    pub fn mock_response(
        &self,
        method: HttpMethod,
        url: &str,
        status: u16,
        body: serde_json::Value,
    ) {
        self.mock_raw(method, url, status, &body.to_string());
    }

    pub fn mock_raw(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
        self.responses
            .borrow_mut()
            .insert((method, url.to_string()), (status, body.to_string()));
    }

    /// 之后所有请求都以网络错误失败
    pub fn go_offline(&self) {
        self.offline.set(true);
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        self.requests.borrow_mut().push(RecordedRequest {
            url: req.url.clone(),
            method: req.method,
            headers: req.headers.clone(),
            body: req.body.clone(),
        });

        if self.offline.get() {
            return Err(ApiError::transport("Network error: connection refused"));
        }

        let responses = self.responses.borrow();
        if let Some((status, body)) = responses.get(&(req.method, req.url.clone())) {
            Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            })
        } else {
            Ok(HttpResponse {
                status: 404,
                body: "Not Found".to_string(),
            })
        }
    }
}
