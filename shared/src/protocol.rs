use serde::{Deserialize, Serialize};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Top-level REST collections exposed by the portal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Auth,
    Agencies,
    Standards,
    Submissions,
    Initiatives,
    News,
    SuccessStories,
    Reports,
    HealthIndicators,
    Volunteers,
}

impl Resource {
    /// Collection path relative to the API base URL.
    pub const fn base(&self) -> &'static str {
        match self {
            Resource::Auth => "/auth",
            Resource::Agencies => "/agencies",
            Resource::Standards => "/standards",
            Resource::Submissions => "/submissions",
            Resource::Initiatives => "/initiatives",
            Resource::News => "/news",
            Resource::SuccessStories => "/success-stories",
            Resource::Reports => "/reports",
            Resource::HealthIndicators => "/health-indicators",
            Resource::Volunteers => "/volunteers",
        }
    }

    /// `/<collection>/<id>`
    pub fn item(&self, id: &str) -> String {
        format!("{}/{}", self.base(), urlencoding::encode(id))
    }

    /// `/<collection>/<segment>` for fixed sub-routes such as `prioritized`.
    pub fn child(&self, segment: &str) -> String {
        format!("{}/{}", self.base(), segment)
    }

    /// `/<collection>/<id>/<segment>` for member actions such as `apply`.
    pub fn item_child(&self, id: &str, segment: &str) -> String {
        format!("{}/{}/{}", self.base(), urlencoding::encode(id), segment)
    }
}
