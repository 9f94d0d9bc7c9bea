//! 资源模块
//!
//! 每个模块包装一类后端资源的 CRUD 接口，均通过 `ApiClient` 发送请求。

pub mod agencies;
pub mod auth;
pub mod content;
pub mod health_indicators;
pub mod initiatives;
pub mod news;
pub mod reports;
pub mod standards;
pub mod submissions;
pub mod success_stories;
pub mod volunteers;
