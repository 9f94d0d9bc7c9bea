use super::content::ContentApi;
use huraymila_shared::models::News;

pub use super::content::{ContentDraft as NewsDraft, ContentUpdate as NewsUpdate};

pub type NewsApi<'a, C> = ContentApi<'a, C, News>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, ListQuery};
    use crate::config::ClientConfig;
    use crate::request::MockHttpClient;
    use huraymila_shared::models::Ack;
    use huraymila_shared::{CalendarDate, FileUpload, HttpMethod};
    use serde_json::json;
    use std::rc::Rc;

    const BASE: &str = "http://localhost:5000/api";

    fn setup() -> (Rc<MockHttpClient>, ApiClient<MockHttpClient>) {
        let mock = Rc::new(MockHttpClient::new());
        let api = ApiClient::from_shared(mock.clone(), ClientConfig::new(BASE));
        (mock, api)
    }

    fn news_json(id: &str, title: &str) -> serde_json::Value {
        json!({ "_id": id, "title": title, "date": "2024-05-01" })
    }

    #[tokio::test]
    async fn test_update_with_only_title_omits_other_fields() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Put,
            &format!("{}/news/n1", BASE),
            200,
            json!({ "success": true, "data": news_json("n1", "X") }),
        );

        let update = NewsUpdate {
            title: Some("X".into()),
            ..Default::default()
        };
        let resp = api.news().update("t1", "n1", update).await.unwrap();
        assert_eq!(resp.data.title, "X");

        let req = mock.last_request();
        assert_eq!(req.form_names(), vec!["title"]);
        assert_eq!(req.form_text("title").as_deref(), Some("X"));
        assert!(req.form_text("subtitle").is_none());
        assert!(req.form_text("description").is_none());
        assert!(req.form_text("date").is_none());
        assert!(!req.headers.contains_key("Content-Type"));
    }

    #[tokio::test]
    async fn test_delete_with_no_content_response() {
        let (mock, api) = setup();
        mock.mock_raw(HttpMethod::Delete, &format!("{}/news/n1", BASE), 204, "");

        let ack = api.news().delete("t1", "n1").await.unwrap();
        assert_eq!(ack, Ack::default());
        assert_eq!(mock.last_request().method, HttpMethod::Delete);
    }

    #[tokio::test]
    async fn test_create_sends_all_draft_fields() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Post,
            &format!("{}/news", BASE),
            201,
            json!({ "success": true, "data": news_json("n2", "Clinic opening") }),
        );

        let draft = NewsDraft {
            title: "Clinic opening".into(),
            subtitle: None,
            description: "A new primary care clinic".into(),
            date: CalendarDate::from_ymd(2024, 5, 1).unwrap(),
            priority: Some(1),
            image: Some(FileUpload::new("c.jpg", "image/jpeg", vec![0xff, 0xd8])),
        };
        api.news().create("t1", draft).await.unwrap();

        let req = mock.last_request();
        assert_eq!(
            req.form_names(),
            vec!["title", "description", "date", "priority", "image"]
        );
        assert_eq!(req.form_text("date").as_deref(), Some("2024-05-01"));
        assert_eq!(req.headers.get("Authorization").unwrap(), "Bearer t1");
    }

    #[tokio::test]
    async fn test_public_reads() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Get,
            &format!("{}/news?page=1&limit=6", BASE),
            200,
            json!({ "data": [news_json("n1", "A"), news_json("n2", "B")] }),
        );
        mock.mock_response(
            HttpMethod::Get,
            &format!("{}/news/prioritized", BASE),
            200,
            json!({ "data": [news_json("n2", "B")] }),
        );

        let list = api
            .news()
            .list(&ListQuery::new().page(1).limit(6))
            .await
            .unwrap();
        assert_eq!(list.data.len(), 2);
        assert!(!mock.last_request().headers.contains_key("Authorization"));

        let top = api.news().prioritized().await.unwrap();
        assert_eq!(top.data[0].id, "n2");
    }

    #[tokio::test]
    async fn test_delete_and_priorities() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Delete,
            &format!("{}/news/n1", BASE),
            200,
            json!({ "success": true, "message": "News deleted" }),
        );
        mock.mock_response(
            HttpMethod::Get,
            &format!("{}/news/available-priorities", BASE),
            200,
            json!({ "data": [3, 4, 5] }),
        );

        let ack = api.news().delete("t1", "n1").await.unwrap();
        assert_eq!(ack.message.as_deref(), Some("News deleted"));
        assert_eq!(mock.last_request().method, HttpMethod::Delete);

        let free = api.news().available_priorities("t1").await.unwrap();
        assert_eq!(free.data, vec![3, 4, 5]);
    }

    #[tokio::test]
    async fn test_missing_news_reports_server_message() {
        let (mock, api) = setup();
        mock.mock_response(
            HttpMethod::Get,
            &format!("{}/news/zzz", BASE),
            404,
            json!({ "success": false, "message": "News not found" }),
        );

        let err = api.news().get("zzz").await.unwrap_err();
        assert_eq!(err.message(), "News not found");
        assert_eq!(err.spans()[0].operation, "news.get");
    }
}
