use super::*;
use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::ApiErrorKind;
use crate::request::MockHttpClient;
use crate::resources::content::{ContentDraft, ContentUpdate};
use huraymila_shared::models::{Initiative, News};
use huraymila_shared::{FileUpload, HttpMethod};
use serde_json::json;
use std::rc::Rc;

// =========================================================
// 辅助函数
// =========================================================

fn setup() -> (Rc<MockHttpClient>, ApiClient<MockHttpClient>) {
    let mock = Rc::new(MockHttpClient::new());
    let api = ApiClient::from_shared(mock.clone(), ClientConfig::new("http://h/api"));
    (mock, api)
}

fn news_record() -> News {
    serde_json::from_value(json!({
        "_id": "n1",
        "title": "Clinic opening",
        "description": "The new clinic opens.",
        "date": "2024-05-01",
        "priority": 2
    }))
    .unwrap()
}

fn fill(modal: &mut EditorModal<NewsForm>) {
    let form = modal.form_mut().unwrap();
    form.title = "Vaccination week".into();
    form.description = "Free vaccines at all centers".into();
    form.date = "2024-09-01".into();
}

/// 把弹窗提交交给新闻接口
async fn save_news(
    api: &ApiClient<MockHttpClient>,
    submission: FormSubmission<ContentDraft, ContentUpdate>,
) -> ApiResult<News> {
    let news = api.news();
    let env = match submission {
        FormSubmission::Create(draft) => news.create("t", draft).await?,
        FormSubmission::Update { id, update } => news.update("t", &id, update).await?,
    };
    Ok(env.data)
}

// =========================================================
// 状态机
// =========================================================

#[test]
fn test_open_add_seeds_defaults() {
    let mut modal = EditorModal::<NewsForm>::new();
    assert_eq!(modal.phase(), ModalPhase::Closed);
    assert!(modal.form_mut().is_none());

    modal.open_add();
    assert_eq!(modal.phase(), ModalPhase::Editing);
    assert!(!modal.is_edit());
    assert!(modal.form().title.is_empty());
    assert!(!modal.form().date.is_empty());
}

#[test]
fn test_open_edit_seeds_from_record() {
    let mut modal = EditorModal::<NewsForm>::new();
    modal.open_edit(news_record());
    assert!(modal.is_edit());
    assert_eq!(modal.form().title, "Clinic opening");
    assert_eq!(modal.form().priority, Some(2));
}

#[test]
fn test_validation_keeps_editing() {
    let mut modal = EditorModal::<NewsForm>::new();
    modal.open_add();

    let err = modal.begin_submit().unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::Validation);
    assert_eq!(modal.phase(), ModalPhase::Editing);
    assert!(modal.error().unwrap().contains("title"));
}

#[test]
fn test_second_submit_rejected_while_submitting() {
    let mut modal = EditorModal::<NewsForm>::new();
    modal.open_add();
    fill(&mut modal);

    assert!(matches!(modal.begin_submit(), Ok(FormSubmission::Create(_))));
    assert!(modal.is_submitting());
    assert!(modal.form_mut().is_none());
    assert!(!modal.close());

    let err = modal.begin_submit().unwrap_err();
    assert_eq!(err.message(), "A submission is already in progress");
    assert!(modal.is_submitting());
}

#[test]
fn test_begin_submit_on_closed_modal() {
    let mut modal = EditorModal::<NewsForm>::new();
    assert!(modal.begin_submit().is_err());
    assert_eq!(modal.phase(), ModalPhase::Closed);
}

#[test]
fn test_finish_without_submit_is_passthrough() {
    let mut modal = EditorModal::<NewsForm>::new();
    modal.open_add();
    let out = modal.finish::<()>(Err(ApiError::transport("boom")));
    assert!(out.is_err());
    assert_eq!(modal.error(), None);
    assert_eq!(modal.phase(), ModalPhase::Editing);
}

// =========================================================
// 提交流程
// =========================================================

#[tokio::test]
async fn test_submit_success_closes_modal() {
    let (mock, api) = setup();
    mock.mock_response(
        HttpMethod::Post,
        "http://h/api/news",
        201,
        json!({ "data": { "_id": "n9", "title": "Vaccination week" } }),
    );

    let mut modal = EditorModal::<NewsForm>::new();
    modal.open_add();
    fill(&mut modal);
    modal
        .form_mut()
        .unwrap()
        .image
        .select(FileUpload::new("v.png", "image/png", vec![1, 2, 3]))
        .unwrap();

    let saved = modal.submit_with(|s| save_news(&api, s)).await.unwrap();

    assert_eq!(saved.id, "n9");
    assert_eq!(modal.phase(), ModalPhase::Closed);
    assert!(modal.form().title.is_empty());
    assert_eq!(
        mock.last_request().form_names(),
        vec!["title", "description", "date", "image"]
    );
}

#[tokio::test]
async fn test_failed_submit_returns_to_editing_with_server_message() {
    let (mock, api) = setup();
    mock.mock_response(
        HttpMethod::Put,
        "http://h/api/news/n1",
        400,
        json!({ "success": false, "message": "Priority 1 is already taken" }),
    );

    let mut modal = EditorModal::<NewsForm>::new();
    modal.open_edit(news_record());
    modal.form_mut().unwrap().priority = Some(1);

    let err = modal.submit_with(|s| save_news(&api, s)).await.unwrap_err();

    assert_eq!(err.message(), "Priority 1 is already taken");
    assert_eq!(modal.phase(), ModalPhase::Editing);
    assert_eq!(modal.error(), Some("Priority 1 is already taken"));
    // 表单内容保留，方便用户修改后重试
    assert_eq!(modal.form().priority, Some(1));
    assert_eq!(mock.last_request().form_names(), vec!["priority"]);
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let (mock, api) = setup();
    let mut modal = EditorModal::<NewsForm>::new();
    modal.open_add();

    assert!(modal.submit_with(|s| save_news(&api, s)).await.is_err());
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_initiative_modal_edit() {
    let (mock, api) = setup();
    mock.mock_response(
        HttpMethod::Put,
        "http://h/api/initiatives/i1",
        200,
        json!({ "data": { "_id": "i1", "title": "Walkathon 2" } }),
    );
    let record: Initiative = serde_json::from_value(json!({
        "_id": "i1",
        "title": "Walkathon",
        "description": "City walk",
        "startDate": "2024-03-01",
        "endDate": "2024-03-02"
    }))
    .unwrap();

    let mut modal = EditorModal::<InitiativeForm>::new();
    modal.open_edit(record);
    modal.form_mut().unwrap().title = "Walkathon 2".into();

    let api = &api;
    let saved = modal
        .submit_with(|s| async move {
            match s {
                FormSubmission::Update { id, update } => {
                    api.initiatives().update("t", &id, update).await
                }
                FormSubmission::Create(draft) => api.initiatives().create("t", draft).await,
            }
        })
        .await
        .unwrap();

    assert_eq!(saved.data.title, "Walkathon 2");
    assert_eq!(mock.last_request().form_names(), vec!["title"]);
    assert!(!modal.is_open());
}
