use super::content::ContentApi;
use huraymila_shared::models::SuccessStory;

pub use super::content::{ContentDraft as SuccessStoryDraft, ContentUpdate as SuccessStoryUpdate};

pub type SuccessStoryApi<'a, C> = ContentApi<'a, C, SuccessStory>;
