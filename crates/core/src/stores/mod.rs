pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;

use crate::models::{clean_tags, CreateSavedResponse, SavedResponse};
use chrono::Utc;
use uuid::Uuid;

pub(crate) fn new_saved_response(request: CreateSavedResponse) -> SavedResponse {
    SavedResponse {
        id: Uuid::new_v4().to_string(),
        question: request.question,
        answer: request.answer,
        file_name: request.file_name,
        saved_at: Utc::now(),
        tags: clean_tags(request.tags.unwrap_or_default()),
        user_id: None,
    }
}

pub(crate) fn newest_first(responses: &mut [SavedResponse]) {
    responses.sort_by(|left, right| right.saved_at.cmp(&left.saved_at));
}
