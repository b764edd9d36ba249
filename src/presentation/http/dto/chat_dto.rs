use serde::Deserialize;

use crate::application::ports::chat_model::ChatMessage;

#[derive(Debug, Deserialize)]
pub struct ChatRequestDto {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}
