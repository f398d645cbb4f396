use super::types::ChatMessage;
use crate::models::PriceTable;

pub const USER_PROMPT_PREFIX: &str = "Analyze the following stock data: ";

/// User message carrying the whole price table as text
pub fn format_user_prompt(table: &PriceTable) -> String {
    format!("{}{}", USER_PROMPT_PREFIX, table.to_text_table())
}

/// System instruction followed by the table prompt
pub fn build_messages(system_prompt: &str, table: &PriceTable) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(format_user_prompt(table)),
    ]
}
