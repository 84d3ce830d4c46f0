use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageChannel {
    WhatsappText,
    WhatsappTemplate,
}

impl Display for MessageChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channel = match self {
            MessageChannel::WhatsappText => "whatsapp_text",
            MessageChannel::WhatsappTemplate => "whatsapp_template",
        };
        write!(f, "{}", channel)
    }
}

impl FromStr for MessageChannel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "whatsapp_text" => Ok(MessageChannel::WhatsappText),
            "whatsapp_template" => Ok(MessageChannel::WhatsappTemplate),
            other => Err(format!("Unsupported message channel: {}", other)),
        }
    }
}
