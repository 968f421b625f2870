//! Replies from the hosted chat assistant
//!
//! The assistant either answers in free text or asks the app to run a
//! callback, written as `function_name||arg1||...||argN`.

use serde::{Deserialize, Serialize};

use crate::validation::validate_location;

pub const CALLBACK_SEPARATOR: &str = "||";

/// Callbacks the assistant may request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "function", rename_all = "snake_case")]
pub enum CallbackFunction {
    /// Open the map at `location` so the user can draw fields
    CreateAreasToMonitor { location: String },
}

impl CallbackFunction {
    pub fn name(&self) -> &'static str {
        match self {
            CallbackFunction::CreateAreasToMonitor { .. } => "create_areas_to_monitor",
        }
    }

    fn from_parts(name: &str, args: &[&str]) -> Option<Self> {
        match (name, args) {
            ("create_areas_to_monitor", [location]) if validate_location(location).is_ok() => {
                Some(CallbackFunction::CreateAreasToMonitor {
                    location: (*location).to_string(),
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssistantReply {
    Message { text: String },
    Callback { callback: CallbackFunction },
}

impl AssistantReply {
    pub fn parse(text: &str) -> Self {
        if text.contains(CALLBACK_SEPARATOR) {
            let parts: Vec<&str> = text.split(CALLBACK_SEPARATOR).map(str::trim).collect();
            if let Some(callback) = CallbackFunction::from_parts(parts[0], &parts[1..]) {
                return AssistantReply::Callback { callback };
            }
        }
        AssistantReply::Message {
            text: text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_callback() {
        let reply = AssistantReply::parse("create_areas_to_monitor|| Poznan, Poland ");
        assert_eq!(
            reply,
            AssistantReply::Callback {
                callback: CallbackFunction::CreateAreasToMonitor {
                    location: "Poznan, Poland".to_string()
                }
            }
        );
    }

    #[test]
    fn test_parse_plain_message() {
        let text = "Irrigate early in the morning to reduce evaporation.";
        assert_eq!(
            AssistantReply::parse(text),
            AssistantReply::Message {
                text: text.to_string()
            }
        );
    }

    #[test]
    fn test_unknown_callback_or_wrong_arity_is_message() {
        assert!(matches!(
            AssistantReply::parse("delete_everything||now"),
            AssistantReply::Message { .. }
        ));
        assert!(matches!(
            AssistantReply::parse("create_areas_to_monitor||Poznan||extra"),
            AssistantReply::Message { .. }
        ));
        assert!(matches!(
            AssistantReply::parse("create_areas_to_monitor"),
            AssistantReply::Message { .. }
        ));
    }

    #[test]
    fn test_blank_or_oversized_location_is_message() {
        let blank = "create_areas_to_monitor||   ";
        assert_eq!(
            AssistantReply::parse(blank),
            AssistantReply::Message {
                text: blank.to_string()
            }
        );

        let long = format!("create_areas_to_monitor||{}", "a".repeat(201));
        assert!(matches!(
            AssistantReply::parse(&long),
            AssistantReply::Message { .. }
        ));
    }

    #[test]
    fn test_callback_serializes_tagged() {
        let reply = AssistantReply::parse("create_areas_to_monitor||Lyon");
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["kind"], "callback");
        assert_eq!(json["callback"]["function"], "create_areas_to_monitor");
        assert_eq!(json["callback"]["location"], "Lyon");
    }
}
