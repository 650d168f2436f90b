//! Wire types shared by the relay client and server.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayRequest {
    /// Persona instruction text for this turn
    #[serde(rename = "systemInstruction", default)]
    pub system_instruction: Option<String>,
    /// The user's message text
    #[serde(default)]
    pub message: Option<String>,
    /// Optional base64-encoded JPEG attached to the message
    #[serde(rename = "imageBase64", skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

impl RelayRequest {
    /// Builds the upstream Gemini turn list: an instruction turn, a message
    /// turn, and an inline-image turn, each included only when present.
    pub fn to_contents(&self) -> Vec<Value> {
        let mut contents = Vec::new();

        if let Some(system) = self.system_instruction.as_deref().filter(|s| !s.is_empty()) {
            contents.push(json!({
                "role": "user",
                "parts": [{"text": system}]
            }));
        }

        if let Some(message) = self.message.as_deref().filter(|m| !m.is_empty()) {
            contents.push(json!({
                "role": "user",
                "parts": [{"text": message}]
            }));
        }

        if let Some(image) = self.image_base64.as_deref() {
            contents.push(json!({
                "role": "user",
                "parts": [{
                    "inlineData": {
                        "data": image,
                        "mimeType": "image/jpeg"
                    }
                }]
            }));
        }

        contents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_include_instruction_message_and_image_turns() {
        let req = RelayRequest {
            system_instruction: Some("Be a troll.".to_string()),
            message: Some("hi".to_string()),
            image_base64: Some("aGVsbG8=".to_string()),
        };
        let contents = req.to_contents();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["parts"][0]["text"], "Be a troll.");
        assert_eq!(contents[1]["parts"][0]["text"], "hi");
        assert_eq!(contents[2]["parts"][0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(contents[2]["parts"][0]["inlineData"]["data"], "aGVsbG8=");
        for turn in &contents {
            assert_eq!(turn["role"], "user");
        }
    }

    #[test]
    fn absent_fields_are_skipped() {
        let req = RelayRequest {
            system_instruction: None,
            message: Some("just text".to_string()),
            image_base64: None,
        };
        assert_eq!(req.to_contents().len(), 1);

        let empty = RelayRequest {
            system_instruction: Some(String::new()),
            message: None,
            image_base64: None,
        };
        assert!(empty.to_contents().is_empty());
    }

    #[test]
    fn request_uses_camel_case_on_the_wire() {
        let req = RelayRequest {
            system_instruction: Some("sys".to_string()),
            message: Some("msg".to_string()),
            image_base64: Some("data".to_string()),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["systemInstruction"], "sys");
        assert_eq!(value["imageBase64"], "data");
    }
}
