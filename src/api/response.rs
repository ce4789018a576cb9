//! Response envelope shared by every endpoint
//!
//! `{ success: bool, message?: string, data?: object }` — the shape the
//! mobile client was built against.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl ApiResponse<serde_json::Value> {
    /// Successful response carrying only a message
    pub fn message(message: &str) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.to_string()),
            data: None,
        }
    }

    /// Failed response carrying only a message
    pub fn failure(message: &str) -> Self {
        ApiResponse {
            success: false,
            message: Some(message.to_string()),
            data: None,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response with a message and payload
    pub fn with_data(message: &str, data: T) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
        }
    }

    /// Successful response with a payload and no message
    pub fn data_only(data: T) -> Self {
        ApiResponse {
            success: true,
            message: None,
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_omits_data_key() {
        let json = serde_json::to_value(ApiResponse::message("Logout exitoso")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Logout exitoso");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn failure_sets_success_false() {
        let json = serde_json::to_value(ApiResponse::failure("Credenciales inválidas")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Credenciales inválidas");
    }

    #[test]
    fn data_only_omits_message_key() {
        let json =
            serde_json::to_value(ApiResponse::data_only(serde_json::json!({ "n": 1 }))).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("message").is_none());
        assert_eq!(json["data"]["n"], 1);
    }
}
