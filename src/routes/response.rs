//! JSON envelope shared by all `/api` responses.
//!
//! Estimated data is flagged through `source` and `message` instead of an
//! error status, so the UI can show a "using estimated data" notice.

use serde::Serialize;

use crate::Sourced;

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Database,
    Estimated,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    // ---
    pub success: bool,
    pub data: T,
    pub source: DataSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> From<Sourced<T>> for ApiResponse<T> {
    fn from(sourced: Sourced<T>) -> Self {
        // ---
        match sourced {
            Sourced::Store(data) => ApiResponse {
                success: true,
                data,
                source: DataSource::Database,
                message: None,
            },
            Sourced::Fallback { value, reason } => ApiResponse {
                success: true,
                data: value,
                source: DataSource::Estimated,
                message: Some(format!("Using estimated mock data ({})", reason.describe())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::service::FallbackReason;

    #[test]
    fn test_fallback_is_flagged() {
        // ---
        let resp: ApiResponse<u32> = Sourced::Fallback {
            value: 7,
            reason: FallbackReason::NotConfigured,
        }
        .into();

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 7);
        assert_eq!(json["source"], "estimated");
        assert!(json["message"].as_str().unwrap().contains("mock data"));
    }

    #[test]
    fn test_store_data_has_no_message() {
        // ---
        let resp: ApiResponse<&str> = Sourced::Store("ok").into();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["source"], "database");
        assert!(json.get("message").is_none());
    }
}
