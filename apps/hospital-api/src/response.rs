//! Envelopes de resposta de sucesso

use serde::Serialize;

use common_db::models::{Page, Pagination};

/// `{ success: true, data, pagination?, message? }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data,
            pagination: None,
            message: None,
        }
    }

    pub fn page(page: Page<T>) -> ApiResponse<Vec<T>> {
        ApiResponse {
            success: true,
            data: page.items,
            pagination: Some(page.pagination),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Resposta sem corpo de dados
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
