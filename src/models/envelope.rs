use serde::Deserialize;

/// Generic response envelope. The backend answers in two dialects —
/// `{success, message, data, data_list}` from the newer endpoints and
/// `{ok, error}` from the older ones — and both must decode here.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    pub data: Option<T>,
    pub data_list: Option<Vec<T>>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.success == Some(true) || self.ok == Some(true)
    }

    /// Failure text, `error` taking priority over `message`.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn into_list(self) -> Vec<T> {
        self.data_list.unwrap_or_default()
    }
}
