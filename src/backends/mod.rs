//! Remote chat backends the character can talk through.

pub mod anthropic;
pub mod openai_compatible;

use reqwest::Client;

use crate::error::AssistantError;

pub(crate) fn http_client(timeout_seconds: Option<u64>) -> Result<Client, AssistantError> {
    let mut builder = Client::builder();
    if let Some(sec) = timeout_seconds {
        builder = builder.timeout(std::time::Duration::from_secs(sec));
    }
    Ok(builder.build()?)
}

/// Reads the body of a failed response and maps its status onto an error.
pub(crate) async fn status_error(response: reqwest::Response) -> AssistantError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    AssistantError::from_status(status, body)
}
