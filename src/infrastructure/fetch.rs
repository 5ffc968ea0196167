// ============================================================
// URL FETCH
// ============================================================
// Download a CSV body for URL imports. The only async boundary
// besides storage; it completes or fails before the engine runs.

use url::Url;

use crate::domain::error::{AppError, Result};

/// Downloads the body at `source_url`, capped at `max_bytes`.
pub async fn fetch_csv(source_url: &str, max_bytes: usize) -> Result<String> {
    let parsed = Url::parse(source_url)
        .map_err(|e| AppError::ValidationError(format!("Invalid dataset URL: {e}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(AppError::ValidationError(format!(
            "Unsupported URL scheme: {}",
            parsed.scheme()
        )));
    }

    let response = reqwest::get(parsed)
        .await
        .map_err(|e| AppError::FetchError(format!("Failed to fetch dataset URL: {e}")))?;

    if !response.status().is_success() {
        return Err(AppError::FetchError(format!(
            "Dataset URL returned HTTP {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::FetchError(format!("Failed to read dataset body: {e}")))?;

    if bytes.len() > max_bytes {
        return Err(AppError::FetchError(format!(
            "Dataset body too large: {} bytes (limit {})",
            bytes.len(),
            max_bytes
        )));
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_invalid_url() {
        let err = fetch_csv("not a url", 1024).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_rejects_non_http_scheme() {
        let err = fetch_csv("file:///etc/passwd", 1024).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
