// Single token source fetch

use reqwest::Client;

use super::types::{Credential, SourceFailure, TokenError, TokenResponse};

/// Classify a transport error the same way for logs and error kinds
pub(crate) fn error_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection_failed"
    } else if e.is_request() {
        "request_error"
    } else if e.is_body() {
        "body_error"
    } else if e.is_decode() {
        "decode_error"
    } else {
        "unknown"
    }
}

fn transport_failure(url: &str, e: reqwest::Error) -> TokenError {
    let kind = if e.is_timeout() {
        SourceFailure::Timeout
    } else {
        SourceFailure::Network(format!("{} ({})", e, error_kind(&e)))
    };

    TokenError::SourceFetchFailed {
        url: url.to_string(),
        kind,
    }
}

/// Fetch a credential bundle from one token source
///
/// The client carries the fetch timeout. Any non-2xx status or a body
/// without a complete bundle counts as a failure of this source.
pub async fn fetch_from_source(client: &Client, url: &str) -> Result<Credential, TokenError> {
    tracing::debug!(url = %url, "Requesting token from source");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| transport_failure(url, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TokenError::SourceFetchFailed {
            url: url.to_string(),
            kind: SourceFailure::Status {
                status: status.as_u16(),
                body,
            },
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| transport_failure(url, e))?;

    let data: TokenResponse =
        serde_json::from_str(&body).map_err(|e| TokenError::SourceFetchFailed {
            url: url.to_string(),
            kind: SourceFailure::Malformed(e.to_string()),
        })?;

    data.into_credential()
        .map_err(|kind| TokenError::SourceFetchFailed {
            url: url.to_string(),
            kind,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_complete_bundle() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token":"tok-1","deviceid":"dev-1","androidid":"and-1"}"#)
            .create_async()
            .await;

        let url = format!("{}/token", server.url());
        let credential = fetch_from_source(&client(), &url).await.unwrap();

        assert_eq!(credential.token, "tok-1");
        assert_eq!(credential.device_id, "dev-1");
        assert_eq!(credential.android_id, "and-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/token")
            .with_status(503)
            .with_body("down")
            .create_async()
            .await;

        let url = format!("{}/token", server.url());
        let err = fetch_from_source(&client(), &url).await.unwrap_err();

        match err {
            TokenError::SourceFetchFailed {
                kind: SourceFailure::Status { status, body },
                ..
            } => {
                assert_eq!(status, 503);
                assert_eq!(body, "down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_partial_bundle_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/token")
            .with_status(200)
            .with_body(r#"{"token":"tok-1"}"#)
            .create_async()
            .await;

        let url = format!("{}/token", server.url());
        let err = fetch_from_source(&client(), &url).await.unwrap_err();
        assert!(matches!(
            err,
            TokenError::SourceFetchFailed {
                kind: SourceFailure::Malformed(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_header_unsafe_token_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/token")
            .with_status(200)
            .with_body(r#"{"token":"tok\u0001x","deviceid":"dev-1","androidid":"and-1"}"#)
            .create_async()
            .await;

        let url = format!("{}/token", server.url());
        let err = fetch_from_source(&client(), &url).await.unwrap_err();
        assert!(matches!(
            err,
            TokenError::SourceFetchFailed {
                kind: SourceFailure::Malformed(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_non_json_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/token")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let url = format!("{}/token", server.url());
        let err = fetch_from_source(&client(), &url).await.unwrap_err();
        assert!(matches!(
            err,
            TokenError::SourceFetchFailed {
                kind: SourceFailure::Malformed(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        // Accept connections but never answer
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _silent = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let url = format!("http://{}/token", addr);
        let err = fetch_from_source(&client, &url).await.unwrap_err();

        assert!(matches!(
            err,
            TokenError::SourceFetchFailed {
                kind: SourceFailure::Timeout,
                ..
            }
        ));
    }
}
