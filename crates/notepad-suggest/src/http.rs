//! Suggestion lookups over HTTP.

use notepad_editor_core::{LookupError, SuggestionSource};
use serde_json::Value;
use smol_str::SmolStr;
use tracing::trace;

use crate::config::SuggestConfig;

/// Queries `GET {endpoint}/suggest?word=<prefix>`.
#[derive(Debug, Clone)]
pub struct HttpSuggestionSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSuggestionSource {
    pub fn new(config: &SuggestConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, &config.endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Self {
        Self {
            client,
            url: format!("{}/suggest", endpoint.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SuggestionSource for HttpSuggestionSource {
    async fn lookup(&self, word: &str) -> Result<Vec<SmolStr>, LookupError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("word", word)])
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }
        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        let suggestions = parse_suggestions(&body)?;
        trace!(target: "notepad::suggest", word, count = suggestions.len(), "lookup finished");
        Ok(suggestions)
    }
}

/// Read `{"suggestions": [...]}`. A missing or non-array field, and any
/// non-string entries, count as nothing; only a body that is not JSON at all
/// is an error.
pub fn parse_suggestions(body: &str) -> Result<Vec<SmolStr>, LookupError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;
    let suggestions = match value.get("suggestions") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(SmolStr::new)
            .collect(),
        _ => Vec::new(),
    };
    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn test_parse_keeps_order() {
        let items = parse_suggestions(r#"{"suggestions": ["cat", "car", "cap"]}"#).unwrap();
        assert_eq!(items, vec!["cat", "car", "cap"]);
    }

    #[test]
    fn test_parse_malformed_field_is_empty() {
        assert!(parse_suggestions("{}").unwrap().is_empty());
        assert!(parse_suggestions(r#"{"suggestions": "cat"}"#).unwrap().is_empty());
        assert_eq!(
            parse_suggestions(r#"{"suggestions": ["cat", 3, null]}"#).unwrap(),
            vec!["cat"]
        );
    }

    #[test]
    fn test_parse_non_json_is_decode_error() {
        let err = parse_suggestions("<html>").unwrap_err();
        assert!(matches!(err, LookupError::Decode(_)));
    }

    #[test]
    fn test_url_joins_endpoint() {
        let source = HttpSuggestionSource::with_client(reqwest::Client::new(), "http://x:8080/");
        assert_eq!(source.url(), "http://x:8080/suggest");
    }

    /// Serve one canned HTTP response and hand back the request line.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\n\
                 content-type: application/json\r\n\
                 content-length: {}\r\n\
                 connection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            let request = String::from_utf8_lossy(&request).to_string();
            request.lines().next().unwrap_or_default().to_string()
        });
        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn test_lookup_sends_word_query() {
        let (endpoint, server) =
            serve_once("200 OK", r#"{"suggestions": ["cat", "car"]}"#).await;
        let config = SuggestConfig {
            endpoint,
            ..SuggestConfig::default()
        };
        let source = HttpSuggestionSource::new(&config).unwrap();

        let items = source.lookup("ca").await.unwrap();

        assert_eq!(items, vec!["cat", "car"]);
        assert_eq!(server.await.unwrap(), "GET /suggest?word=ca HTTP/1.1");
    }

    #[tokio::test]
    async fn test_lookup_error_status() {
        let (endpoint, server) = serve_once("503 Service Unavailable", "{}").await;
        let source = HttpSuggestionSource::with_client(reqwest::Client::new(), &endpoint);

        let err = source.lookup("ca").await.unwrap_err();

        assert_eq!(err, LookupError::Status(503));
        server.await.unwrap();
    }
}
