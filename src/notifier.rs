//! Best-effort webhook notifications for newly seen articles.
//!
//! Every article becomes one independent JSON `POST` to the caller-supplied
//! URL. A batch is dispatched concurrently and awaited as a whole; a failing
//! delivery is logged and never cancels its siblings nor fails the caller.

use crate::errors::NotifyError;
use crate::models::Article;
use futures::future::join_all;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Delivery counts for one batch, used for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliverySummary {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Posts articles to webhooks.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
}

/// Accept only absolute `http`/`https` URLs.
pub fn validate_webhook(raw: &str) -> Result<Url, NotifyError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(NotifyError::UnsupportedScheme(scheme.to_owned())),
    }
}

impl Notifier {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Send a single article to `webhook`.
    #[instrument(level = "debug", skip_all, fields(link = %article.link))]
    pub async fn notify(&self, webhook: &Url, article: &Article) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(webhook.clone())
            .json(article)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::HttpStatus(status.as_u16()));
        }
        debug!(status = status.as_u16(), "Webhook accepted article");
        Ok(())
    }

    /// Send every article in `articles` to `webhook`, concurrently.
    ///
    /// An invalid URL sends nothing. Failures are only logged.
    #[instrument(level = "info", skip_all, fields(webhook = %webhook, count = articles.len()))]
    pub async fn notify_all(&self, webhook: &str, articles: &[Article]) -> DeliverySummary {
        let url = match validate_webhook(webhook) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Invalid webhook; skipping notifications");
                return DeliverySummary::default();
            }
        };

        let results = join_all(articles.iter().map(|article| {
            let url = &url;
            async move {
                let outcome = self.notify(url, article).await;
                if let Err(ref e) = outcome {
                    warn!(error = %e, link = %article.link, "Webhook delivery failed");
                }
                outcome
            }
        }))
        .await;

        let delivered = results.iter().filter(|r| r.is_ok()).count();
        let summary = DeliverySummary {
            attempted: results.len(),
            delivered,
            failed: results.len() - delivered,
        };
        info!(
            attempted = summary.attempted,
            delivered = summary.delivered,
            failed = summary.failed,
            "Webhook batch settled"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn articles() -> Vec<Article> {
        vec![
            Article::new("One", "http://x/1"),
            Article::new("Two", "http://x/2"),
            Article::new("Three", "http://x/3"),
        ]
    }

    #[test]
    fn test_validate_webhook() {
        assert!(validate_webhook("https://hooks.example.com/in").is_ok());
        assert!(validate_webhook(" http://127.0.0.1:9000/hook ").is_ok());
        assert!(matches!(
            validate_webhook("not a url"),
            Err(NotifyError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_webhook("/relative/hook"),
            Err(NotifyError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_webhook("ftp://example.com/hook"),
            Err(NotifyError::UnsupportedScheme(_))
        ));
    }

    #[tokio::test]
    async fn test_one_post_per_article() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200))
            .expect(3)
            .mount(&mock_server)
            .await;

        let notifier = Notifier::new(reqwest::Client::new());
        let webhook = format!("{}/hook", mock_server.uri());
        let summary = notifier.notify_all(&webhook, &articles()).await;

        assert_eq!(
            summary,
            DeliverySummary {
                attempted: 3,
                delivered: 3,
                failed: 0
            }
        );

        let mut received: Vec<Article> = mock_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect();
        received.sort_by(|a, b| a.link.cmp(&b.link));
        assert_eq!(received, articles());
    }

    #[tokio::test]
    async fn test_invalid_webhook_sends_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let notifier = Notifier::new(reqwest::Client::new());
        let summary = notifier.notify_all("not-a-url", &articles()).await;
        assert_eq!(summary, DeliverySummary::default());
    }

    #[tokio::test]
    async fn test_failures_do_not_cancel_siblings() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&mock_server)
            .await;

        let notifier = Notifier::new(reqwest::Client::new());
        let summary = notifier
            .notify_all(&format!("{}/hook", mock_server.uri()), &articles())
            .await;
        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.failed, 3);
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_swallowed() {
        let notifier = Notifier::new(reqwest::Client::new());
        // Port 9 (discard) on localhost is closed in test environments.
        let summary = notifier
            .notify_all("http://127.0.0.1:9/hook", &articles()[..1])
            .await;
        assert_eq!(summary.failed, 1);
    }
}
