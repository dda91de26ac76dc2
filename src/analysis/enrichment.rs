use crate::analysis::scanner::truncate_text;
use crate::error::EnrichmentError;
use crate::models::file_report::{CodeQuality, Enrichment, EnrichmentStatus};
use log::warn;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

pub const DEFAULT_MAX_LENGTH: usize = 1000;
const COMPLEX_FILE_LINES: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f64,
}

/// Optional ML classifier. The analyzer truncates text to `max_length`
/// characters before calling it.
pub trait EnrichmentProvider: Send + Sync {
    fn classify(&self, text: &str, max_length: usize) -> Result<Classification, EnrichmentError>;
}

static TEST_FUNCTION: OnceLock<Regex> = OnceLock::new();

fn test_function() -> &'static Regex {
    TEST_FUNCTION.get_or_init(|| {
        Regex::new(r"\bdef\s+test_|\bfn\s+test_|#\[test\]|@Test\b").expect("valid regex")
    })
}

/// Runs `provider` on a blocking worker under `timeout`. Absence, timeout and
/// provider errors all degrade to a status on the returned value; nothing is
/// retried.
pub async fn enrich(
    provider: Option<Arc<dyn EnrichmentProvider>>,
    source: &str,
    max_length: usize,
    timeout: Duration,
) -> Enrichment {
    let Some(provider) = provider else {
        return Enrichment::not_available();
    };

    let text = truncate_text(source, max_length);
    let task = tokio::task::spawn_blocking(move || provider.classify(&text, max_length));

    let outcome = match tokio::time::timeout(timeout, task).await {
        Err(_) => Err(EnrichmentError::Timeout(timeout.as_millis() as u64)),
        Ok(Err(join_error)) => Err(EnrichmentError::Failed(join_error.to_string())),
        Ok(Ok(result)) => result,
    };

    match outcome {
        Ok(classification) => analyzed(classification, source),
        Err(e) => {
            warn!("enrichment skipped: {e}");
            Enrichment::failed(e.to_string())
        }
    }
}

fn analyzed(classification: Classification, source: &str) -> Enrichment {
    let code_quality = if source.lines().count() > COMPLEX_FILE_LINES {
        CodeQuality::Complex
    } else if test_function().is_match(source) {
        CodeQuality::Good
    } else {
        CodeQuality::Moderate
    };

    Enrichment {
        status: EnrichmentStatus::Analyzed,
        summary: format!(
            "Classified as '{}' with confidence {:.2}",
            classification.label, classification.confidence
        ),
        label: Some(classification.label),
        confidence: Some(classification.confidence.clamp(0.0, 1.0)),
        code_quality,
        recommendations: vec![
            "Consider implementing proper error handling".to_string(),
            "Add comprehensive documentation".to_string(),
            "Implement unit tests for critical functions".to_string(),
            "Review code for security best practices".to_string(),
        ],
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        seen: Mutex<Vec<String>>,
    }

    impl EnrichmentProvider for Recording {
        fn classify(&self, text: &str, _max_length: usize) -> Result<Classification, EnrichmentError> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(Classification {
                label: "LABEL_0".to_string(),
                confidence: 0.75,
            })
        }
    }

    struct Broken;

    impl EnrichmentProvider for Broken {
        fn classify(&self, _text: &str, _max_length: usize) -> Result<Classification, EnrichmentError> {
            Err(EnrichmentError::Failed("model not loaded".to_string()))
        }
    }

    struct Slow;

    impl EnrichmentProvider for Slow {
        fn classify(&self, _text: &str, _max_length: usize) -> Result<Classification, EnrichmentError> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(Classification {
                label: "late".to_string(),
                confidence: 1.0,
            })
        }
    }

    #[tokio::test]
    async fn missing_provider_is_not_available() {
        let enrichment = enrich(None, "x = 1", DEFAULT_MAX_LENGTH, Duration::from_secs(1)).await;
        assert_eq!(enrichment.status, EnrichmentStatus::NotAvailable);
        assert_eq!(enrichment.code_quality, CodeQuality::Unknown);
    }

    #[tokio::test]
    async fn text_is_truncated_before_classification() {
        let provider = Arc::new(Recording {
            seen: Mutex::new(Vec::new()),
        });
        let source = "a".repeat(1500);
        let enrichment = enrich(
            Some(provider.clone()),
            &source,
            DEFAULT_MAX_LENGTH,
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(enrichment.status, EnrichmentStatus::Analyzed);
        assert_eq!(enrichment.label.as_deref(), Some("LABEL_0"));
        assert_eq!(enrichment.code_quality, CodeQuality::Moderate);
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].len(), DEFAULT_MAX_LENGTH + 3);
        assert!(seen[0].ends_with("..."));
    }

    #[tokio::test]
    async fn provider_error_becomes_error_status() {
        let enrichment = enrich(Some(Arc::new(Broken)), "x", 100, Duration::from_secs(1)).await;
        assert_eq!(enrichment.status, EnrichmentStatus::Error);
        assert!(enrichment.error.unwrap().contains("model not loaded"));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let enrichment = enrich(Some(Arc::new(Slow)), "x", 100, Duration::from_millis(20)).await;
        assert_eq!(enrichment.status, EnrichmentStatus::Error);
        assert!(enrichment.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_code_is_rated_good() {
        let provider = Arc::new(Recording {
            seen: Mutex::new(Vec::new()),
        });
        let enrichment = enrich(
            Some(provider),
            "def test_total():\n    assert total() == 3\n",
            DEFAULT_MAX_LENGTH,
            Duration::from_secs(5),
        )
        .await;
        assert_eq!(enrichment.code_quality, CodeQuality::Good);
    }
}
