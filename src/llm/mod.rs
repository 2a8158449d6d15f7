//! LLM access layer
//!
//! Picks a generation backend once at startup (Gemini, or the offline keyword
//! responder) and exposes a single `generate` call that never fails.

pub mod fallback;
#[cfg(feature = "gemini")]
pub mod gemini;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const PROBE_PROMPT: &str = "Hello, respond with just 'OK'";

/// Simulated processing time of the offline responder
const FALLBACK_DELAY: Duration = Duration::from_secs(1);

const EMPTY_RESPONSE_REPLY: &str =
    "I apologize, I couldn't generate a response. Please try again.";
const REMOTE_ERROR_REPLY: &str =
    "I apologize, I'm experiencing technical difficulties. Please try again.";

/// A blocking "generate content from prompt" call against a remote model.
///
/// Implementations are shared across concurrent requests and are always
/// invoked from the blocking thread pool.
pub trait ContentGenerator: Send + Sync + 'static {
    /// Returns `Ok(None)` when the model produced no text.
    fn generate_content(&self, prompt: &str) -> anyhow::Result<Option<String>>;
}

/// Which strategy answers prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BackendKind {
    #[serde(rename = "gemini")]
    Remote,
    #[serde(rename = "mock")]
    Fallback,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Remote => "gemini",
            BackendKind::Fallback => "mock",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic snapshot of the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LlmStatus {
    pub backend: BackendKind,
    pub model: Option<String>,
    pub ready: bool,
    pub remote_library_available: bool,
}

enum Backend {
    Remote {
        session: Arc<dyn ContentGenerator>,
        model: String,
    },
    Fallback,
}

/// Process-wide LLM engine. Backend selection is fixed at construction.
pub struct LlmEngine {
    backend: Backend,
}

impl LlmEngine {
    /// Build the engine from `GEMINI_API_KEY`.
    ///
    /// Performs a blocking connectivity probe, so async callers should run it
    /// via `spawn_blocking`.
    pub fn from_env() -> Self {
        tracing::info!("Initializing LLM engine (Gemini API only)");
        Self::from_api_key(std::env::var(API_KEY_ENV).ok())
    }

    /// Build the engine from an optional API key; missing or empty keys select
    /// the offline responder.
    pub fn from_api_key(api_key: Option<String>) -> Self {
        let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
            tracing::error!("{} not found in environment variables", API_KEY_ENV);
            return Self::fallback();
        };

        tracing::info!("API key found (length: {} chars)", api_key.len());
        Self::connect_gemini(api_key)
    }

    #[cfg(feature = "gemini")]
    fn connect_gemini(api_key: String) -> Self {
        tracing::info!("Initializing {} model...", gemini::GEMINI_MODEL);

        match gemini::GeminiSession::new(api_key, gemini::GEMINI_MODEL) {
            Ok(session) => Self::probe(Arc::new(session), gemini::GEMINI_MODEL),
            Err(e) => {
                tracing::error!("Failed to build Gemini client: {:#}", e);
                Self::fallback()
            }
        }
    }

    #[cfg(not(feature = "gemini"))]
    fn connect_gemini(_api_key: String) -> Self {
        tracing::error!("Gemini support not compiled in, rebuild with the `gemini` feature");
        Self::fallback()
    }

    /// Send a trivial prompt through `session` and commit to it only if it
    /// answers with non-empty text.
    pub fn probe(session: Arc<dyn ContentGenerator>, model: &str) -> Self {
        tracing::info!("Testing Gemini API connection...");

        match session.generate_content(PROBE_PROMPT) {
            Ok(Some(text)) if !text.trim().is_empty() => {
                tracing::info!("Gemini API test successful! Response: '{}'", text.trim());
                tracing::info!("LLM engine ready with model {}", model);
                Self {
                    backend: Backend::Remote {
                        session,
                        model: model.to_string(),
                    },
                }
            }
            Ok(_) => {
                tracing::error!("Gemini API test failed - empty response");
                Self::fallback()
            }
            Err(e) => {
                tracing::error!("Failed to initialize Gemini API: {:#}", e);
                Self::fallback()
            }
        }
    }

    /// Engine permanently bound to the offline responder
    pub fn fallback() -> Self {
        tracing::warn!("Using mock responses as fallback");
        tracing::info!("To use Gemini: set {}=your_key and restart", API_KEY_ENV);
        Self {
            backend: Backend::Fallback,
        }
    }

    pub fn backend(&self) -> BackendKind {
        match self.backend {
            Backend::Remote { .. } => BackendKind::Remote,
            Backend::Fallback => BackendKind::Fallback,
        }
    }

    pub fn model(&self) -> Option<&str> {
        match &self.backend {
            Backend::Remote { model, .. } => Some(model),
            Backend::Fallback => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.backend, Backend::Remote { .. })
    }

    pub fn status(&self) -> LlmStatus {
        LlmStatus {
            backend: self.backend(),
            model: self.model().map(str::to_string),
            ready: self.is_ready(),
            remote_library_available: cfg!(feature = "gemini"),
        }
    }

    /// Generate a reply. Failures are folded into apology text.
    pub async fn generate(&self, prompt: &str) -> String {
        tracing::info!("Generating response with backend: {}", self.backend());

        match &self.backend {
            Backend::Remote { session, .. } => {
                Self::generate_remote(Arc::clone(session), prompt.to_string()).await
            }
            Backend::Fallback => {
                tracing::debug!("Using mock response generator");
                tokio::time::sleep(FALLBACK_DELAY).await;
                fallback::respond(prompt)
            }
        }
    }

    async fn generate_remote(session: Arc<dyn ContentGenerator>, prompt: String) -> String {
        tracing::info!("Sending request to Gemini API (prompt: {} chars)", prompt.len());

        let result =
            tokio::task::spawn_blocking(move || session.generate_content(&prompt)).await;

        match result {
            Ok(Ok(Some(text))) if !text.trim().is_empty() => {
                let text = text.trim().to_string();
                tracing::info!("Gemini API response received ({} chars)", text.len());
                tracing::debug!("Response preview: {}", preview(&text, 100));
                text
            }
            Ok(Ok(_)) => {
                tracing::error!("Gemini API returned empty response");
                EMPTY_RESPONSE_REPLY.to_string()
            }
            Ok(Err(e)) => {
                tracing::error!("Gemini generation error: {:#}", e);
                REMOTE_ERROR_REPLY.to_string()
            }
            Err(e) => {
                tracing::error!("Gemini worker task failed: {}", e);
                REMOTE_ERROR_REPLY.to_string()
            }
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Session handle backed by a closure
    struct FnGenerator<F>(F);

    impl<F> ContentGenerator for FnGenerator<F>
    where
        F: Fn(&str) -> anyhow::Result<Option<String>> + Send + Sync + 'static,
    {
        fn generate_content(&self, prompt: &str) -> anyhow::Result<Option<String>> {
            (self.0)(prompt)
        }
    }

    fn session<F>(f: F) -> Arc<dyn ContentGenerator>
    where
        F: Fn(&str) -> anyhow::Result<Option<String>> + Send + Sync + 'static,
    {
        Arc::new(FnGenerator(f))
    }

    fn fallback_status() -> LlmStatus {
        LlmStatus {
            backend: BackendKind::Fallback,
            model: None,
            ready: false,
            remote_library_available: cfg!(feature = "gemini"),
        }
    }

    /// Engine whose probe succeeds and whose later calls go to `f`
    fn remote_engine<F>(f: F) -> LlmEngine
    where
        F: Fn(&str) -> anyhow::Result<Option<String>> + Send + Sync + 'static,
    {
        let engine = LlmEngine::probe(
            session(move |prompt| {
                if prompt == PROBE_PROMPT {
                    Ok(Some("OK".to_string()))
                } else {
                    f(prompt)
                }
            }),
            "test-model",
        );
        assert!(engine.is_ready());
        engine
    }

    #[test]
    fn test_missing_key_selects_fallback() {
        let engine = LlmEngine::from_api_key(None);
        assert_eq!(engine.backend(), BackendKind::Fallback);
        assert!(!engine.is_ready());
        assert_eq!(engine.status(), fallback_status());

        let empty = LlmEngine::from_api_key(Some(String::new()));
        assert_eq!(empty.status(), fallback_status());
    }

    #[test]
    fn test_probe_error_selects_fallback() {
        let engine = LlmEngine::probe(
            session(|_| Err(anyhow::anyhow!("connection refused"))),
            "test-model",
        );
        assert_eq!(engine.status(), fallback_status());
    }

    #[test]
    fn test_probe_empty_response_selects_fallback() {
        let none = LlmEngine::probe(session(|_| Ok(None)), "test-model");
        assert_eq!(none.status(), fallback_status());

        let blank = LlmEngine::probe(session(|_| Ok(Some("  \n".to_string()))), "test-model");
        assert_eq!(blank.status(), fallback_status());
    }

    #[test]
    fn test_probe_success_selects_remote() {
        let engine = LlmEngine::probe(session(|_| Ok(Some(" OK ".to_string()))), "test-model");
        assert_eq!(
            engine.status(),
            LlmStatus {
                backend: BackendKind::Remote,
                model: Some("test-model".to_string()),
                ready: true,
                remote_library_available: cfg!(feature = "gemini"),
            }
        );
    }

    #[test]
    fn test_status_serialization() {
        let value = serde_json::to_value(fallback_status()).unwrap();
        assert_eq!(value["backend"], "mock");
        assert!(value["model"].is_null());
        assert_eq!(value["ready"], false);
    }

    #[tokio::test]
    async fn test_remote_generate_trims_text() {
        let engine = remote_engine(|prompt| Ok(Some(format!("  echo: {}\n", prompt))));
        assert_eq!(engine.generate("question").await, "echo: question");
    }

    #[tokio::test]
    async fn test_remote_failures_become_apologies() {
        let empty = remote_engine(|_| Ok(Some(String::new())));
        assert_eq!(empty.generate("q").await, EMPTY_RESPONSE_REPLY);

        let failing = remote_engine(|_| Err(anyhow::anyhow!("timeout")));
        assert_eq!(failing.generate("q").await, REMOTE_ERROR_REPLY);
        // a failed call does not demote the backend
        assert!(failing.is_ready());

        let blank = remote_engine(|_| Ok(Some(" \n\t ".to_string())));
        assert_eq!(blank.generate("q").await, EMPTY_RESPONSE_REPLY);

        let absent = remote_engine(|_| Ok(None));
        assert_eq!(absent.generate("q").await, EMPTY_RESPONSE_REPLY);

        let panicking = remote_engine(|_| panic!("worker blew up"));
        assert_eq!(panicking.generate("q").await, REMOTE_ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_remote_session_is_reused() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let engine = remote_engine(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Some("answer".to_string()))
        });

        engine.generate("one").await;
        engine.generate("two").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_generate() {
        let engine = LlmEngine::fallback();

        assert_eq!(
            engine.generate("What university did you attend?").await,
            fallback::respond("education")
        );
        assert_eq!(engine.generate("HELLO").await, engine.generate("hello").await);
        assert_eq!(
            engine.generate("same input").await,
            engine.generate("same input").await
        );
        assert!(engine.generate("").await.contains("demo mode"));
        assert!(engine.generate("\u{1b}[31m\u{0}").await.contains("demo mode"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_calls_run_concurrently() {
        let engine = LlmEngine::fallback();
        let start = tokio::time::Instant::now();

        let replies =
            futures::future::join_all((0..10).map(|_| engine.generate("Hello there"))).await;

        assert_eq!(replies.len(), 10);
        assert!(replies.iter().all(|r| r == &replies[0]));
        let elapsed = start.elapsed();
        assert!(elapsed >= FALLBACK_DELAY);
        assert!(elapsed < FALLBACK_DELAY * 2, "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_slow_remote_call_does_not_block_runtime() {
        let engine = Arc::new(remote_engine(|_| {
            std::thread::sleep(Duration::from_millis(300));
            Ok(Some("slow".to_string()))
        }));

        let slow = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.generate("q").await }
        });

        // let the spawned call start; an inline blocking call would hold this thread
        let start = std::time::Instant::now();
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        let elapsed = start.elapsed();
        assert!(elapsed < Duration::from_millis(150), "runtime stalled for {:?}", elapsed);

        assert_eq!(slow.await.unwrap(), "slow");
    }

    #[tokio::test]
    async fn test_slow_remote_calls_overlap() {
        let engine = remote_engine(|_| {
            std::thread::sleep(Duration::from_millis(300));
            Ok(Some("slow".to_string()))
        });

        let start = std::time::Instant::now();
        let replies = futures::future::join_all((0..4).map(|_| engine.generate("q"))).await;
        let elapsed = start.elapsed();

        assert!(replies.iter().all(|r| r == "slow"));
        assert!(elapsed < Duration::from_millis(600), "calls ran back to back: {:?}", elapsed);
    }
}
