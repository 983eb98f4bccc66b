//! Visibility analysis: one reasoning call, normalized into a report.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::background::BackgroundTasks;
use super::prompts::{ANALYSIS_SYSTEM, analysis_prompt};
use super::score_normalizer;
use crate::clients::email::visibility_result_email;
use crate::clients::{AnalyticsEntry, AnalyticsSink, Notifier, ReasoningError, ReasoningService};
use crate::domain::{Lang, VisibilityReport};

/// Produces visibility reports and dispatches their side effects.
///
/// [`evaluate`](Self::evaluate) never fails: a timed-out, failed or
/// unparseable reasoning call yields [`VisibilityReport::fallback`].
#[derive(Debug, Clone)]
pub struct VisibilityService {
    reasoning: Arc<dyn ReasoningService>,
    notifier: Arc<dyn Notifier>,
    analytics: Option<Arc<dyn AnalyticsSink>>,
    tasks: BackgroundTasks,
    site_url: String,
    timeout: Duration,
}

impl VisibilityService {
    /// Creates a new `VisibilityService`. `timeout` bounds the reasoning
    /// call; `analytics` is optional.
    #[must_use]
    pub fn new(
        reasoning: Arc<dyn ReasoningService>,
        notifier: Arc<dyn Notifier>,
        analytics: Option<Arc<dyn AnalyticsSink>>,
        tasks: BackgroundTasks,
        site_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            reasoning,
            notifier,
            analytics,
            tasks,
            site_url: site_url.into(),
            timeout,
        }
    }

    /// Analyzes `website`. Exactly one reasoning call, no retry.
    pub async fn evaluate(&self, website: &str) -> VisibilityReport {
        let prompt = analysis_prompt(website);
        let call = self.reasoning.complete_json(ANALYSIS_SYSTEM, &prompt);

        let answer = match tokio::time::timeout(self.timeout, call).await {
            Ok(answer) => answer,
            Err(_) => Err(ReasoningError::Timeout(self.timeout)),
        };

        match answer {
            Ok(text) => {
                let report = score_normalizer::normalize(&text);
                tracing::info!(website, status = %report.status, score = report.overall_score, "visibility analyzed");
                report
            }
            Err(e) => {
                tracing::warn!(website, error = %e, "reasoning call failed, using fallback report");
                VisibilityReport::fallback()
            }
        }
    }

    /// Analyzes `website` for the visitor at `email`, then emails the result
    /// and records it in analytics without waiting for either.
    pub async fn run_test(&self, website: &str, email: &str, lang: Lang) -> VisibilityReport {
        let report = self.evaluate(website).await;

        let message = visibility_result_email(&self.site_url, email, website, &report, lang);
        let notifier = Arc::clone(&self.notifier);
        self.tasks
            .spawn("visibility result email", async move { notifier.send(message).await });

        if let Some(analytics) = &self.analytics {
            let analytics = Arc::clone(analytics);
            let entry = AnalyticsEntry {
                website: website.to_string(),
                email: email.to_string(),
                status: report.status,
                overall_score: report.overall_score,
                timestamp: Utc::now(),
            };
            self.tasks
                .spawn("visibility analytics", async move { analytics.record(&entry).await });
        }

        report
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::clients::{AnalyticsError, LogNotifier, NotifyError, OutgoingEmail};
    use crate::domain::VisibilityStatus;

    #[derive(Debug)]
    struct ScriptedReasoning {
        answer: Result<String, ()>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl ScriptedReasoning {
        fn answering(text: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(text.to_string()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                answer: Err(()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn stalling() -> Arc<Self> {
            Arc::new(Self {
                answer: Ok("{}".to_string()),
                delay: Duration::from_secs(3600),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ReasoningService for ScriptedReasoning {
        async fn complete_json(&self, _system: &str, prompt: &str) -> Result<String, ReasoningError> {
            assert!(prompt.contains("Business Clarity"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.answer.clone().map_err(|()| ReasoningError::Api {
                status: 503,
                message: "overloaded".to_string(),
            })
        }
    }

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, email: OutgoingEmail) -> Result<(), NotifyError> {
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(email);
            }
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct RecordingAnalytics {
        entries: Mutex<Vec<AnalyticsEntry>>,
    }

    #[async_trait]
    impl AnalyticsSink for RecordingAnalytics {
        async fn record(&self, entry: &AnalyticsEntry) -> Result<(), AnalyticsError> {
            if let Ok(mut entries) = self.entries.lock() {
                entries.push(entry.clone());
            }
            Ok(())
        }
    }

    fn service(reasoning: Arc<ScriptedReasoning>) -> VisibilityService {
        VisibilityService::new(
            reasoning,
            Arc::new(LogNotifier),
            None,
            BackgroundTasks::new(),
            "https://site.io",
            Duration::from_secs(30),
        )
    }

    const GOOD_ANSWER: &str = r#"{
        "status": "CLEAR",
        "overallScore": 80,
        "pillars": [
            {"name": "Business Clarity", "score": 20, "description": "a"},
            {"name": "Audience Clarity", "score": 20, "description": "b"},
            {"name": "Location Clarity", "score": 20, "description": "c"},
            {"name": "Trust & Authority", "score": 20, "description": "d"}
        ],
        "businessDescription": "Bakery",
        "targetAudience": "Locals",
        "location": "Porto",
        "gaps": ["g"],
        "opportunities": ["o"]
    }"#;

    #[tokio::test]
    async fn good_answer_is_returned() {
        let reasoning = ScriptedReasoning::answering(GOOD_ANSWER);
        let report = service(Arc::clone(&reasoning)).evaluate("acme.io").await;
        assert_eq!(report.status, VisibilityStatus::Clear);
        assert_eq!(report.overall_score, 80);
        assert_eq!(reasoning.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn service_error_yields_fallback_without_retry() {
        let reasoning = ScriptedReasoning::failing();
        let report = service(Arc::clone(&reasoning)).evaluate("acme.io").await;
        assert_eq!(report, VisibilityReport::fallback());
        assert_eq!(reasoning.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fallback_is_deterministic() {
        let first = service(ScriptedReasoning::answering("not json")).evaluate("a.io").await;
        let second = service(ScriptedReasoning::answering("still not json")).evaluate("b.io").await;
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_reasoning_times_out_to_fallback() {
        let reasoning = ScriptedReasoning::stalling();
        let report = service(Arc::clone(&reasoning)).evaluate("acme.io").await;
        assert_eq!(report, VisibilityReport::fallback());
        assert_eq!(reasoning.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn run_test_dispatches_email_and_analytics() {
        let notifier = Arc::new(RecordingNotifier::default());
        let analytics = Arc::new(RecordingAnalytics::default());
        let tasks = BackgroundTasks::new();
        let service = VisibilityService::new(
            ScriptedReasoning::answering(GOOD_ANSWER),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Some(Arc::clone(&analytics) as Arc<dyn AnalyticsSink>),
            tasks.clone(),
            "https://site.io",
            Duration::from_secs(30),
        );

        let report = service.run_test("acme.io", "a@b.com", Lang::Pt).await;
        tasks.drain().await;

        let Ok(sent) = notifier.sent.lock() else {
            panic!("notifier lock poisoned");
        };
        assert_eq!(sent.len(), 1);
        assert!(sent.iter().all(|m| m.to == "a@b.com" && m.html.contains("CLARO")));

        let Ok(entries) = analytics.entries.lock() else {
            panic!("analytics lock poisoned");
        };
        assert_eq!(entries.len(), 1);
        assert!(entries.iter().all(|e| e.overall_score == report.overall_score));
    }
}
