use crate::config::runtime::RuntimeConfig;
use crate::core::persist::ResponsePersister;
use crate::core::request;
use crate::domain::model::RequestDefinition;
use crate::domain::ports::{Dispatcher, Storage};
use crate::utils::error::{ErrorCategory, ReplayError};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

/// What the runner does after a definition fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop at the first abort-class error; later definitions are skipped.
    #[default]
    FailFast,
    /// Record the failure and move on to the next definition.
    ContinueOnError,
}

impl ErrorPolicy {
    pub fn should_stop(&self, error: &ReplayError) -> bool {
        match self {
            ErrorPolicy::FailFast => {
                error.is_abort() || error.category() == ErrorCategory::Configuration
            }
            ErrorPolicy::ContinueOnError => false,
        }
    }
}

#[derive(Debug)]
pub enum DefinitionOutcome {
    Persisted {
        status: u16,
        output_path: String,
    },
    /// The request went through but saving the response failed. Not a run failure.
    PersistWarning {
        status: u16,
        error: ReplayError,
    },
    Failed(ReplayError),
}

#[derive(Debug)]
pub struct DefinitionResult {
    pub name: String,
    pub method: String,
    pub url: Option<String>,
    pub duration: Duration,
    pub outcome: DefinitionOutcome,
}

impl DefinitionResult {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, DefinitionOutcome::Failed(_))
    }

    pub fn status(&self) -> Option<u16> {
        match &self.outcome {
            DefinitionOutcome::Persisted { status, .. }
            | DefinitionOutcome::PersistWarning { status, .. } => Some(*status),
            DefinitionOutcome::Failed(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<DefinitionResult>,
    /// Definitions never attempted because the run stopped early.
    pub skipped: Vec<String>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| !r.is_failure())
    }

    pub fn stopped_early(&self) -> bool {
        !self.skipped.is_empty()
    }

    pub fn first_failure(&self) -> Option<&ReplayError> {
        self.results.iter().find_map(|r| match &r.outcome {
            DefinitionOutcome::Failed(e) => Some(e),
            _ => None,
        })
    }

    pub fn completed(&self) -> usize {
        self.results.iter().filter(|r| !r.is_failure()).count()
    }

    pub fn warnings(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, DefinitionOutcome::PersistWarning { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    /// Run totals in a fixed key order, for the log line printed after a run.
    pub fn summary(&self) -> Map<String, Value> {
        let total_duration: Duration = self.results.iter().map(|r| r.duration).sum();
        let executed: Vec<Value> = self
            .results
            .iter()
            .map(|r| Value::String(r.name.clone()))
            .collect();

        let mut summary = Map::new();
        summary.insert(
            "total_definitions".to_string(),
            Value::from(self.results.len() + self.skipped.len()),
        );
        summary.insert("completed".to_string(), Value::from(self.completed()));
        summary.insert("warnings".to_string(), Value::from(self.warnings()));
        summary.insert("failed".to_string(), Value::from(self.failed()));
        summary.insert("skipped".to_string(), Value::from(self.skipped.len()));
        summary.insert(
            "total_duration_ms".to_string(),
            Value::from(total_duration.as_millis() as u64),
        );
        summary.insert(
            "started_at".to_string(),
            Value::String(self.started_at.to_rfc3339()),
        );
        summary.insert(
            "finished_at".to_string(),
            Value::String(self.finished_at.to_rfc3339()),
        );
        summary.insert("executed".to_string(), Value::Array(executed));

        summary
    }
}

/// Replays definitions one after another: build, dispatch, persist.
pub struct BatchRunner<'a, D: Dispatcher, S: Storage> {
    runtime: &'a RuntimeConfig,
    dispatcher: D,
    persister: ResponsePersister<S>,
    policy: ErrorPolicy,
}

impl<'a, D: Dispatcher, S: Storage> BatchRunner<'a, D, S> {
    pub fn new(runtime: &'a RuntimeConfig, dispatcher: D, storage: S) -> Self {
        Self {
            runtime,
            dispatcher,
            persister: ResponsePersister::new(storage),
            policy: ErrorPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn run(&self, definitions: &[RequestDefinition]) -> RunReport {
        let started_at = Utc::now();
        let mut results = Vec::with_capacity(definitions.len());
        let mut skipped = Vec::new();

        tracing::info!("Replaying {} request definitions", definitions.len());

        for (index, definition) in definitions.iter().enumerate() {
            let result = self.run_one(definition).await;

            let stop = match &result.outcome {
                DefinitionOutcome::Persisted { output_path, .. } => {
                    tracing::info!("✅ {} saved to {}", result.name, output_path);
                    false
                }
                DefinitionOutcome::PersistWarning { error, .. } => {
                    tracing::warn!("⚠️ {}: {}", result.name, error);
                    println!("{}", error);
                    false
                }
                DefinitionOutcome::Failed(error) => {
                    tracing::error!("❌ {}: {}", result.name, error);
                    println!("{}", error);
                    self.policy.should_stop(error)
                }
            };
            results.push(result);

            if stop {
                skipped.extend(definitions[index + 1..].iter().map(|d| d.name.clone()));
                if !skipped.is_empty() {
                    tracing::warn!("Stopping run, {} definitions not attempted", skipped.len());
                }
                break;
            }
        }

        RunReport {
            started_at,
            finished_at: Utc::now(),
            results,
            skipped,
        }
    }

    async fn run_one(&self, definition: &RequestDefinition) -> DefinitionResult {
        let start_time = Instant::now();
        let mut url = None;
        let outcome = self.execute(definition, &mut url).await;

        DefinitionResult {
            name: definition.name.clone(),
            method: definition.method.clone(),
            url,
            duration: start_time.elapsed(),
            outcome,
        }
    }

    async fn execute(
        &self,
        definition: &RequestDefinition,
        url: &mut Option<String>,
    ) -> DefinitionOutcome {
        let built = match request::build(definition, self.runtime) {
            Ok(built) => built,
            Err(e) => return DefinitionOutcome::Failed(e),
        };
        *url = Some(built.url.to_string());

        if let Some(body) = built.body_text() {
            println!("{}", body);
        }
        println!("{}", definition.method);
        println!("{}", built.url);

        let captured = match self.dispatcher.dispatch(&definition.name, built).await {
            Ok(captured) => captured,
            Err(e) => return DefinitionOutcome::Failed(e),
        };
        println!("{}", captured.raw);
        println!("{}", captured.status_line());

        let status = captured.status.as_u16();
        match self.persister.persist(&definition.name, &captured.body).await {
            Ok(output_path) => DefinitionOutcome::Persisted {
                status,
                output_path,
            },
            Err(error) => DefinitionOutcome::PersistWarning { status, error },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatch::CapturedResponse;
    use crate::core::request::BuiltRequest;
    use crate::domain::model::{FieldDefinition, FieldKind, IntegerKind};
    use crate::utils::error::Result;
    use async_trait::async_trait;
    use reqwest::header::HeaderMap;
    use reqwest::{StatusCode, Version};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockDispatcher {
        calls: Arc<Mutex<Vec<(String, BuiltRequest)>>>,
        fail_for: Option<String>,
        response_body: Option<Vec<u8>>,
    }

    #[async_trait]
    impl Dispatcher for MockDispatcher {
        async fn dispatch(&self, definition: &str, request: BuiltRequest) -> Result<CapturedResponse> {
            self.calls
                .lock()
                .await
                .push((definition.to_string(), request));

            if self.fail_for.as_deref() == Some(definition) {
                // A real transport error is the only way to obtain a reqwest::Error.
                let source = reqwest::Client::new()
                    .get("http://127.0.0.1:1/")
                    .send()
                    .await
                    .unwrap_err();
                return Err(ReplayError::TransportError {
                    definition: definition.to_string(),
                    source,
                });
            }

            let body = self
                .response_body
                .clone()
                .unwrap_or_else(|| br#"{"ok":true}"#.to_vec());
            Ok(CapturedResponse::new(StatusCode::OK, Version::HTTP_11, &HeaderMap::new(), body))
        }
    }

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn runtime() -> RuntimeConfig {
        RuntimeConfig {
            version: "1".to_string(),
            scheme: "http".to_string(),
            host: "api.test".to_string(),
            authorization: String::new(),
            session_id: String::new(),
        }
    }

    fn definition(name: &str, method: &str) -> RequestDefinition {
        RequestDefinition {
            name: name.to_string(),
            uri: format!("/{}", name.to_lowercase()),
            method: method.to_string(),
            query: vec![],
            description: String::new(),
            body: vec![],
        }
    }

    #[tokio::test]
    async fn test_all_definitions_run_in_order() {
        let rt = runtime();
        let dispatcher = MockDispatcher::default();
        let storage = MockStorage::default();
        let runner = BatchRunner::new(&rt, dispatcher.clone(), storage.clone());

        let definitions = vec![
            definition("First", "GET"),
            definition("Second", "POST"),
            definition("Third", "patch"),
        ];
        let report = runner.run(&definitions).await;

        assert!(report.is_success());
        assert!(!report.stopped_early());
        let names: Vec<String> = dispatcher
            .calls
            .lock()
            .await
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);

        let files = storage.files.lock().await;
        assert_eq!(files.len(), 3);
        assert_eq!(files.get("Second.json").unwrap(), b"{\n\t\"ok\": true\n}");
        assert_eq!(report.summary().get("completed").unwrap(), &serde_json::json!(3));
    }

    #[tokio::test]
    async fn test_unsupported_method_stops_before_dispatch() {
        let rt = runtime();
        let dispatcher = MockDispatcher::default();
        let runner = BatchRunner::new(&rt, dispatcher.clone(), MockStorage::default());

        let definitions = vec![
            definition("First", "GET"),
            definition("Remove", "DELETE"),
            definition("Never", "GET"),
        ];
        let report = runner.run(&definitions).await;

        assert!(!report.is_success());
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.skipped, vec!["Never"]);
        assert!(matches!(
            report.first_failure(),
            Some(ReplayError::UnsupportedMethodError { method, .. }) if method == "DELETE"
        ));
        assert_eq!(dispatcher.calls.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_field_error_stops_run() {
        let rt = runtime();
        let dispatcher = MockDispatcher::default();
        let runner = BatchRunner::new(&rt, dispatcher.clone(), MockStorage::default());

        let mut bad = definition("Bad", "POST");
        bad.body = vec![FieldDefinition::new(
            "count",
            FieldKind::Integer(IntegerKind::Int),
            "ten",
        )];
        let report = runner.run(&[bad, definition("After", "GET")]).await;

        assert!(matches!(
            report.first_failure(),
            Some(ReplayError::FieldSerializationError { .. })
        ));
        assert_eq!(report.skipped, vec!["After"]);
        assert!(dispatcher.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_respects_policy() {
        let rt = runtime();
        let definitions = vec![definition("Down", "GET"), definition("Up", "GET")];

        let failing = MockDispatcher {
            fail_for: Some("Down".to_string()),
            ..Default::default()
        };
        let report = BatchRunner::new(&rt, failing.clone(), MockStorage::default())
            .run(&definitions)
            .await;
        assert_eq!(report.skipped, vec!["Up"]);
        assert_eq!(failing.calls.lock().await.len(), 1);

        let failing = MockDispatcher {
            fail_for: Some("Down".to_string()),
            ..Default::default()
        };
        let report = BatchRunner::new(&rt, failing.clone(), MockStorage::default())
            .with_policy(ErrorPolicy::ContinueOnError)
            .run(&definitions)
            .await;
        assert!(report.skipped.is_empty());
        assert_eq!(report.failed(), 1);
        assert_eq!(report.completed(), 1);
        assert_eq!(failing.calls.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_persist_failure_does_not_stop_run() {
        let rt = runtime();
        let dispatcher = MockDispatcher {
            response_body: Some(b"not json".to_vec()),
            ..Default::default()
        };
        let runner = BatchRunner::new(&rt, dispatcher.clone(), MockStorage::default());

        let report = runner
            .run(&[definition("One", "GET"), definition("Two", "GET")])
            .await;

        assert!(report.is_success());
        assert_eq!(report.warnings(), 2);
        assert_eq!(report.results[0].status(), Some(200));
        assert_eq!(dispatcher.calls.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_summary_key_order_is_stable() {
        let rt = runtime();
        let runner = BatchRunner::new(&rt, MockDispatcher::default(), MockStorage::default());
        let report = runner.run(&[definition("Only", "GET")]).await;

        let summary = report.summary();
        let keys: Vec<&str> = summary.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "total_definitions",
                "completed",
                "warnings",
                "failed",
                "skipped",
                "total_duration_ms",
                "started_at",
                "finished_at",
                "executed",
            ]
        );
        assert_eq!(report.summary()["executed"], serde_json::json!(["Only"]));
    }

    #[test]
    fn test_policy_decision() {
        let persist = ReplayError::PersistError {
            name: "x".to_string(),
            message: "y".to_string(),
        };
        let method = ReplayError::UnsupportedMethodError {
            definition: "x".to_string(),
            method: "PUT".to_string(),
        };

        assert!(!ErrorPolicy::FailFast.should_stop(&persist));
        assert!(ErrorPolicy::FailFast.should_stop(&method));
        assert!(!ErrorPolicy::ContinueOnError.should_stop(&method));
    }
}
