use codelens_lib::commands::input::load_sources;
use codelens_lib::models::file_report::{EnrichmentStatus, FileOutcome};
use codelens_lib::{
    aggregate, AnalysisError, AnalyzerSettings, Classification, EnrichmentError,
    EnrichmentProvider, FileAnalyzer, HeuristicComplexity, PatternRegistry, SourceFile,
};
use serde_json::{json, Value};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const SERVICE_PY: &str = r#"import os
import requests

class UserService:
    # TODO: cache lookups
    def fetch(self, user_id):
        self.cursor.execute("SELECT * FROM users WHERE id = '" + user_id + "'")
        return requests.get(os.environ["API"] + "/users/" + str(user_id))

    def create_user(self, name):
        password = "hunter2"
        return {"name": name, "retries": 1000}
"#;

const CONTROLLER_JS: &str = r#"function render(req, res) {
  for (const row of rows) {
    for (const col of row) {
      total += col;
    }
  }
  document.getElementById("out").innerHTML = "<b>" + req.query.name + "</b>";
}
"#;

struct CountingClassifier {
    calls: AtomicUsize,
}

impl EnrichmentProvider for CountingClassifier {
    fn classify(&self, _text: &str, _max_length: usize) -> Result<Classification, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Classification {
            label: "LABEL_1".to_string(),
            confidence: 0.9,
        })
    }
}

struct UnavailableClassifier;

impl EnrichmentProvider for UnavailableClassifier {
    fn classify(&self, _text: &str, _max_length: usize) -> Result<Classification, EnrichmentError> {
        Err(EnrichmentError::Unavailable)
    }
}

fn analyzer() -> Arc<FileAnalyzer> {
    let registry = Arc::new(PatternRegistry::new().expect("registry"));
    Arc::new(
        FileAnalyzer::new(registry, AnalyzerSettings::default())
            .with_complexity_provider(Arc::new(HeuristicComplexity)),
    )
}

fn project_files() -> Vec<SourceFile> {
    vec![
        SourceFile {
            name: "app/user_service.py".to_string(),
            content: SERVICE_PY.to_string(),
        },
        SourceFile {
            name: "app/UserController.js".to_string(),
            content: CONTROLLER_JS.to_string(),
        },
        SourceFile {
            name: "app/empty.py".to_string(),
            content: String::new(),
        },
    ]
}

fn without_timestamps(mut value: Value) -> Value {
    match &mut value {
        Value::Object(map) => {
            map.remove("analyzedAt");
            for child in map.values_mut() {
                *child = without_timestamps(child.take());
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                *child = without_timestamps(child.take());
            }
        }
        _ => {}
    }
    value
}

#[tokio::test]
async fn file_report_serializes_with_camel_case_contract() {
    let outcome = analyzer().analyze_file("app/user_service.py", SERVICE_PY).await;
    let value = serde_json::to_value(&outcome).expect("serialize");

    assert_eq!(value["path"], json!("app/user_service.py"));
    assert_eq!(value["detectedLanguage"], json!("Python"));
    assert!(value["analyzedAt"].is_string());
    assert!(value["metrics"]["totalLines"].as_u64().unwrap() > 0);
    assert!(value["metrics"]["averageComplexity"].is_number());
    assert_eq!(value["enrichment"]["status"], json!("not_available"));

    let security: Vec<&str> = value["securityIssues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["ruleName"].as_str().unwrap())
        .collect();
    assert!(security.contains(&"SQL Injection"));
    assert!(security.contains(&"Hardcoded Credentials"));

    let performance = value["performanceIssues"].as_array().unwrap();
    assert!(performance
        .iter()
        .any(|issue| issue["ruleName"] == json!("Synchronous IO") && issue["suggestion"].is_string()));

    assert_eq!(value["debt"]["deferredWorkMarkers"], json!(1));
    assert_eq!(value["debt"]["magicNumberCount"], json!(1));
}

#[tokio::test]
async fn unknown_complexity_is_omitted_not_zero() {
    let registry = Arc::new(PatternRegistry::new().expect("registry"));
    let outcome = FileAnalyzer::new(registry, AnalyzerSettings::default())
        .analyze_file("a.py", "x = 1\n")
        .await;
    let metrics = &serde_json::to_value(&outcome).expect("serialize")["metrics"];

    assert!(metrics.get("averageComplexity").is_none());
    assert!(metrics.get("maxComplexity").is_none());
    assert!(metrics.get("maintainabilityIndex").is_none());
    assert_eq!(metrics["codeLines"], json!(1));
}

#[tokio::test]
async fn file_analysis_is_idempotent_apart_from_timestamp() {
    let analyzer = analyzer();
    let first = analyzer.analyze_file("ctrl.js", CONTROLLER_JS).await;
    let second = analyzer.analyze_file("ctrl.js", CONTROLLER_JS).await;

    assert_eq!(
        without_timestamps(serde_json::to_value(&first).unwrap()),
        without_timestamps(serde_json::to_value(&second).unwrap())
    );
}

#[tokio::test]
async fn raw_and_precomputed_paths_agree() {
    let analyzer = analyzer();
    let raw = analyzer.analyze_project(project_files()).await.expect("raw path");

    let mut outcomes = Vec::new();
    for file in project_files() {
        outcomes.push(analyzer.analyze_file(&file.name, &file.content).await);
    }
    let precomputed = aggregate(&outcomes).expect("precomputed path");

    assert_eq!(
        without_timestamps(serde_json::to_value(&raw).unwrap()),
        without_timestamps(serde_json::to_value(&precomputed).unwrap())
    );
}

#[tokio::test]
async fn project_report_excludes_failed_files() {
    let report = analyzer().analyze_project(project_files()).await.expect("report");
    let value = serde_json::to_value(&report).expect("serialize");

    assert_eq!(value["overview"]["totalFiles"], json!(3));
    assert_eq!(value["overview"]["analyzedFiles"], json!(2));
    assert_eq!(
        value["overview"]["excludedFiles"],
        json!([{ "path": "app/empty.py", "error": "empty content" }])
    );
    assert_eq!(value["overview"]["primaryLanguage"], json!("Python"));
    assert_eq!(value["overview"]["projectSize"], json!("Small"));
    assert_eq!(value["qualitySummary"]["analyzedFiles"], json!(2));
    assert_eq!(value["maintainability"]["filesAnalyzed"], json!(2));

    let score = value["qualitySummary"]["overallQualityScore"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&score));
    assert!(value["securityAssessment"]["topIssues"].as_array().unwrap().len() <= 5);
    assert_eq!(value["securityAssessment"]["topIssues"][0]["file"], json!("app/user_service.py"));
    assert_eq!(value["recommendations"][0]["category"], json!("Security"));
    assert_eq!(value["recommendations"][0]["priority"], json!("HIGH"));
}

#[tokio::test]
async fn empty_project_is_a_contract_violation() {
    let err = analyzer().analyze_project(Vec::new()).await.expect_err("empty");
    assert!(matches!(err, AnalysisError::EmptyProject));
}

#[tokio::test]
async fn enrichment_provider_is_called_once_per_analyzed_file() {
    let classifier = Arc::new(CountingClassifier {
        calls: AtomicUsize::new(0),
    });
    let registry = Arc::new(PatternRegistry::new().expect("registry"));
    let analyzer = Arc::new(
        FileAnalyzer::new(registry, AnalyzerSettings::default())
            .with_enrichment_provider(classifier.clone()),
    );

    let outcomes = analyzer.analyze_files(project_files(), None).await;
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);

    let statuses: Vec<Option<EnrichmentStatus>> = outcomes
        .iter()
        .map(|o| o.report().map(|r| r.enrichment.status))
        .collect();
    assert_eq!(
        statuses,
        vec![Some(EnrichmentStatus::Analyzed), Some(EnrichmentStatus::Analyzed), None]
    );
}

#[tokio::test]
async fn enrichment_failure_leaves_other_fields_untouched() {
    let registry = Arc::new(PatternRegistry::new().expect("registry"));
    let mut settings = AnalyzerSettings::default();
    settings.enrichment_timeout = Duration::from_millis(500);

    let plain = FileAnalyzer::new(registry.clone(), settings.clone())
        .analyze_source("svc.py", SERVICE_PY);
    let failing = FileAnalyzer::new(registry, settings)
        .with_enrichment_provider(Arc::new(UnavailableClassifier))
        .analyze_file("svc.py", SERVICE_PY)
        .await;

    let (FileOutcome::Analyzed(plain), FileOutcome::Analyzed(failing)) = (plain, failing) else {
        panic!("both analyses must succeed");
    };
    assert_eq!(failing.enrichment.status, EnrichmentStatus::Error);
    assert_eq!(plain.metrics, failing.metrics);
    assert_eq!(plain.security_issues, failing.security_issues);
    assert_eq!(plain.debt, failing.debt);
}

#[tokio::test]
async fn single_worker_still_analyzes_everything_in_order() {
    let registry = Arc::new(PatternRegistry::new().expect("registry"));
    let mut settings = AnalyzerSettings::default();
    settings.workers = 1;
    let analyzer = Arc::new(FileAnalyzer::new(registry, settings));

    let outcomes = analyzer.analyze_files(project_files(), None).await;
    let paths: Vec<&str> = outcomes.iter().map(FileOutcome::path).collect();
    assert_eq!(paths, vec!["app/user_service.py", "app/UserController.js", "app/empty.py"]);
}

#[tokio::test]
async fn loaded_workspace_feeds_project_analysis() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::create_dir_all(dir.path().join("src")).expect("create src");
    fs::write(dir.path().join("src/user_service.py"), SERVICE_PY).expect("write py");
    fs::write(dir.path().join("src/controller.js"), CONTROLLER_JS).expect("write js");

    let loaded = load_sources(&[dir.path().to_string_lossy().to_string()]).expect("load");
    assert_eq!(loaded.files.len(), 2);

    let report = analyzer().analyze_project(loaded.files).await.expect("report");
    assert_eq!(report.overview.analyzed_files, 2);
    assert!(report.quality_summary.security_issues_count >= 2);
    assert!(report.quality_summary.average_complexity.is_some());
}
