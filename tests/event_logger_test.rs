//! Event logger integration tests
//!
//! Drives the hooks the way a pipeline executor does: catalog first, then
//! one call per completed node.

use std::sync::{Arc, Mutex};

use arrow::array::{Array, Date32Array, Float64Array, Int32Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use serde_json::{json, Map, Value};
use trueno_track::catalog::MemoryCatalog;
use trueno_track::data::{Dataset, NodeData, NodeValue};
use trueno_track::experiment::RunStatus;
use trueno_track::hooks::{EventLogger, LoggerState, PipelineHooks};
use trueno_track::model::{DType, ModelSignature, Predictable};
use trueno_track::tracking::{InMemoryBackend, RunHandle, TrackingBackend};
use trueno_track::{Error, Result};

// =============================================================================
// Fixtures
// =============================================================================

/// Linear model over the `sqft` column that records what it predicted on.
#[derive(Clone, Default)]
struct PriceModel {
    seen: Arc<Mutex<Vec<Dataset>>>,
}

impl Predictable for PriceModel {
    fn predict(&self, input: &Dataset) -> Result<Dataset> {
        self.seen.lock().unwrap().push(input.clone());
        let Dataset::Table(batch) = input else {
            return Err(Error::Prediction("expected a table".to_string()));
        };
        let sqft = batch
            .column_by_name("sqft")
            .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
            .ok_or_else(|| Error::Prediction("missing sqft".to_string()))?;
        let prices: Vec<f64> = sqft.values().iter().map(|s| s * 250.0).collect();
        Ok(Dataset::Json(json!(prices)))
    }

    fn flavor(&self) -> &str {
        "linear"
    }
}

/// Model that ignores its input and predicts a single score.
struct ConstModel;

impl Predictable for ConstModel {
    fn predict(&self, _input: &Dataset) -> Result<Dataset> {
        Ok(Dataset::Json(json!([0.5])))
    }
}

/// Backend wrapper recording every `start_run` argument, optionally failing
/// model logging.
struct SpyBackend {
    inner: InMemoryBackend,
    started_with: Vec<Option<String>>,
    fail_models: bool,
}

impl SpyBackend {
    fn new() -> Self {
        Self {
            inner: InMemoryBackend::new("house-prices"),
            started_with: Vec::new(),
            fail_models: false,
        }
    }

    fn failing_models() -> Self {
        Self {
            fail_models: true,
            ..Self::new()
        }
    }
}

impl TrackingBackend for SpyBackend {
    fn start_run(&mut self, run_id: Option<&str>) -> Result<RunHandle> {
        self.started_with.push(run_id.map(str::to_string));
        self.inner.start_run(run_id)
    }

    fn end_run(&mut self, status: RunStatus) -> Result<()> {
        self.inner.end_run(status)
    }

    fn log_params(&mut self, params: &Map<String, Value>) -> Result<()> {
        self.inner.log_params(params)
    }

    fn log_model(
        &mut self,
        model: &dyn Predictable,
        name: &str,
        signature: Option<&ModelSignature>,
        input_example: Option<&Dataset>,
    ) -> Result<()> {
        if self.fail_models {
            return Err(Error::Backend("tracking server unavailable".to_string()));
        }
        self.inner.log_model(model, name, signature, input_example)
    }
}

fn two_row_table() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("sqft", DataType::Float64, false),
        Field::new("rooms", DataType::Int32, false),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(vec![1200.0, 800.0])),
            Arc::new(Int32Array::from(vec![3, 2])),
        ],
    )
    .unwrap()
}

fn catalog(params: Value) -> MemoryCatalog {
    MemoryCatalog::new().with_entry("parameters", params)
}

fn clf_catalog() -> MemoryCatalog {
    catalog(json!({
        "alpha": 0.5,
        "epochs": 10,
        "trueno_track": {"models": {"clf": {"name": "price_model", "input": "X_test"}}}
    }))
}

fn node(entries: Vec<(&str, NodeValue)>) -> NodeData {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

// =============================================================================
// Catalog hook
// =============================================================================

#[test]
fn test_catalog_hook_logs_all_params_without_config() {
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger
        .after_catalog_created(&catalog(json!({"alpha": 0.5, "epochs": 10})))
        .unwrap();

    let run_id = logger.state().run_id().unwrap().to_string();
    let store = logger.backend().store();
    let params = store.get_params_for_run(&run_id);
    assert_eq!(params.len(), 2);
    assert_eq!(store.get_run(&run_id).unwrap().status(), RunStatus::Success);
}

#[test]
fn test_catalog_hook_never_logs_tracking_config() {
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger.after_catalog_created(&clf_catalog()).unwrap();

    let run_id = logger.state().run_id().unwrap().to_string();
    let params = logger.backend().store().get_params_for_run(&run_id);
    assert!(params.iter().all(|p| p.key() != "trueno_track"));
    assert_eq!(params.len(), 2);
}

#[test]
fn test_empty_selection_still_opens_run() {
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger
        .after_catalog_created(&catalog(json!({"alpha": 0.5, "trueno_track": {"params": []}})))
        .unwrap();

    let run_id = logger.state().run_id().unwrap().to_string();
    assert!(logger.backend().store().get_params_for_run(&run_id).is_empty());
}

#[test]
fn test_list_config_fails_before_any_param_is_logged() {
    let mut logger = EventLogger::new(SpyBackend::new());
    let err = logger
        .after_catalog_created(&catalog(json!({"alpha": 0.5, "trueno_track": ["clf"]})))
        .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(logger.backend().started_with.is_empty());
    assert!(logger.backend().inner.store().get_params_for_run("run-0001").is_empty());
    assert!(logger.policy().is_none());
}

#[test]
fn test_parameters_entry_must_be_a_mapping() {
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    let err = logger
        .after_catalog_created(&catalog(json!([1, 2, 3])))
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_missing_parameters_entry_is_catalog_error() {
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    let err = logger.after_catalog_created(&MemoryCatalog::new()).unwrap_err();
    assert!(matches!(err, Error::Catalog(_)));
}

#[test]
fn test_custom_namespace_and_entry() {
    let mut logger = EventLogger::builder(InMemoryBackend::new("exp"))
        .namespace("mlflow")
        .parameters_entry("params")
        .build();
    let catalog = MemoryCatalog::new().with_entry(
        "params",
        json!({"alpha": 0.5, "epochs": 10, "mlflow": {"params": ["epochs"]}}),
    );
    logger.after_catalog_created(&catalog).unwrap();

    let run_id = logger.state().run_id().unwrap().to_string();
    let params = logger.backend().store().get_params_for_run(&run_id);
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].key(), "epochs");
}

// =============================================================================
// Node hook
// =============================================================================

#[test]
fn test_example_is_first_row_and_predict_sees_only_it() {
    let model = PriceModel::default();
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger.after_catalog_created(&clf_catalog()).unwrap();

    let inputs = node(vec![("X_test", NodeValue::table(two_row_table()))]);
    let outputs = node(vec![("clf", NodeValue::model(model.clone()))]);
    logger.after_node_run(&inputs, &outputs).unwrap();

    let seen = model.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].num_records(), 1);
    assert_eq!(seen[0], Dataset::Table(two_row_table().slice(0, 1)));

    let run_id = logger.state().run_id().unwrap().to_string();
    let models = logger.backend().store().get_models_for_run(&run_id);
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name(), "price_model");
    assert_eq!(models[0].flavor(), "linear");
    assert_eq!(
        models[0].input_example(),
        Some(&json!([{"sqft": 1200.0, "rooms": 3}]))
    );

    let signature = models[0].signature().unwrap();
    assert_eq!(signature.inputs.len(), 2);
    assert_eq!(signature.inputs[0].name.as_deref(), Some("sqft"));
    assert_eq!(signature.outputs[0].dtype, DType::Double);
}

#[test]
fn test_missing_input_logs_model_without_example() {
    let model = PriceModel::default();
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger.after_catalog_created(&clf_catalog()).unwrap();

    let outputs = node(vec![("clf", NodeValue::model(model.clone()))]);
    logger.after_node_run(&NodeData::new(), &outputs).unwrap();

    assert!(model.seen.lock().unwrap().is_empty());
    let run_id = logger.state().run_id().unwrap().to_string();
    let models = logger.backend().store().get_models_for_run(&run_id);
    assert_eq!(models.len(), 1);
    assert!(models[0].input_example().is_none());
    assert!(models[0].signature().is_none());
}

#[test]
fn test_empty_input_logs_model_without_example() {
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger.after_catalog_created(&clf_catalog()).unwrap();

    let inputs = node(vec![("X_test", NodeValue::table(two_row_table().slice(0, 0)))]);
    let outputs = node(vec![("clf", NodeValue::model(PriceModel::default()))]);
    logger.after_node_run(&inputs, &outputs).unwrap();

    let models = logger.backend().store().get_models_for_run("run-0001");
    assert!(models[0].input_example().is_none());
}

#[test]
fn test_untracked_outputs_are_ignored() {
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger.after_catalog_created(&clf_catalog()).unwrap();

    let outputs = node(vec![
        ("scaler", NodeValue::model(PriceModel::default())),
        ("predictions", NodeValue::json(json!([1.0, 2.0]))),
    ]);
    logger.after_node_run(&NodeData::new(), &outputs).unwrap();

    assert_eq!(logger.backend().store().model_count(), 0);
}

#[test]
fn test_node_runs_reuse_the_same_run() {
    let mut logger = EventLogger::new(SpyBackend::new());
    logger
        .after_catalog_created(&catalog(json!({"alpha": 0.5, "trueno_track": {"models": ["clf", "reg"]}})))
        .unwrap();

    let first = node(vec![("clf", NodeValue::model(PriceModel::default()))]);
    let second = node(vec![("reg", NodeValue::model(PriceModel::default()))]);
    logger.after_node_run(&NodeData::new(), &first).unwrap();
    logger.after_node_run(&NodeData::new(), &second).unwrap();

    let spy = logger.backend();
    assert_eq!(
        spy.started_with,
        vec![None, Some("run-0001".to_string()), Some("run-0001".to_string())]
    );
    assert_eq!(spy.inner.store().run_count(), 1);
    assert_eq!(spy.inner.store().get_models_for_run("run-0001").len(), 2);
    assert_eq!(
        logger.state(),
        &LoggerState::RunActive {
            run_id: "run-0001".to_string()
        }
    );
}

#[test]
fn test_catalog_hook_binds_run_without_params() {
    let mut logger = EventLogger::new(SpyBackend::new());
    logger
        .after_catalog_created(&catalog(json!({"trueno_track": {"models": ["clf"]}})))
        .unwrap();
    assert_eq!(logger.backend().started_with, vec![None]);

    logger
        .after_node_run(
            &NodeData::new(),
            &node(vec![("clf", NodeValue::model(PriceModel::default()))]),
        )
        .unwrap();
    assert_eq!(logger.state().run_id(), Some("run-0001"));
}

#[test]
fn test_multiple_tracked_outputs_log_in_name_order() {
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger
        .after_catalog_created(&catalog(json!({"trueno_track": {"models": ["b_model", "a_model"]}})))
        .unwrap();

    let outputs = node(vec![
        ("b_model", NodeValue::model(PriceModel::default())),
        ("a_model", NodeValue::model(PriceModel::default())),
    ]);
    logger.after_node_run(&NodeData::new(), &outputs).unwrap();

    let names: Vec<_> = logger
        .backend()
        .store()
        .get_models_for_run("run-0001")
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    assert_eq!(names, vec!["a_model", "b_model"]);
}

#[test]
fn test_disabled_tracking_skips_models() {
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger
        .after_catalog_created(&catalog(json!({"trueno_track": {"enabled": false, "models": ["clf"]}})))
        .unwrap();

    let outputs = node(vec![("clf", NodeValue::model(PriceModel::default()))]);
    logger.after_node_run(&NodeData::new(), &outputs).unwrap();

    assert_eq!(logger.backend().store().run_count(), 0);
    assert_eq!(logger.backend().store().model_count(), 0);
    assert_eq!(logger.state(), &LoggerState::Idle);
}

#[test]
fn test_date_column_is_typed_in_signature() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("sold_on", DataType::Date32, false),
        Field::new("sqft", DataType::Float64, false),
    ]));
    let table = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Date32Array::from(vec![19_723, 19_724])),
            Arc::new(Float64Array::from(vec![1200.0, 800.0])),
        ],
    )
    .unwrap();

    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger.after_catalog_created(&clf_catalog()).unwrap();
    let inputs = node(vec![("X_test", NodeValue::table(table))]);
    let outputs = node(vec![("clf", NodeValue::model(ConstModel))]);
    logger.after_node_run(&inputs, &outputs).unwrap();

    let models = logger.backend().store().get_models_for_run("run-0001");
    assert_eq!(models.len(), 1);
    assert_eq!(
        models[0].input_example(),
        Some(&json!([{"sold_on": "2024-01-01", "sqft": 1200.0}]))
    );
    let signature = models[0].signature().unwrap();
    assert_eq!(signature.inputs[0].name.as_deref(), Some("sold_on"));
    assert_eq!(signature.inputs[0].dtype, DType::Datetime);
}

#[test]
fn test_untyped_example_logs_model_without_signature() {
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger.after_catalog_created(&clf_catalog()).unwrap();

    let inputs = node(vec![(
        "X_test",
        NodeValue::json(json!([{"age": 31, "income": null}, {"age": 40, "income": 52000}])),
    )]);
    let outputs = node(vec![("clf", NodeValue::model(ConstModel))]);
    logger.after_node_run(&inputs, &outputs).unwrap();

    let store = logger.backend().store();
    let models = store.get_models_for_run("run-0001");
    assert_eq!(models.len(), 1);
    assert!(models[0].signature().is_none());
    assert_eq!(
        models[0].input_example(),
        Some(&json!([{"age": 31, "income": null}]))
    );
    assert_eq!(store.get_run("run-0001").unwrap().status(), RunStatus::Success);
}

#[test]
fn test_nested_json_example_is_one_record() {
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger.after_catalog_created(&clf_catalog()).unwrap();

    let inputs = node(vec![("X_test", NodeValue::json(json!([[1.0, 2.0], [3.0, 4.0]])))]);
    let outputs = node(vec![("clf", NodeValue::model(ConstModel))]);
    logger.after_node_run(&inputs, &outputs).unwrap();

    let models = logger.backend().store().get_models_for_run("run-0001");
    assert_eq!(models[0].input_example(), Some(&json!([[1.0, 2.0]])));
    let signature = models[0].signature().unwrap();
    assert_eq!(signature.inputs.len(), 2);
    assert!(signature.inputs.iter().all(|c| c.name.is_none() && c.dtype == DType::Double));
    assert_eq!(signature.outputs.len(), 1);
}

// =============================================================================
// Failure propagation
// =============================================================================

#[test]
fn test_backend_error_propagates_and_run_is_closed() {
    let mut logger = EventLogger::new(SpyBackend::failing_models());
    logger.after_catalog_created(&clf_catalog()).unwrap();

    let inputs = node(vec![("X_test", NodeValue::table(two_row_table()))]);
    let outputs = node(vec![("clf", NodeValue::model(PriceModel::default()))]);
    let err = logger.after_node_run(&inputs, &outputs).unwrap_err();

    assert!(matches!(err, Error::Backend(_)));
    let spy = logger.backend();
    assert!(spy.inner.active_run().is_none());
    assert_eq!(
        spy.inner.store().get_run("run-0001").unwrap().status(),
        RunStatus::Failed
    );
}

#[test]
fn test_tracked_output_must_be_a_model() {
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger.after_catalog_created(&clf_catalog()).unwrap();

    let outputs = node(vec![("clf", NodeValue::json(json!([0.1, 0.2])))]);
    let err = logger.after_node_run(&NodeData::new(), &outputs).unwrap_err();
    assert!(matches!(err, Error::NotAModel(name) if name == "clf"));
}

#[test]
fn test_prediction_error_propagates() {
    let mut logger = EventLogger::new(InMemoryBackend::new("exp"));
    logger.after_catalog_created(&clf_catalog()).unwrap();

    let inputs = node(vec![("X_test", NodeValue::json(json!([[1.0, 2.0]])))]);
    let outputs = node(vec![("clf", NodeValue::model(PriceModel::default()))]);
    let err = logger.after_node_run(&inputs, &outputs).unwrap_err();

    assert!(matches!(err, Error::Prediction(_)));
    assert_eq!(logger.backend().store().model_count(), 0);
}
