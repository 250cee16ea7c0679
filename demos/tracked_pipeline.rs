//! Tracked Pipeline Example
//!
//! Runs a training node through the tracking hooks and prints what landed in
//! the in-memory backend.
//!
//! Run with: RUST_LOG=info cargo run --example tracked_pipeline

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::record_batch::RecordBatch;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use trueno_track::catalog::MemoryCatalog;
use trueno_track::data::{Dataset, NodeData, NodeValue};
use trueno_track::hooks::{EventLogger, PipelineHooks};
use trueno_track::model::Predictable;
use trueno_track::tracking::InMemoryBackend;
use trueno_track::Error;

/// Price per square foot, fitted on the training table.
struct LinearPrice {
    slope: f64,
}

impl LinearPrice {
    fn fit(sqft: &Float64Array, price: &Float64Array) -> Self {
        let (num, den) = sqft
            .iter()
            .zip(price.iter())
            .filter_map(|(x, y)| Some((x?, y?)))
            .fold((0.0, 0.0), |(num, den), (x, y)| (num + x * y, den + x * x));
        Self {
            slope: if den == 0.0 { 0.0 } else { num / den },
        }
    }
}

impl Predictable for LinearPrice {
    fn predict(&self, input: &Dataset) -> trueno_track::Result<Dataset> {
        let Dataset::Table(batch) = input else {
            return Err(Error::Prediction("expected a table".to_string()));
        };
        let sqft = batch
            .column_by_name("sqft")
            .and_then(|column| column.as_any().downcast_ref::<Float64Array>())
            .ok_or_else(|| Error::Prediction("missing Float64 column 'sqft'".to_string()))?;

        let price: Float64Array = sqft.iter().map(|x| x.map(|x| x * self.slope)).collect();
        let batch = RecordBatch::try_from_iter([("price", Arc::new(price) as ArrayRef)])?;
        Ok(Dataset::Table(batch))
    }

    fn flavor(&self) -> &str {
        "linear"
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== trueno-track: Tracked Pipeline ===\n");

    let catalog = MemoryCatalog::new().with_entry(
        "parameters",
        json!({
            "test_size": 0.2,
            "random_state": 3,
            "features": ["sqft"],
            "trueno_track": {
                "params": ["test_size", "features"],
                "models": {"price_model": {"name": "house-prices", "input": "X_test"}}
            }
        }),
    );

    let mut logger = EventLogger::new(InMemoryBackend::new("house-prices"));
    logger.after_catalog_created(&catalog)?;

    // -------------------------------------------------------------------------
    // Node: train_model(X_train, y_train, X_test) -> price_model
    // -------------------------------------------------------------------------
    let x_train = Float64Array::from(vec![850.0, 1200.0, 1500.0, 2100.0]);
    let y_train = Float64Array::from(vec![170_000.0, 245_000.0, 298_000.0, 431_000.0]);
    let model = LinearPrice::fit(&x_train, &y_train);
    println!("Fitted slope: {:.2} per sqft\n", model.slope);

    let x_test = RecordBatch::try_from_iter([(
        "sqft",
        Arc::new(Float64Array::from(vec![990.0, 1750.0])) as ArrayRef,
    )])?;
    let inputs = NodeData::from([("X_test".to_string(), NodeValue::table(x_test))]);
    let outputs = NodeData::from([("price_model".to_string(), NodeValue::model(model))]);
    logger.after_node_run(&inputs, &outputs)?;

    // -------------------------------------------------------------------------
    // What the backend recorded
    // -------------------------------------------------------------------------
    let run_id = logger
        .state()
        .run_id()
        .ok_or_else(|| anyhow::anyhow!("no run was bound"))?
        .to_string();
    let backend = logger.into_backend();
    let store = backend.store();

    if let Some(run) = store.get_run(&run_id) {
        println!("Run {} ({:?}, {} scopes)", run.run_id(), run.status(), run.scopes());
    }

    println!("\nParameters:");
    for param in store.get_params_for_run(&run_id) {
        println!("  {} = {}", param.key(), param.value());
    }

    println!("\nModels:");
    for model in store.get_models_for_run(&run_id) {
        println!("  {} [{}]", model.name(), model.flavor());
        if let Some(example) = model.input_example() {
            println!("    input example: {example}");
        }
        if let Some(signature) = model.signature() {
            println!("    signature: {}", serde_json::to_string(signature)?);
        }
    }

    Ok(())
}
