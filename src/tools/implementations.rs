use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use tracing::{debug, info};

use super::trait_def::Tool;
use super::{error_payload, parse_args, ToolError};
use crate::data::{describe, Dataset, LinearModel};
use crate::plot::{self, PlotKind, PlotSettings};
use crate::registry::Registry;

const DATASET_NOT_LOADED: &str = "Dataset not loaded. Call load_csv first.";

fn missing_column(name: &str) -> Value {
    error_payload(format!("Column '{}' not found in dataset.", name))
}

/// Accepts either a single value or a list of values
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Either a batch of feature rows or a single flat row
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureRows {
    Many(Vec<Vec<f64>>),
    One(Vec<f64>),
}

impl FeatureRows {
    fn into_rows(self) -> Vec<Vec<f64>> {
        match self {
            FeatureRows::Many(rows) => rows,
            FeatureRows::One(row) => vec![row],
        }
    }
}

fn file_path_schema() -> Value {
    json!({
        "type": "string",
        "description": "Path of the dataset file, exactly as passed to load_csv"
    })
}

/// `model_<file name without .csv>_<target>`
pub fn default_model_name(file_path: &str, y_col: &str) -> String {
    let base = Path::new(file_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_path);
    let base = base.strip_suffix(".csv").unwrap_or(base);
    format!("model_{}_{}", base, y_col)
}

#[derive(Debug, Deserialize)]
struct FilePathArgs {
    file_path: String,
}

pub struct LoadCsvTool;

impl Tool for LoadCsvTool {
    fn name(&self) -> &'static str {
        "load_csv"
    }

    fn description(&self) -> &'static str {
        "Load a CSV (or TSV) file into memory. The file path becomes the dataset key used by every other dataset tool. Returns the column names and row count."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the CSV file on the server"
                }
            },
            "required": ["file_path"]
        })
    }

    fn execute(&self, registry: &mut Registry, arguments: Value) -> Result<Value, ToolError> {
        let args: FilePathArgs = parse_args(self.name(), arguments)?;

        let dataset = Dataset::from_csv_path(Path::new(&args.file_path))?;
        let columns = dataset.column_names();
        let num_rows = dataset.num_rows();

        let replaced = registry.store_dataset(&args.file_path, dataset)?;

        info!(
            file_path = %args.file_path,
            columns = columns.len(),
            num_rows,
            replaced,
            "Dataset loaded"
        );

        Ok(json!({
            "columns": columns,
            "num_rows": num_rows,
            "status": "loaded"
        }))
    }
}

pub struct SummarizeDataTool;

impl Tool for SummarizeDataTool {
    fn name(&self) -> &'static str {
        "summarize_data"
    }

    fn description(&self) -> &'static str {
        "Descriptive statistics for a loaded dataset: count, mean, std, min, quartiles and max for every numeric column (count, unique, top and freq when no column is numeric)."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": file_path_schema()
            },
            "required": ["file_path"]
        })
    }

    fn execute(&self, registry: &mut Registry, arguments: Value) -> Result<Value, ToolError> {
        let args: FilePathArgs = parse_args(self.name(), arguments)?;

        let Some(dataset) = registry.dataset(&args.file_path) else {
            return Ok(error_payload(DATASET_NOT_LOADED));
        };

        serde_json::to_value(describe(dataset)).map_err(ToolError::Encode)
    }
}

#[derive(Debug, Deserialize)]
struct RegressionArgs {
    file_path: String,
    x_cols: OneOrMany,
    y_col: String,
    #[serde(default)]
    model_name: Option<String>,
}

pub struct RunLinearRegressionTool;

impl Tool for RunLinearRegressionTool {
    fn name(&self) -> &'static str {
        "run_linear_regression"
    }

    fn description(&self) -> &'static str {
        "Fit an ordinary least squares linear regression of y_col on x_cols over a loaded dataset. Returns coefficients, intercept, R2 and MSE on the training data, and saves the model under model_name (default: model_<file>_<y_col>)."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": file_path_schema(),
                "x_cols": {
                    "description": "Feature column name, or a list of feature column names",
                    "anyOf": [
                        { "type": "string" },
                        { "type": "array", "items": { "type": "string" } }
                    ]
                },
                "y_col": {
                    "type": "string",
                    "description": "Target column name"
                },
                "model_name": {
                    "type": "string",
                    "description": "Optional name to save the model under. Reusing a name replaces that model."
                }
            },
            "required": ["file_path", "x_cols", "y_col"]
        })
    }

    fn execute(&self, registry: &mut Registry, arguments: Value) -> Result<Value, ToolError> {
        let args: RegressionArgs = parse_args(self.name(), arguments)?;
        let x_cols = args.x_cols.into_vec();

        let Some(dataset) = registry.dataset(&args.file_path) else {
            return Ok(error_payload(DATASET_NOT_LOADED));
        };
        if let Some(absent) = x_cols
            .iter()
            .chain(std::iter::once(&args.y_col))
            .find(|c| !dataset.has_column(c))
        {
            return Ok(missing_column(absent));
        }

        let features = x_cols
            .iter()
            .map(|c| dataset.dense_numeric_column(c))
            .collect::<Result<Vec<_>, _>>()?;
        let y = dataset.dense_numeric_column(&args.y_col)?;
        let rows: Vec<Vec<f64>> = (0..y.len())
            .map(|i| features.iter().map(|column| column[i]).collect())
            .collect();

        let model = LinearModel::fit(x_cols, args.y_col.clone(), &rows, &y)?;
        let metrics = model.evaluate(&rows, &y)?;

        let model_name = args
            .model_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| default_model_name(&args.file_path, &args.y_col));

        let results = json!({
            "coef": model.coef,
            "intercept": model.intercept,
            "R2": metrics.r2,
            "MSE": metrics.mse
        });

        if registry.store_model(&model_name, model)? {
            debug!(model = %model_name, "Replaced existing model");
        }

        info!(
            model = %model_name,
            r2 = metrics.r2,
            mse = metrics.mse,
            "Linear regression trained"
        );

        Ok(json!({
            "model_name": model_name,
            "results": results
        }))
    }
}

#[derive(Debug, Deserialize)]
struct PredictArgs {
    model_name: String,
    x_values: FeatureRows,
}

pub struct PredictLinearRegressionTool;

impl Tool for PredictLinearRegressionTool {
    fn name(&self) -> &'static str {
        "predict_linear_regression"
    }

    fn description(&self) -> &'static str {
        "Predict with a trained linear regression model. x_values is one feature vector or a list of feature vectors, in the column order the model was trained with."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "model_name": {
                    "type": "string",
                    "description": "Name returned by run_linear_regression"
                },
                "x_values": {
                    "description": "A single feature vector, or a list of feature vectors",
                    "anyOf": [
                        { "type": "array", "items": { "type": "number" } },
                        {
                            "type": "array",
                            "items": { "type": "array", "items": { "type": "number" } }
                        }
                    ]
                }
            },
            "required": ["model_name", "x_values"]
        })
    }

    fn execute(&self, registry: &mut Registry, arguments: Value) -> Result<Value, ToolError> {
        let args: PredictArgs = parse_args(self.name(), arguments)?;

        let Some(model) = registry.resolve_model(&args.model_name)? else {
            return Ok(error_payload(format!("Model '{}' not found.", args.model_name)));
        };

        let predictions = model.predict(&args.x_values.into_rows())?;
        debug!(model = %args.model_name, count = predictions.len(), "Predictions computed");

        Ok(json!({ "predictions": predictions }))
    }
}

pub struct ListDatasetsTool;

impl Tool for ListDatasetsTool {
    fn name(&self) -> &'static str {
        "list_datasets"
    }

    fn description(&self) -> &'static str {
        "List the keys of every loaded dataset, including datasets restored from previous sessions."
    }

    fn schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn execute(&self, registry: &mut Registry, _arguments: Value) -> Result<Value, ToolError> {
        Ok(json!(registry.dataset_keys()))
    }
}

pub struct ListModelsTool;

impl Tool for ListModelsTool {
    fn name(&self) -> &'static str {
        "list_models"
    }

    fn description(&self) -> &'static str {
        "List the names of every trained model, including models restored from previous sessions."
    }

    fn schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn execute(&self, registry: &mut Registry, _arguments: Value) -> Result<Value, ToolError> {
        Ok(json!(registry.model_keys()))
    }
}

#[derive(Debug, Deserialize)]
struct PlotArgs {
    file_path: String,
    #[serde(default)]
    x_col: Option<String>,
    #[serde(default)]
    y_col: Option<String>,
    #[serde(default)]
    plot_type: Option<String>,
}

pub struct PlotDataTool {
    settings: PlotSettings,
}

impl PlotDataTool {
    pub fn new(settings: PlotSettings) -> Self {
        Self { settings }
    }
}

impl Tool for PlotDataTool {
    fn name(&self) -> &'static str {
        "plot_data"
    }

    fn description(&self) -> &'static str {
        "Plot columns of a loaded dataset as a PNG image. Scatter plots need x_col and y_col; histograms need x_col. Returns the image path and URL."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": file_path_schema(),
                "x_col": {
                    "type": "string",
                    "description": "Column for the x axis"
                },
                "y_col": {
                    "type": "string",
                    "description": "Column for the y axis (scatter plots only)"
                },
                "plot_type": {
                    "type": "string",
                    "enum": ["scatter", "histogram"],
                    "description": "Kind of plot. Default is scatter."
                }
            },
            "required": ["file_path"]
        })
    }

    fn execute(&self, registry: &mut Registry, arguments: Value) -> Result<Value, ToolError> {
        let args: PlotArgs = parse_args(self.name(), arguments)?;

        let Some(dataset) = registry.dataset(&args.file_path) else {
            return Ok(error_payload(DATASET_NOT_LOADED));
        };

        let Ok(kind) = args.plot_type.as_deref().unwrap_or("scatter").parse::<PlotKind>() else {
            return Ok(error_payload(
                "Invalid plot_type. Choose 'scatter' or 'histogram'.",
            ));
        };

        let x_col = args.x_col.filter(|c| !c.is_empty());
        let y_col = args.y_col.filter(|c| !c.is_empty());

        let file_name = PlotSettings::artifact_name(&args.file_path, kind);
        let plot_path = self.settings.artifact_path(&file_name);

        match kind {
            PlotKind::Scatter => {
                let (Some(x_col), Some(y_col)) = (x_col, y_col) else {
                    return Ok(error_payload(
                        "For scatter plots, both x_col and y_col are required.",
                    ));
                };
                if let Some(absent) = [&x_col, &y_col].into_iter().find(|c| !dataset.has_column(c)) {
                    return Ok(missing_column(absent));
                }

                let xs = dataset.numeric_column(&x_col)?;
                let ys = dataset.numeric_column(&y_col)?;
                let points: Vec<(f64, f64)> = xs
                    .into_iter()
                    .zip(ys)
                    .filter_map(|(x, y)| Some((x?, y?)))
                    .collect();

                self.settings.ensure_dir()?;
                plot::render_scatter(&plot_path, &points)?;
            }
            PlotKind::Histogram => {
                let Some(x_col) = x_col else {
                    return Ok(error_payload("For histogram plots, x_col is required."));
                };
                if !dataset.has_column(&x_col) {
                    return Ok(missing_column(&x_col));
                }

                let values: Vec<f64> = dataset.numeric_column(&x_col)?.into_iter().flatten().collect();

                self.settings.ensure_dir()?;
                plot::render_histogram(&plot_path, &values)?;
            }
        }

        info!(path = %plot_path.display(), kind = %kind, "Plot created");

        Ok(json!({
            "status": "plot_created",
            "plot_path": plot_path.to_string_lossy(),
            "plot_url": self.settings.url_for(&file_name)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryPaths;
    use crate::tools::payload_error;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        registry: Registry,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let registry = Registry::open(RegistryPaths::in_dir(dir.path())).unwrap();
            Self { dir, registry }
        }

        fn write(&self, name: &str, content: &str) -> String {
            let path = self.dir.path().join(name);
            fs::write(&path, content).unwrap();
            path.to_string_lossy().to_string()
        }

        fn plot_settings(&self) -> PlotSettings {
            PlotSettings::new(self.dir.path().join("plots"), "/static/plots")
        }

        fn run(&mut self, tool: &dyn Tool, args: Value) -> Result<Value, ToolError> {
            tool.execute(&mut self.registry, args)
        }
    }

    const LINE: &str = "x,y\n1,2\n2,4\n3,6\n4,8\n";

    #[test]
    fn test_load_csv_reports_shape() {
        let mut fx = Fixture::new();
        let path = fx.write("line.csv", LINE);

        let result = fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();
        assert_eq!(result["columns"], json!(["x", "y"]));
        assert_eq!(result["num_rows"], 4);
        assert_eq!(result["status"], "loaded");
        assert!(fx.registry.paths().state_file.exists());
    }

    #[test]
    fn test_failed_persist_leaves_registry_unchanged() {
        let mut fx = Fixture::new();
        let path = fx.write("line.csv", LINE);
        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();

        let state_file = fx.registry.paths().state_file.clone();
        fs::remove_file(&state_file).unwrap();
        fs::create_dir(&state_file).unwrap();

        let other = fx.write("other.csv", LINE);
        assert!(fx.run(&LoadCsvTool, json!({"file_path": other})).is_err());
        assert_eq!(fx.registry.dataset_keys(), vec![path.clone()]);

        let fit = fx.run(
            &RunLinearRegressionTool,
            json!({"file_path": path, "x_cols": "x", "y_col": "y", "model_name": "m"}),
        );
        assert!(fit.is_err());
        assert!(fx.registry.model_keys().is_empty());

        let listed = fx.run(&ListModelsTool, json!({})).unwrap();
        assert_eq!(listed, json!([]));
    }

    #[test]
    fn test_load_csv_twice_keeps_one_entry() {
        let mut fx = Fixture::new();
        let path = fx.write("line.csv", LINE);

        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();
        fs::write(&path, "x,y\n1,2\n").unwrap();
        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();

        assert_eq!(fx.registry.dataset_keys(), vec![path.clone()]);
        assert_eq!(fx.registry.dataset(&path).unwrap().num_rows(), 1);
    }

    #[test]
    fn test_load_csv_missing_file_is_error() {
        let mut fx = Fixture::new();
        let result = fx.run(&LoadCsvTool, json!({"file_path": "/definitely/not/here.csv"}));
        assert!(matches!(result, Err(ToolError::Data(_))));
        assert!(fx.registry.dataset_keys().is_empty());
    }

    #[test]
    fn test_missing_arguments_are_invalid() {
        let mut fx = Fixture::new();
        let result = fx.run(&LoadCsvTool, json!({}));
        assert!(matches!(
            result,
            Err(ToolError::InvalidArguments { tool: "load_csv", .. })
        ));
    }

    #[test]
    fn test_summarize_unloaded_dataset() {
        let mut fx = Fixture::new();
        let result = fx
            .run(&SummarizeDataTool, json!({"file_path": "nope.csv"}))
            .unwrap();
        assert_eq!(
            payload_error(&result),
            Some("Dataset not loaded. Call load_csv first.")
        );
    }

    #[test]
    fn test_summarize_loaded_dataset() {
        let mut fx = Fixture::new();
        let path = fx.write("line.csv", LINE);
        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();

        let result = fx.run(&SummarizeDataTool, json!({"file_path": path})).unwrap();
        assert_eq!(result["x"]["count"], 4);
        assert_eq!(result["y"]["mean"], 5.0);
        assert_eq!(result["y"]["max"], 8.0);
    }

    #[test]
    fn test_regression_and_prediction() {
        let mut fx = Fixture::new();
        let path = fx.write("a.csv", LINE);
        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();

        let result = fx
            .run(
                &RunLinearRegressionTool,
                json!({"file_path": path, "x_cols": "x", "y_col": "y"}),
            )
            .unwrap();

        assert_eq!(result["model_name"], "model_a_y");
        let results = &result["results"];
        assert!((results["coef"][0].as_f64().unwrap() - 2.0).abs() < 1e-9);
        assert!(results["intercept"].as_f64().unwrap().abs() < 1e-9);
        assert!((results["R2"].as_f64().unwrap() - 1.0).abs() < 1e-9);
        assert!(results["MSE"].as_f64().unwrap().abs() < 1e-9);

        let model_file = fx.registry.model_file_path("model_a_y");
        assert!(model_file.exists());

        let prediction = fx
            .run(
                &PredictLinearRegressionTool,
                json!({"model_name": "model_a_y", "x_values": [[5]]}),
            )
            .unwrap();
        let predictions = prediction["predictions"].as_array().unwrap();
        assert_eq!(predictions.len(), 1);
        assert!((predictions[0].as_f64().unwrap() - 10.0).abs() < 1e-9);

        // flat vector is a single row
        let flat = fx
            .run(
                &PredictLinearRegressionTool,
                json!({"model_name": "model_a_y", "x_values": [1.5]}),
            )
            .unwrap();
        assert!((flat["predictions"][0].as_f64().unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_model_name_overwrites() {
        let mut fx = Fixture::new();
        let path = fx.write("a.csv", LINE);
        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();

        let args = json!({"file_path": path, "x_cols": ["x"], "y_col": "y"});
        let first = fx.run(&RunLinearRegressionTool, args.clone()).unwrap();
        let second = fx.run(&RunLinearRegressionTool, args).unwrap();

        assert_eq!(first["model_name"], second["model_name"]);
        assert_eq!(fx.registry.model_keys(), vec!["model_a_y"]);
    }

    #[test]
    fn test_explicit_model_name() {
        let mut fx = Fixture::new();
        let path = fx.write("a.csv", LINE);
        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();

        let result = fx
            .run(
                &RunLinearRegressionTool,
                json!({"file_path": path, "x_cols": ["x"], "y_col": "y", "model_name": "doubler"}),
            )
            .unwrap();
        assert_eq!(result["model_name"], "doubler");

        let listed = fx.run(&ListModelsTool, Value::Null).unwrap();
        assert_eq!(listed, json!(["doubler"]));
    }

    #[test]
    fn test_regression_preconditions() {
        let mut fx = Fixture::new();

        let unloaded = fx
            .run(
                &RunLinearRegressionTool,
                json!({"file_path": "a.csv", "x_cols": "x", "y_col": "y"}),
            )
            .unwrap();
        assert_eq!(
            payload_error(&unloaded),
            Some("Dataset not loaded. Call load_csv first.")
        );

        let path = fx.write("a.csv", LINE);
        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();
        let missing = fx
            .run(
                &RunLinearRegressionTool,
                json!({"file_path": path, "x_cols": ["x", "z"], "y_col": "y"}),
            )
            .unwrap();
        assert_eq!(payload_error(&missing), Some("Column 'z' not found in dataset."));
        assert!(fx.registry.model_keys().is_empty());
    }

    #[test]
    fn test_regression_on_text_column_is_error() {
        let mut fx = Fixture::new();
        let path = fx.write("pets.csv", "name,age\nrex,3\nfido,5\n");
        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();

        let result = fx.run(
            &RunLinearRegressionTool,
            json!({"file_path": path, "x_cols": "name", "y_col": "age"}),
        );
        assert!(matches!(result, Err(ToolError::Data(_))));
    }

    #[test]
    fn test_predict_unknown_model() {
        let mut fx = Fixture::new();
        let result = fx
            .run(
                &PredictLinearRegressionTool,
                json!({"model_name": "ghost", "x_values": [1.0]}),
            )
            .unwrap();
        assert_eq!(payload_error(&result), Some("Model 'ghost' not found."));
    }

    #[test]
    fn test_predict_width_mismatch_is_error() {
        let mut fx = Fixture::new();
        let path = fx.write("a.csv", LINE);
        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();
        fx.run(
            &RunLinearRegressionTool,
            json!({"file_path": path, "x_cols": "x", "y_col": "y"}),
        )
        .unwrap();

        let result = fx.run(
            &PredictLinearRegressionTool,
            json!({"model_name": "model_a_y", "x_values": [[1.0, 2.0]]}),
        );
        assert!(matches!(result, Err(ToolError::Data(_))));
    }

    #[test]
    fn test_list_datasets_in_load_order() {
        let mut fx = Fixture::new();
        let b = fx.write("b.csv", LINE);
        let a = fx.write("a.csv", LINE);
        fx.run(&LoadCsvTool, json!({"file_path": b})).unwrap();
        fx.run(&LoadCsvTool, json!({"file_path": a})).unwrap();

        let listed = fx.run(&ListDatasetsTool, json!({})).unwrap();
        assert_eq!(listed, json!([b, a]));
    }

    #[test]
    fn test_scatter_without_y_writes_nothing() {
        let mut fx = Fixture::new();
        let path = fx.write("a.csv", LINE);
        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();

        let tool = PlotDataTool::new(fx.plot_settings());
        let result = fx
            .run(&tool, json!({"file_path": path, "x_col": "x", "plot_type": "scatter"}))
            .unwrap();

        assert_eq!(
            payload_error(&result),
            Some("For scatter plots, both x_col and y_col are required.")
        );
        assert!(!fx.plot_settings().artifact_path("a_scatter.png").exists());
    }

    #[test]
    fn test_scatter_plot_created() {
        let mut fx = Fixture::new();
        let path = fx.write("a.csv", LINE);
        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();

        let tool = PlotDataTool::new(fx.plot_settings());
        let result = fx
            .run(&tool, json!({"file_path": path, "x_col": "x", "y_col": "y"}))
            .unwrap();

        assert_eq!(result["status"], "plot_created");
        assert_eq!(result["plot_url"], "/static/plots/a_scatter.png");
        assert!(fx.plot_settings().artifact_path("a_scatter.png").exists());
    }

    #[test]
    fn test_histogram_plot_and_alias() {
        let mut fx = Fixture::new();
        let path = fx.write("a.csv", LINE);
        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();
        let tool = PlotDataTool::new(fx.plot_settings());

        let missing_x = fx
            .run(&tool, json!({"file_path": path, "plot_type": "histogram"}))
            .unwrap();
        assert_eq!(
            payload_error(&missing_x),
            Some("For histogram plots, x_col is required.")
        );

        let result = fx
            .run(&tool, json!({"file_path": path, "x_col": "y", "plot_type": "hist"}))
            .unwrap();
        assert_eq!(result["plot_url"], "/static/plots/a_histogram.png");
    }

    #[test]
    fn test_plot_preconditions() {
        let mut fx = Fixture::new();
        let tool = PlotDataTool::new(fx.plot_settings());

        let unloaded = fx.run(&tool, json!({"file_path": "a.csv", "x_col": "x"})).unwrap();
        assert_eq!(
            payload_error(&unloaded),
            Some("Dataset not loaded. Call load_csv first.")
        );

        let path = fx.write("a.csv", LINE);
        fx.run(&LoadCsvTool, json!({"file_path": path})).unwrap();

        let bad_kind = fx
            .run(&tool, json!({"file_path": path, "x_col": "x", "plot_type": "pie"}))
            .unwrap();
        assert_eq!(
            payload_error(&bad_kind),
            Some("Invalid plot_type. Choose 'scatter' or 'histogram'.")
        );

        let bad_column = fx
            .run(&tool, json!({"file_path": path, "x_col": "x", "y_col": "w"}))
            .unwrap();
        assert_eq!(payload_error(&bad_column), Some("Column 'w' not found in dataset."));
    }

    #[test]
    fn test_default_model_name() {
        assert_eq!(default_model_name("data/sales.csv", "revenue"), "model_sales_revenue");
        assert_eq!(default_model_name("sales.tsv", "y"), "model_sales.tsv_y");
    }
}
