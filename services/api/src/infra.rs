use agrifair::workflows::grants::{SignalImportError, SignalTable};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load exported model outputs, or stand in an unloaded table when none are configured.
pub(crate) fn load_signal_table(path: Option<&Path>) -> Result<SignalTable, SignalImportError> {
    match path {
        Some(path) => {
            let table = SignalTable::from_path(path)?;
            info!(path = %path.display(), "loaded upstream signal table");
            Ok(table)
        }
        None => {
            warn!("no signal table configured; predictions need an inline approval_probability");
            Ok(SignalTable::unloaded())
        }
    }
}

/// Read flat applicant rows keyed by header name. Blank cells are left out so they take the
/// record defaults.
pub(crate) fn read_applicant_rows<R: Read>(reader: R) -> std::io::Result<Vec<Map<String, Value>>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, value)| !value.is_empty())
            .map(|(header, value)| (header.to_string(), Value::String(value.to_string())))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}
