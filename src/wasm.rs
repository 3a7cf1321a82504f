//! WASM bindings for flow-synth.
//!
//! Every function takes and returns JSON strings so the editor shell can
//! exchange plain objects.

use wasm_bindgen::prelude::*;

use crate::{Engine, FlowGraph};

fn to_js(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}

/// Parse flowchart text with the built-in catalogs; returns the draft graph.
#[wasm_bindgen(js_name = "parseFlowchart")]
pub fn parse_flowchart(src: &str) -> Result<String, JsError> {
    let draft = Engine::default().parse(src).map_err(to_js)?;
    serde_json::to_string(&draft).map_err(to_js)
}

/// Synthesize flowchart text onto an existing graph.
///
/// `existing_json` may be empty for a blank canvas.
#[wasm_bindgen(js_name = "synthesizeFlowchart")]
pub fn synthesize_flowchart(src: &str, existing_json: &str) -> Result<String, JsError> {
    let existing: FlowGraph = if existing_json.trim().is_empty() {
        FlowGraph::default()
    } else {
        serde_json::from_str(existing_json).map_err(to_js)?
    };
    let graph = Engine::default()
        .synthesize_flowchart(src, &existing)
        .map_err(to_js)?;
    serde_json::to_string(&graph).map_err(to_js)
}

/// Run both graph validators; returns `{connectivity, convergence}`.
#[wasm_bindgen(js_name = "validateGraph")]
pub fn validate_graph(graph_json: &str) -> Result<String, JsError> {
    let graph: FlowGraph = serde_json::from_str(graph_json).map_err(to_js)?;
    serde_json::to_string(&Engine::default().validate(&graph)).map_err(to_js)
}
