//! Simulated filesystem tools.
//!
//! Writes land in an in-process map shared by the write, read and manifest
//! tools; nothing touches the real disk.

use async_trait::async_trait;
use agentweave_core::error::ToolError;
use agentweave_core::tool::Tool;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::info;

/// The shared backing store for the simulated filesystem.
#[derive(Clone, Default)]
pub struct SimulatedFs {
    files: Arc<RwLock<HashMap<String, String>>>,
}

impl SimulatedFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, filename: &str, content: &str) {
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(filename.to_string(), content.to_string());
    }

    /// Contents of a previously written file.
    pub fn read(&self, filename: &str) -> Option<String> {
        self.files
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(filename)
            .cloned()
    }

    /// Names of all written files, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .files
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

fn string_arg<'a>(arguments: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    arguments[key]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{key}' argument")))
}

pub struct WriteFileTool {
    fs: SimulatedFs,
}

impl WriteFileTool {
    pub fn new(fs: SimulatedFs) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_to_filesystem"
    }

    fn description(&self) -> &str {
        "Write a file to the local filesystem. Use this to save logs, reports, or data."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filename": { "type": "string", "description": "The file name to write to" },
                "content": { "type": "string", "description": "The content to write" }
            },
            "required": ["filename", "content"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let filename = string_arg(&arguments, "filename")?;
        let content = string_arg(&arguments, "content")?;
        info!(filename, bytes = content.len(), "Writing simulated file");
        self.fs.write(filename, content);
        Ok(format!(
            "Successfully wrote {} bytes to {filename}.",
            content.len()
        ))
    }
}

pub struct ReadFileTool {
    fs: SimulatedFs,
}

impl ReadFileTool {
    pub fn new(fs: SimulatedFs) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_from_filesystem"
    }

    fn description(&self) -> &str {
        "Read a file from the local filesystem."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filename": { "type": "string", "description": "The file name to read" }
            },
            "required": ["filename"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let filename = string_arg(&arguments, "filename")?;
        let content = self
            .fs
            .read(filename)
            .unwrap_or_else(|| "[Sample Data]".to_string());
        Ok(format!("Content of {filename}: {content}"))
    }
}

/// Records a return decision as `<order_id>.txt`.
pub struct ReturnManifestTool {
    fs: SimulatedFs,
}

impl ReturnManifestTool {
    pub fn new(fs: SimulatedFs) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl Tool for ReturnManifestTool {
    fn name(&self) -> &str {
        "write_return_manifest"
    }

    fn description(&self) -> &str {
        "Save the return decision for an order. Use this for finalizing returns."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "order_id": { "type": "string" },
                "decision": { "type": "string", "description": "e.g. APPROVED or REJECTED" },
                "notes": { "type": "string" }
            },
            "required": ["order_id", "decision", "notes"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let order_id = string_arg(&arguments, "order_id")?;
        let decision = string_arg(&arguments, "decision")?;
        let notes = arguments["notes"].as_str().unwrap_or_default();
        let filename = format!("{order_id}.txt");
        info!(%filename, decision, "Writing return manifest");
        self.fs
            .write(&filename, &format!("decision: {decision}\nnotes: {notes}\n"));
        Ok(format!("Successfully recorded {decision} for Order {order_id}."))
    }
}

/// Saves a claim adjudication report as `<claim_id>.txt`.
pub struct AdjudicationReportTool {
    fs: SimulatedFs,
}

impl AdjudicationReportTool {
    pub fn new(fs: SimulatedFs) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl Tool for AdjudicationReportTool {
    fn name(&self) -> &str {
        "save_adjudication_report"
    }

    fn description(&self) -> &str {
        "Saves the final claim report to the enterprise filesystem."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "claim_id": { "type": "string" },
                "content": { "type": "string", "description": "The adjudication report" }
            },
            "required": ["claim_id", "content"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let claim_id = string_arg(&arguments, "claim_id")?;
        let content = string_arg(&arguments, "content")?;
        let filename = format!("{claim_id}.txt");
        info!(%filename, "Saving adjudication report");
        self.fs.write(&filename, content);
        Ok(format!("Report saved successfully for claim {claim_id}."))
    }
}
