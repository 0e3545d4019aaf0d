//! Demo tool implementations for agentweave.
//!
//! Tools give the agents the ability to act: look up a stock price, fetch
//! company news, and write or read files, return manifests and claim
//! reports on a simulated filesystem.

pub mod filesystem;
pub mod market;

use agentweave_core::error::ToolError;
use agentweave_core::tool::ToolRegistry;

pub use filesystem::{
    AdjudicationReportTool, ReadFileTool, ReturnManifestTool, SimulatedFs, WriteFileTool,
};
pub use market::{NewsTool, StockPriceTool};

/// Registry with the two market data tools.
pub fn market_registry() -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(StockPriceTool))?;
    registry.register(Box::new(NewsTool))?;
    Ok(registry)
}

/// Registry with every demo tool, backed by the given simulated filesystem.
pub fn demo_registry(fs: SimulatedFs) -> Result<ToolRegistry, ToolError> {
    let mut registry = market_registry()?;
    registry.register(Box::new(WriteFileTool::new(fs.clone())))?;
    registry.register(Box::new(ReadFileTool::new(fs.clone())))?;
    registry.register(Box::new(ReturnManifestTool::new(fs.clone())))?;
    registry.register(Box::new(AdjudicationReportTool::new(fs)))?;
    Ok(registry)
}
