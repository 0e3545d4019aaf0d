//! Market data tools: stub price and news lookups.
//!
//! Both return deterministic mock JSON so the tool agent and the ReAct
//! agent can run end-to-end without network access. They accept the
//! ticker either as `ticker` (native tool calls) or as `input` (the
//! ReAct text protocol passes its bracketed argument under that key).

use async_trait::async_trait;
use agentweave_core::error::ToolError;
use agentweave_core::tool::Tool;

/// Mock quote returned for every ticker.
pub const MOCK_PRICE: f64 = 215.40;

fn ticker_argument(arguments: &serde_json::Value) -> Result<String, ToolError> {
    arguments["ticker"]
        .as_str()
        .or_else(|| arguments["input"].as_str())
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ToolError::InvalidArguments("Missing 'ticker' argument".into()))
}

fn ticker_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "ticker": {
                "type": "string",
                "description": "The stock ticker (e.g., AAPL)"
            }
        },
        "required": ["ticker"]
    })
}

pub struct StockPriceTool;

#[async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn description(&self) -> &str {
        "Get the current stock price for a given ticker symbol."
    }

    fn input_schema(&self) -> serde_json::Value {
        ticker_schema()
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let ticker = ticker_argument(&arguments)?;
        Ok(serde_json::json!({
            "ticker": ticker,
            "price": MOCK_PRICE,
            "currency": "USD"
        })
        .to_string())
    }
}

pub struct NewsTool;

#[async_trait]
impl Tool for NewsTool {
    fn name(&self) -> &str {
        "get_news"
    }

    fn description(&self) -> &str {
        "Search for recent news about a company."
    }

    fn input_schema(&self) -> serde_json::Value {
        ticker_schema()
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let ticker = ticker_argument(&arguments)?;
        Ok(serde_json::json!({
            "ticker": ticker,
            "news": "Earnings beat expectations. Analysts bullish."
        })
        .to_string())
    }
}
