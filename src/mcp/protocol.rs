//! MCP protocol response helpers.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::output::{render, OutputFormat};

/// Single-item response that serializes as the raw inner value.
///
/// Use this for tool responses that return a single object.
/// The inner value is serialized directly without wrapping.
///
/// # Example
///
/// ```ignore
/// Response(tree, None).into()  // JSON output (default)
/// Response(tree, Some(OutputFormat::Toon)).into()  // TOON output
/// ```
pub struct Response<T>(pub T, pub Option<OutputFormat>);

impl<T: Serialize> Serialize for Response<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T: Serialize> From<Response<T>> for Result<CallToolResult, rmcp::model::ErrorData> {
    fn from(response: Response<T>) -> Self {
        match response.1.unwrap_or_default() {
            OutputFormat::Json => Ok(CallToolResult::success(vec![Content::json(
                &response.0,
            )?])),
            OutputFormat::Toon => {
                let toon = render(&response.0, OutputFormat::Toon)?;
                Ok(CallToolResult::success(vec![Content::text(toon)]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Level {
        token_id: u64,
        depth: u32,
    }

    #[test]
    fn test_json_response_is_success() {
        let result: Result<CallToolResult, rmcp::model::ErrorData> = Response(
            Level {
                token_id: 3,
                depth: 2,
            },
            None,
        )
        .into();
        let result = result.unwrap();
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.content.len(), 1);
    }

    #[test]
    fn test_toon_response_carries_fields() {
        let result: Result<CallToolResult, rmcp::model::ErrorData> = Response(
            Level {
                token_id: 3,
                depth: 2,
            },
            Some(OutputFormat::Toon),
        )
        .into();
        let wire = serde_json::to_string(&result.unwrap()).unwrap();
        assert!(wire.contains("depth"));
        assert!(wire.contains("token_id"));
    }
}
