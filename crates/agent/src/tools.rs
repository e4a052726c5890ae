//! Tool definitions offered to the model.

use serde_json::json;

use crate::llm::ToolSpec;

pub const PROFILE_TOOL_NAME: &str = "record_investment_profile";

/// The structured-output contract for profile extraction. The schema
/// mirrors `InvestmentProfile` exactly, closed vocabulary included.
pub fn profile_tool() -> ToolSpec {
    ToolSpec {
        name: PROFILE_TOOL_NAME.to_string(),
        description: "Record the customer's investment profile once it can be derived from \
                      their answers. Use only the listed values; omit optional fields the \
                      customer did not address."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "amount": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Investment amount in whole euros. 0 when no figure was given."
                },
                "horizon": {
                    "type": "string",
                    "enum": ["short_term", "medium_term", "long_term"]
                },
                "risk": {
                    "type": "string",
                    "enum": ["no_risk", "medium_risk", "high_risk"]
                },
                "cost_acceptance": {
                    "type": "string",
                    "enum": ["yes", "no"],
                    "description": "Only when the customer took a stance on fees."
                },
                "sustainability": {
                    "type": "string",
                    "enum": ["yes", "no"]
                }
            },
            "required": ["horizon", "risk", "sustainability"],
            "additionalProperties": false
        }),
    }
}
