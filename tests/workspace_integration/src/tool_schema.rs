//! Tool schema validity tests.
//!
//! Every tool's parameter schema must be a JSON object schema, and its
//! required fields must match what the parameter types actually demand.

use artifact_mcp_host::HostArtifactParams;
use artifact_mcp_tts::{ListVoicesParams, TextToSpeechParams};
use schemars::JsonSchema;
use serde_json::Value;

/// Render the schema the servers advertise for `T`.
pub fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null)
}

/// Validates that a JSON schema has the structure of a tool input schema.
pub fn validate_json_schema(schema: &Value) -> Result<(), String> {
    let obj = schema
        .as_object()
        .ok_or_else(|| "Schema must be an object".to_string())?;

    if let Some(type_val) = obj.get("type") {
        if type_val != "object" {
            return Err(format!("Expected type 'object', got {:?}", type_val));
        }
    }

    let properties = match obj.get("properties") {
        Some(Value::Object(props)) => props,
        Some(_) => return Err("Properties must be an object".to_string()),
        None => return Ok(()),
    };

    if let Some(required) = obj.get("required") {
        let names = required
            .as_array()
            .ok_or_else(|| "Required must be an array".to_string())?;
        for name in names {
            let name = name.as_str().ok_or_else(|| "Required entries must be strings".to_string())?;
            if !properties.contains_key(name) {
                return Err(format!("Required field '{}' has no property", name));
            }
        }
    }

    Ok(())
}

fn required_fields(schema: &Value) -> Vec<String> {
    schema["required"]
        .as_array()
        .map(|names| names.iter().filter_map(|n| n.as_str().map(String::from)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_artifact_schema_requires_only_the_filename() {
        let schema = schema_value::<HostArtifactParams>();
        validate_json_schema(&schema).unwrap();
        assert_eq!(required_fields(&schema), vec!["artifact_filename".to_string()]);
        for field in ["artifact_filename", "custom_filename", "base_url"] {
            assert!(schema["properties"][field].is_object(), "{}", field);
        }
    }

    #[test]
    fn text_to_speech_schema_has_all_inputs_optional() {
        let schema = schema_value::<TextToSpeechParams>();
        validate_json_schema(&schema).unwrap();
        assert!(required_fields(&schema).is_empty());
        for field in ["text", "text_file", "voice", "output_format", "output_filename"] {
            assert!(schema["properties"][field].is_object(), "{}", field);
        }
    }

    #[test]
    fn text_to_speech_schema_documents_defaults() {
        let schema = schema_value::<TextToSpeechParams>();
        assert_eq!(schema["properties"]["voice"]["default"], "af_sarah");
        assert_eq!(schema["properties"]["output_format"]["default"], "mp3");
    }

    #[test]
    fn list_voices_schema_is_valid() {
        let schema = schema_value::<ListVoicesParams>();
        validate_json_schema(&schema).unwrap();
        assert!(required_fields(&schema).is_empty());
        assert!(schema["properties"]["language"].is_object());
        assert!(schema["properties"]["gender"].is_object());
    }

    #[test]
    fn validator_rejects_dangling_required_field() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "required": ["b"]
        });
        assert!(validate_json_schema(&schema).is_err());
    }

    #[test]
    fn validator_rejects_non_object_schema() {
        assert!(validate_json_schema(&serde_json::json!({ "type": "string" })).is_err());
        assert!(validate_json_schema(&serde_json::json!([])).is_err());
    }
}
