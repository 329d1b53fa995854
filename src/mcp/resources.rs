//! `salesforce://` resource URIs
//!
//! Resources are read-only views over tools: a schema URI runs
//! `describe_object`, a picklist URI runs `get_picklist_values`.

use super::protocol::ResourceTemplate;
use serde_json::Value;
use std::collections::HashMap;

pub const URI_SCHEME: &str = "salesforce://";
pub const MIME_TYPE: &str = "text/markdown";

/// Parameterised resource templates
pub fn resource_templates() -> Vec<ResourceTemplate> {
    vec![
        ResourceTemplate {
            uri_template: "salesforce://schema/{objectName}".to_string(),
            name: "Object Schema".to_string(),
            description: Some(
                "Fields, relationships and picklists of a Salesforce object".to_string(),
            ),
            mime_type: Some(MIME_TYPE.to_string()),
        },
        ResourceTemplate {
            uri_template: "salesforce://picklist/{objectName}/{fieldName}".to_string(),
            name: "Picklist Values".to_string(),
            description: Some("Configured values of a picklist field".to_string()),
            mime_type: Some(MIME_TYPE.to_string()),
        },
    ]
}

/// Map a resource URI to the tool call that produces it
pub fn route(uri: &str) -> Option<(&'static str, HashMap<String, Value>)> {
    let path = uri.strip_prefix(URI_SCHEME)?;
    let segments: Vec<&str> = path.split('/').collect();

    match segments.as_slice() {
        ["schema", object] if !object.is_empty() => Some((
            "describe_object",
            HashMap::from([("objectName".to_string(), arg(object))]),
        )),
        ["picklist", object, field] if !object.is_empty() && !field.is_empty() => Some((
            "get_picklist_values",
            HashMap::from([
                ("objectName".to_string(), arg(object)),
                ("fieldName".to_string(), arg(field)),
            ]),
        )),
        _ => None,
    }
}

fn arg(value: &str) -> Value {
    Value::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_schema() {
        let (tool, args) = route("salesforce://schema/Account").unwrap();
        assert_eq!(tool, "describe_object");
        assert_eq!(args["objectName"], "Account");
    }

    #[test]
    fn test_route_picklist() {
        let (tool, args) = route("salesforce://picklist/Case/Status").unwrap();
        assert_eq!(tool, "get_picklist_values");
        assert_eq!(args["objectName"], "Case");
        assert_eq!(args["fieldName"], "Status");
    }

    #[test]
    fn test_route_rejects_unknown_uris() {
        assert!(route("salesforce://schema/").is_none());
        assert!(route("salesforce://picklist/Case").is_none());
        assert!(route("salesforce://records/Account").is_none());
        assert!(route("file:///etc/passwd").is_none());
    }

    #[test]
    fn test_templates_match_routes() {
        for template in resource_templates() {
            let uri = template
                .uri_template
                .replace("{objectName}", "Case")
                .replace("{fieldName}", "Status");
            assert!(route(&uri).is_some(), "{} does not route", uri);
        }
    }
}
