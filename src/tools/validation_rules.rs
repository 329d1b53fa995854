//! Validation rule inspection through the Tooling API

use crate::salesforce::soql::quote;
use crate::salesforce::SalesforceApi;
use crate::tools::output::{truncate, yes_no, Table, ToolOutput, ToolResult};
use crate::tools::params::ObjectParams;
use serde::{Deserialize, Serialize};

const DESCRIPTION_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationRule {
    #[serde(rename(deserialize = "Id"), default)]
    id: Option<String>,
    #[serde(rename(deserialize = "ValidationName"), default)]
    name: String,
    #[serde(rename(deserialize = "Active"), default)]
    active: bool,
    #[serde(rename(deserialize = "ErrorMessage"), default)]
    error_message: Option<String>,
    #[serde(rename(deserialize = "ErrorDisplayField"), default)]
    error_display_field: Option<String>,
    #[serde(rename(deserialize = "Description"), default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct RulesPayload<'a> {
    object: &'a str,
    rules: Vec<ValidationRule>,
}

/// Filter on `EntityDefinition` for an object API name, with any suffix or namespace
fn entity_filter(object_name: &str) -> String {
    format!("EntityDefinition.QualifiedApiName = {}", quote(object_name))
}

/// All validation rules of an object, active or not, ordered by name
pub async fn get_validation_rules(api: &dyn SalesforceApi, params: &ObjectParams) -> ToolResult {
    tracing::info!("Retrieving validation rules for object: {}", params.object_name);

    let soql = format!(
        "SELECT Id, ValidationName, Active, Description, EntityDefinition.DeveloperName, \
         ErrorDisplayField, ErrorMessage FROM ValidationRule WHERE {} ORDER BY ValidationName",
        entity_filter(&params.object_name)
    );
    let result = api.tooling_query(&soql).await?;

    let rules = result
        .records
        .iter()
        .map(ValidationRule::deserialize)
        .collect::<Result<Vec<_>, _>>()?;

    let text = if rules.is_empty() {
        tracing::info!("No validation rules found for {}", params.object_name);
        format!("No validation rules found for {}.", params.object_name)
    } else {
        tracing::info!(
            "Found {} validation rules for {}",
            rules.len(),
            params.object_name
        );
        let mut table = Table::new(&["Name", "Active", "Error Message", "Error Field", "Description"]);
        for rule in &rules {
            table.row([
                rule.name.clone(),
                yes_no(rule.active).to_string(),
                rule.error_message.clone().unwrap_or_else(|| "N/A".to_string()),
                rule.error_display_field.clone().unwrap_or_else(|| "N/A".to_string()),
                rule.description
                    .as_deref()
                    .map(|d| truncate(d, DESCRIPTION_MAX_CHARS))
                    .unwrap_or_else(|| "N/A".to_string()),
            ]);
        }
        format!(
            "Found {} validation rules for {}:\n\n{}",
            rules.len(),
            params.object_name,
            table.render()
        )
    };

    ToolOutput::new(
        &RulesPayload {
            object: &params.object_name,
            rules,
        },
        text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeOrg;
    use serde_json::json;
    use tokio_test::assert_ok;

    fn params(object_name: &str) -> ObjectParams {
        ObjectParams {
            object_name: object_name.to_string(),
        }
    }

    #[test]
    fn test_entity_filter() {
        for name in ["Account", "Invoice__c", "acme__Invoice_Line__c", "Rate__mdt", "Order_Event__e", "acme__Sync__e"] {
            assert_eq!(
                entity_filter(name),
                format!("EntityDefinition.QualifiedApiName = '{}'", name)
            );
        }
    }

    #[tokio::test]
    async fn test_metadata_type_rules_query() {
        let org = FakeOrg::new();
        assert_ok!(get_validation_rules(&org, &params("acme__Rate__mdt")).await);
        let calls = org.calls_matching("tooling_query");
        assert!(calls[0].contains("WHERE EntityDefinition.QualifiedApiName = 'acme__Rate__mdt'"));
    }

    #[tokio::test]
    async fn test_rules_are_listed() {
        let long = "x".repeat(140);
        let org = FakeOrg::new().on_tooling_query(
            "FROM ValidationRule",
            vec![
                json!({
                    "attributes": {"type": "ValidationRule"},
                    "Id": "03d000000000001",
                    "ValidationName": "Amount_Positive",
                    "Active": true,
                    "Description": long,
                    "ErrorDisplayField": "Amount",
                    "ErrorMessage": "Amount must be\npositive"
                }),
                json!({
                    "Id": "03d000000000002",
                    "ValidationName": "Close_Date_Set",
                    "Active": false,
                    "Description": null,
                    "ErrorDisplayField": null,
                    "ErrorMessage": "Close date required"
                }),
            ],
        );

        let out = assert_ok!(get_validation_rules(&org, &params("Opportunity")).await);
        let calls = org.calls_matching("tooling_query");
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("WHERE EntityDefinition.QualifiedApiName = 'Opportunity' ORDER BY ValidationName"));

        assert_eq!(out.structured["rules"][0]["name"], "Amount_Positive");
        assert_eq!(out.structured["rules"][0]["description"].as_str().unwrap().len(), 140);
        assert_eq!(out.structured["rules"][1]["active"], false);
        assert!(out.text.starts_with("Found 2 validation rules for Opportunity:"));
        assert!(out.text.contains("| Amount_Positive | Yes | Amount must be positive | Amount |"));
        assert!(out.text.contains(&format!("{}...", "x".repeat(97))));
        assert!(out.text.contains("| Close_Date_Set | No | Close date required | N/A | N/A |"));
    }

    #[tokio::test]
    async fn test_no_rules() {
        let out = assert_ok!(get_validation_rules(&FakeOrg::new(), &params("Lead")).await);
        assert_eq!(out.structured["rules"], json!([]));
        assert_eq!(out.text, "No validation rules found for Lead.");
    }
}
