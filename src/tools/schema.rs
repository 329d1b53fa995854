//! Schema discovery tools
//!
//! Object search, describes, relationship listing, field filtering and
//! picklist values. All of them read the global or per-object describe.

use crate::salesforce::{
    ChildRelationship, FieldDescribe, PicklistEntry, RecordTypeInfo, SObjectDescribe,
    SObjectSummary, SalesforceApi,
};
use crate::tools::error::ToolError;
use crate::tools::output::{escape_cell, yes_no, Table, ToolOutput, ToolResult};
use crate::tools::params::{
    DescribeObjectParams, DescribeObjectWithApiParams, FieldsByTypeParams, ObjectParams,
    PicklistParams, SearchObjectsParams,
};
use serde::Serialize;
use std::collections::BTreeMap;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Serialize)]
struct SearchPayload<'a> {
    query: &'a str,
    matches: Vec<&'a SObjectSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ObjectSummary<'a> {
    name: &'a str,
    label: &'a str,
    label_plural: Option<&'a str>,
    key_prefix: Option<&'a str>,
    custom: bool,
    createable: bool,
    updateable: bool,
    deletable: bool,
}

impl<'a> ObjectSummary<'a> {
    fn of(describe: &'a SObjectDescribe) -> Self {
        Self {
            name: &describe.name,
            label: &describe.label,
            label_plural: describe.label_plural.as_deref(),
            key_prefix: describe.key_prefix.as_deref(),
            custom: describe.custom,
            createable: describe.createable,
            updateable: describe.updateable,
            deletable: describe.deletable,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldSummary<'a> {
    name: &'a str,
    label: &'a str,
    #[serde(rename = "type")]
    field_type: &'a str,
    required: bool,
    unique: bool,
    external_id: bool,
}

impl<'a> From<&'a FieldDescribe> for FieldSummary<'a> {
    fn from(field: &'a FieldDescribe) -> Self {
        Self {
            name: &field.name,
            label: &field.label,
            field_type: &field.field_type,
            required: field.is_required(),
            unique: field.unique,
            external_id: field.external_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReferenceField<'a> {
    name: &'a str,
    label: &'a str,
    reference_to: &'a [String],
    relationship_name: Option<&'a str>,
    relationship_type: &'static str,
}

impl<'a> From<&'a FieldDescribe> for ReferenceField<'a> {
    fn from(field: &'a FieldDescribe) -> Self {
        Self {
            name: &field.name,
            label: &field.label,
            reference_to: &field.reference_to,
            relationship_name: field.relationship_name.as_deref(),
            // Non-nillable references are master-detail
            relationship_type: if field.nillable {
                "Lookup"
            } else {
                "Master-Detail"
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct PicklistField<'a> {
    name: &'a str,
    label: &'a str,
    values: Vec<PicklistValue<'a>>,
}

#[derive(Debug, Serialize)]
struct PicklistValue<'a> {
    value: &'a str,
    label: &'a str,
    default: bool,
    active: bool,
}

impl<'a> From<&'a PicklistEntry> for PicklistValue<'a> {
    fn from(entry: &'a PicklistEntry) -> Self {
        Self {
            value: &entry.value,
            label: &entry.label,
            default: entry.default_value,
            active: entry.active,
        }
    }
}

impl<'a> From<&'a FieldDescribe> for PicklistField<'a> {
    fn from(field: &'a FieldDescribe) -> Self {
        Self {
            name: &field.name,
            label: &field.label,
            values: field.picklist_values.iter().map(PicklistValue::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChildRelationshipView<'a> {
    child_object: &'a str,
    relationship_name: Option<&'a str>,
    field: &'a str,
    cascade_delete: bool,
}

impl<'a> From<&'a ChildRelationship> for ChildRelationshipView<'a> {
    fn from(rel: &'a ChildRelationship) -> Self {
        Self {
            child_object: &rel.child_sobject,
            relationship_name: rel.relationship_name.as_deref().filter(|n| !n.is_empty()),
            field: &rel.field,
            cascade_delete: rel.cascade_delete,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordTypeView<'a> {
    record_type_id: Option<&'a str>,
    name: &'a str,
    developer_name: Option<&'a str>,
    default: bool,
    active: bool,
}

impl<'a> From<&'a RecordTypeInfo> for RecordTypeView<'a> {
    fn from(rt: &'a RecordTypeInfo) -> Self {
        Self {
            record_type_id: rt.record_type_id.as_deref(),
            name: &rt.name,
            developer_name: rt.developer_name.as_deref(),
            default: rt.default_record_type_mapping,
            active: rt.available,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DescribePayload<'a> {
    object: ObjectSummary<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<BTreeMap<&'a str, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldSummary<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_fields: Option<Vec<ReferenceField<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    picklist_fields: Option<Vec<PicklistField<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    child_relationships: Option<Vec<ChildRelationshipView<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    record_types: Option<Vec<RecordTypeView<'a>>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelationshipsPayload<'a> {
    object: &'a str,
    label: &'a str,
    parent_relationships: Vec<ReferenceField<'a>>,
    child_relationships: Vec<ChildRelationshipView<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldDetail<'a> {
    name: &'a str,
    label: &'a str,
    #[serde(rename = "type")]
    field_type: &'a str,
    required: bool,
    updateable: bool,
    custom: bool,
    inline_help_text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldsByTypePayload<'a> {
    object: &'a str,
    field_type: Option<&'a str>,
    fields: Vec<FieldDetail<'a>>,
}

#[derive(Debug, Serialize)]
struct PicklistPayload<'a> {
    object: &'a str,
    field: &'a str,
    label: &'a str,
    values: Vec<PicklistValue<'a>>,
}

/// Find objects whose API name or label contains any of the search terms
pub async fn search_objects(api: &dyn SalesforceApi, params: &SearchObjectsParams) -> ToolResult {
    tracing::info!("Searching for Salesforce objects matching '{}'", params.query);

    let global = api.describe_global().await?;
    let terms: Vec<String> = params
        .query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    let matches: Vec<&SObjectSummary> = global
        .sobjects
        .iter()
        .filter(|obj| {
            let name = obj.name.to_lowercase();
            let label = obj.label.to_lowercase();
            terms
                .iter()
                .any(|t| name.contains(t.as_str()) || label.contains(t.as_str()))
        })
        .collect();

    tracing::info!("Found {} objects matching '{}'", matches.len(), params.query);

    let text = if matches.is_empty() {
        format!("No Salesforce objects found matching '{}'.", params.query)
    } else {
        let mut table = Table::new(&["API Name", "Label", "Custom Object"]);
        for obj in &matches {
            table.row([obj.name.as_str(), obj.label.as_str(), yes_no(obj.custom)]);
        }
        format!(
            "Found {} Salesforce objects matching '{}':\n\n{}",
            matches.len(),
            params.query,
            table.render()
        )
    };

    ToolOutput::new(
        &SearchPayload {
            query: &params.query,
            matches,
        },
        text,
    )
}

/// Object summary and, optionally, fields, relationships and picklists
pub async fn describe_object(api: &dyn SalesforceApi, params: &DescribeObjectParams) -> ToolResult {
    tracing::info!("Describing Salesforce object: {}", params.object_name);

    let raw = api.describe_sobject(&params.object_name).await?;
    let describe = SObjectDescribe::from_value(&raw)?;
    let details = params.include_field_details();

    let mut text = render_summary(&describe);
    text.push_str(&format!(
        "**Createable:** {}\n**Updateable:** {}\n**Deletable:** {}\n\n",
        describe.createable, describe.updateable, describe.deletable
    ));
    if details {
        text.push_str(&render_fields(&describe, false));
    }

    let payload = DescribePayload {
        object: ObjectSummary::of(&describe),
        properties: None,
        fields: details.then(|| describe.fields.iter().map(FieldSummary::from).collect()),
        reference_fields: details
            .then(|| describe.reference_fields().map(ReferenceField::from).collect()),
        picklist_fields: details
            .then(|| describe.picklist_fields().map(PicklistField::from).collect()),
        child_relationships: None,
        record_types: None,
    };
    ToolOutput::new(&payload, text)
}

/// Full describe with every boolean property, child relationships and record types
pub async fn describe_object_with_api(
    api: &dyn SalesforceApi,
    params: &DescribeObjectWithApiParams,
) -> ToolResult {
    tracing::info!(
        "Describing Salesforce object {} with direct API call",
        params.object_name
    );

    let raw = api.describe_sobject(&params.object_name).await?;
    if params.raw_json() {
        let text = serde_json::to_string_pretty(&raw)?;
        return Ok(ToolOutput {
            text,
            structured: raw,
        });
    }

    let describe = SObjectDescribe::from_value(&raw)?;
    let properties: BTreeMap<&str, bool> = raw
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_bool().map(|b| (k.as_str(), b)))
                .collect()
        })
        .unwrap_or_default();

    let mut text = render_summary(&describe);
    text.push_str("\n## Object Properties\n\n");
    let mut table = Table::new(&["Property", "Value"]);
    for (prop, value) in &properties {
        table.row([prop.to_string(), value.to_string()]);
    }
    text.push_str(&table.render());
    text.push('\n');
    text.push_str(&render_fields(&describe, true));

    if !describe.child_relationships.is_empty() {
        text.push_str("\n## Child Relationships\n\n");
        text.push_str(&render_child_relationships(&describe.child_relationships));
    }

    if !describe.record_type_infos.is_empty() {
        text.push_str("\n## Record Types\n\n");
        let mut table = Table::new(&["Record Type ID", "Name", "Developer Name", "Default", "Active"]);
        for rt in &describe.record_type_infos {
            table.row([
                rt.record_type_id.as_deref().unwrap_or(NOT_AVAILABLE),
                rt.name.as_str(),
                rt.developer_name.as_deref().unwrap_or(NOT_AVAILABLE),
                yes_no(rt.default_record_type_mapping),
                yes_no(rt.available),
            ]);
        }
        text.push_str(&table.render());
    }

    let payload = DescribePayload {
        object: ObjectSummary::of(&describe),
        properties: Some(properties),
        fields: Some(describe.fields.iter().map(FieldSummary::from).collect()),
        reference_fields: Some(describe.reference_fields().map(ReferenceField::from).collect()),
        picklist_fields: Some(describe.picklist_fields().map(PicklistField::from).collect()),
        child_relationships: Some(
            describe
                .child_relationships
                .iter()
                .map(ChildRelationshipView::from)
                .collect(),
        ),
        record_types: Some(
            describe
                .record_type_infos
                .iter()
                .map(RecordTypeView::from)
                .collect(),
        ),
    };
    ToolOutput::new(&payload, text)
}

/// Parent (lookup / master-detail) and child relationships of an object
pub async fn describe_relationship_fields(
    api: &dyn SalesforceApi,
    params: &ObjectParams,
) -> ToolResult {
    tracing::info!("Describing relationship fields for object: {}", params.object_name);

    let raw = api.describe_sobject(&params.object_name).await?;
    let describe = SObjectDescribe::from_value(&raw)?;

    let parents: Vec<ReferenceField> = describe.reference_fields().map(ReferenceField::from).collect();
    let children: Vec<ChildRelationshipView> = describe
        .child_relationships
        .iter()
        .map(ChildRelationshipView::from)
        .collect();

    tracing::debug!(
        "Found {} parent and {} child relationships",
        parents.len(),
        children.len()
    );

    let mut text = format!(
        "# Relationship Fields for {} ({})\n\n",
        describe.label, describe.name
    );
    if parents.is_empty() {
        text.push_str("No parent relationship fields found.\n\n");
    } else {
        text.push_str("## Lookup/Master-Detail Fields (Parent Relationships)\n\n");
        let mut table = Table::new(&[
            "API Name",
            "Field Label",
            "Related To",
            "Relationship Name",
            "Type",
        ]);
        for p in &parents {
            table.row([
                p.name.to_string(),
                p.label.to_string(),
                p.reference_to.join(", "),
                p.relationship_name.unwrap_or(NOT_AVAILABLE).to_string(),
                p.relationship_type.to_string(),
            ]);
        }
        text.push_str(&table.render());
    }

    if children.is_empty() {
        text.push_str("\nNo child relationships found.\n");
    } else {
        text.push_str("\n## Child Relationships\n\n");
        text.push_str(&render_child_relationships(&describe.child_relationships));
    }

    let payload = RelationshipsPayload {
        object: &describe.name,
        label: &describe.label,
        parent_relationships: parents,
        child_relationships: children,
    };
    ToolOutput::new(&payload, text)
}

/// Fields sorted by API name, optionally restricted to one type
pub async fn get_fields_by_type(api: &dyn SalesforceApi, params: &FieldsByTypeParams) -> ToolResult {
    let field_type = params.field_type.as_deref();
    tracing::info!(
        "Getting fields for object {}{}",
        params.object_name,
        field_type.map(|t| format!(" of type {}", t)).unwrap_or_default()
    );

    let raw = api.describe_sobject(&params.object_name).await?;
    let describe = SObjectDescribe::from_value(&raw)?;

    let mut fields: Vec<&FieldDescribe> = describe
        .fields
        .iter()
        .filter(|f| field_type.map_or(true, |t| f.field_type.eq_ignore_ascii_case(t)))
        .collect();
    fields.sort_by(|a, b| a.name.cmp(&b.name));

    let text = match field_type {
        Some(t) if fields.is_empty() => format!(
            "No fields of type '{}' found on object '{}'.",
            t, params.object_name
        ),
        _ => {
            let heading = match field_type {
                Some(t) => format!("{} Fields", capitalize(t)),
                None => "All Fields".to_string(),
            };
            let mut table = Table::new(&[
                "API Name",
                "Label",
                "Type",
                "Required",
                "Updateable",
                "Custom",
                "Description",
            ]);
            for f in &fields {
                table.row([
                    f.name.as_str(),
                    f.label.as_str(),
                    f.field_type.as_str(),
                    yes_no(f.is_required()),
                    yes_no(f.updateable),
                    yes_no(f.custom),
                    f.inline_help_text.as_deref().unwrap_or(""),
                ]);
            }
            format!(
                "# {} on {} ({})\n\n{}",
                heading,
                describe.label,
                describe.name,
                table.render()
            )
        }
    };

    tracing::info!("Returning {} fields for {}", fields.len(), params.object_name);

    let payload = FieldsByTypePayload {
        object: &describe.name,
        field_type,
        fields: fields
            .iter()
            .map(|f| FieldDetail {
                name: &f.name,
                label: &f.label,
                field_type: &f.field_type,
                required: f.is_required(),
                updateable: f.updateable,
                custom: f.custom,
                inline_help_text: f.inline_help_text.as_deref(),
            })
            .collect(),
    };
    ToolOutput::new(&payload, text)
}

/// Configured values of a picklist field, in order
pub async fn get_picklist_values(api: &dyn SalesforceApi, params: &PicklistParams) -> ToolResult {
    tracing::info!(
        "Getting picklist values for {}.{}",
        params.object_name,
        params.field_name
    );

    let raw = api.describe_sobject(&params.object_name).await?;
    let describe = SObjectDescribe::from_value(&raw)?;

    let field = describe.field(&params.field_name).ok_or_else(|| {
        tracing::warn!(
            "Field '{}' not found on object '{}'",
            params.field_name,
            params.object_name
        );
        ToolError::unresolved(format!(
            "Field '{}' not found on object '{}'.",
            params.field_name, params.object_name
        ))
    })?;

    if !field.is_picklist() {
        return Err(ToolError::unresolved(format!(
            "Field '{}' is not a picklist field (type: {}).",
            params.field_name, field.field_type
        )));
    }

    let mut table = Table::new(&["Value", "Label", "Default", "Active"]);
    for entry in &field.picklist_values {
        table.row([
            entry.value.as_str(),
            entry.label.as_str(),
            yes_no(entry.default_value),
            yes_no(entry.active),
        ]);
    }
    let text = format!(
        "Picklist values for {}.{} ({}):\n\n{}",
        describe.name,
        field.name,
        field.label,
        table.render()
    );

    tracing::info!(
        "Retrieved {} picklist values for {}.{}",
        field.picklist_values.len(),
        params.object_name,
        params.field_name
    );

    let payload = PicklistPayload {
        object: &describe.name,
        field: &field.name,
        label: &field.label,
        values: field.picklist_values.iter().map(PicklistValue::from).collect(),
    };
    ToolOutput::new(&payload, text)
}

fn render_summary(describe: &SObjectDescribe) -> String {
    format!(
        "## {label} ({name})\n\n\
         **Type:** {kind}\n\
         **API Name:** {name}\n\
         **Label:** {label}\n\
         **Plural Label:** {plural}\n\
         **Key Prefix:** {prefix}\n",
        label = describe.label,
        name = describe.name,
        kind = if describe.custom {
            "Custom Object"
        } else {
            "Standard Object"
        },
        plural = describe.label_plural.as_deref().unwrap_or(NOT_AVAILABLE),
        prefix = describe.key_prefix.as_deref().unwrap_or(NOT_AVAILABLE),
    )
}

/// Fields, relationship fields and picklist sections
fn render_fields(describe: &SObjectDescribe, with_active: bool) -> String {
    let mut out = String::from("## Fields\n\n");
    let mut table = Table::new(&["API Name", "Label", "Type", "Required", "Unique", "External ID"]);
    for f in &describe.fields {
        table.row([
            f.name.as_str(),
            f.label.as_str(),
            f.field_type.as_str(),
            yes_no(f.is_required()),
            yes_no(f.unique),
            yes_no(f.external_id),
        ]);
    }
    out.push_str(&table.render());

    let mut refs = Table::new(&["API Name", "Related To", "Relationship Name"]);
    for f in describe.reference_fields() {
        refs.row([
            f.name.clone(),
            f.reference_to.join(", "),
            f.relationship_name.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ]);
    }
    if !refs.is_empty() {
        out.push_str("\n## Relationship Fields\n\n");
        out.push_str(&refs.render());
    }

    let mut picklists = describe.picklist_fields().peekable();
    if picklists.peek().is_some() {
        out.push_str("\n## Picklist Fields\n\n");
        for f in picklists {
            out.push_str(&format!("### {} ({})\n\n", escape_cell(&f.label), f.name));
            let headers: &[&str] = if with_active {
                &["Value", "Label", "Default", "Active"]
            } else {
                &["Value", "Label", "Default"]
            };
            let mut table = Table::new(headers);
            for v in &f.picklist_values {
                let mut cells = vec![v.value.as_str(), v.label.as_str(), yes_no(v.default_value)];
                if with_active {
                    cells.push(yes_no(v.active));
                }
                table.row(cells);
            }
            out.push_str(&table.render());
            out.push('\n');
        }
    }

    out
}

fn render_child_relationships(rels: &[ChildRelationship]) -> String {
    let mut table = Table::new(&["Child Object", "Relationship Name", "Field", "Cascade Delete"]);
    for rel in rels {
        let view = ChildRelationshipView::from(rel);
        table.row([
            view.child_object,
            view.relationship_name.unwrap_or(NOT_AVAILABLE),
            view.field,
            yes_no(view.cascade_delete),
        ]);
    }
    table.render()
}

fn capitalize(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{case_describe, FakeOrg};
    use serde_json::{json, Value};
    use tokio_test::assert_ok;

    fn org() -> FakeOrg {
        FakeOrg::new()
            .with_object("Account", "Account", false)
            .with_object("AccountContactRelation", "Account Contact Relationship", false)
            .with_object("Contact", "Contact", false)
            .with_object("Invoice__c", "Invoice", true)
            .with_describe("Case", case_describe())
    }

    fn search(query: &str) -> SearchObjectsParams {
        SearchObjectsParams {
            query: query.to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_matches_any_term() {
        let org = org();
        let out = assert_ok!(search_objects(&org, &search("acc")).await);
        let names: Vec<&str> = out.structured["matches"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Account", "AccountContactRelation"]);

        let out = assert_ok!(search_objects(&org, &search("INVOICE contact")).await);
        assert_eq!(out.structured["matches"].as_array().unwrap().len(), 3);
        assert!(out.text.contains("| Invoice__c | Invoice | Yes |"));
    }

    #[tokio::test]
    async fn test_search_no_matches_is_not_an_error() {
        let out = assert_ok!(search_objects(&org(), &search("zebra")).await);
        assert_eq!(out.structured["matches"], json!([]));
        assert_eq!(out.text, "No Salesforce objects found matching 'zebra'.");
    }

    #[tokio::test]
    async fn test_describe_object() {
        let params = DescribeObjectParams {
            object_name: "Case".to_string(),
            include_field_details: None,
        };
        let out = assert_ok!(describe_object(&org(), &params).await);
        assert_eq!(out.structured["object"]["keyPrefix"], "500");
        assert_eq!(out.structured["fields"].as_array().unwrap().len(), 6);
        assert_eq!(out.structured["referenceFields"][1]["relationshipType"], "Master-Detail");
        assert_eq!(out.structured["picklistFields"][0]["values"][0]["value"], "New");
        assert!(out.text.contains("## Case (Case)"));
        assert!(out.text.contains("### Status (Status)"));

        let brief = DescribeObjectParams {
            include_field_details: Some(false),
            ..params
        };
        let out = assert_ok!(describe_object(&org(), &brief).await);
        assert!(out.structured.get("fields").is_none());
        assert!(!out.text.contains("## Fields"));
    }

    #[tokio::test]
    async fn test_describe_unknown_object_is_upstream_error() {
        let params = DescribeObjectParams {
            object_name: "Nope__c".to_string(),
            include_field_details: None,
        };
        let err = describe_object(&org(), &params).await.unwrap_err();
        assert!(matches!(err, ToolError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_describe_with_api() {
        let params = DescribeObjectWithApiParams {
            object_name: "Case".to_string(),
            raw_json: None,
        };
        let out = assert_ok!(describe_object_with_api(&org(), &params).await);
        assert_eq!(out.structured["properties"]["queryable"], true);
        assert_eq!(out.structured["childRelationships"][1]["relationshipName"], Value::Null);
        assert_eq!(out.structured["recordTypes"][0]["developerName"], "Master");
        assert!(out.text.contains("| CaseHistory | N/A | CaseId | Yes |"));
        assert!(out.text.contains("| Escalated | Escalated | No | No |"));

        let raw = DescribeObjectWithApiParams {
            raw_json: Some(true),
            ..params
        };
        let out = assert_ok!(describe_object_with_api(&org(), &raw).await);
        assert_eq!(out.structured, case_describe());
    }

    #[tokio::test]
    async fn test_relationship_fields() {
        let params = ObjectParams {
            object_name: "Case".to_string(),
        };
        let out = assert_ok!(describe_relationship_fields(&org(), &params).await);
        let parents = out.structured["parentRelationships"].as_array().unwrap();
        assert_eq!(parents.len(), 2);
        assert_eq!(parents[0]["relationshipType"], "Lookup");
        assert_eq!(parents[1]["referenceTo"], json!(["Ticket__c"]));
        assert!(out.text.contains("| Parent__c | Parent Ticket | Ticket__c | Parent__r | Master-Detail |"));
    }

    #[tokio::test]
    async fn test_fields_by_type() {
        let params = FieldsByTypeParams {
            object_name: "Case".to_string(),
            field_type: Some("STRING".to_string()),
        };
        let out = assert_ok!(get_fields_by_type(&org(), &params).await);
        let names: Vec<&str> = out.structured["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["External_Key__c", "Subject"]);
        assert!(out.text.starts_with("# String Fields on Case (Case)"));

        let all = FieldsByTypeParams {
            field_type: None,
            ..params
        };
        let out = assert_ok!(get_fields_by_type(&org(), &all).await);
        assert_eq!(out.structured["fields"][0]["name"], "AccountId");
        assert!(out.text.contains("Current \\| stage of the case"));
    }

    #[tokio::test]
    async fn test_fields_by_type_without_matches() {
        let params = FieldsByTypeParams {
            object_name: "Case".to_string(),
            field_type: Some("currency".to_string()),
        };
        let out = assert_ok!(get_fields_by_type(&org(), &params).await);
        assert_eq!(out.structured["fields"], json!([]));
        assert_eq!(out.text, "No fields of type 'currency' found on object 'Case'.");
    }

    #[tokio::test]
    async fn test_picklist_values_keep_configured_order() {
        let params = PicklistParams {
            object_name: "Case".to_string(),
            field_name: "Status".to_string(),
        };
        let out = assert_ok!(get_picklist_values(&org(), &params).await);
        assert_eq!(
            out.structured["values"],
            json!([
                {"value": "New", "label": "New", "default": true, "active": true},
                {"value": "Working", "label": "Working", "default": false, "active": true},
                {"value": "Escalated", "label": "Escalated", "default": false, "active": false},
                {"value": "Closed", "label": "Closed", "default": false, "active": true}
            ])
        );
        assert!(out.text.starts_with("Picklist values for Case.Status (Status):"));
    }

    #[tokio::test]
    async fn test_picklist_field_name_ignores_case() {
        let params = PicklistParams {
            object_name: "Case".to_string(),
            field_name: "status".to_string(),
        };
        let out = assert_ok!(get_picklist_values(&org(), &params).await);
        assert_eq!(out.structured["field"], "Status");
        assert_eq!(out.structured["values"].as_array().unwrap().len(), 4);
        assert!(out.text.starts_with("Picklist values for Case.Status (Status):"));
    }

    #[tokio::test]
    async fn test_picklist_errors() {
        let missing = PicklistParams {
            object_name: "Case".to_string(),
            field_name: "Priority".to_string(),
        };
        let err = get_picklist_values(&org(), &missing).await.unwrap_err();
        assert_eq!(err.to_string(), "Field 'Priority' not found on object 'Case'.");

        let not_picklist = PicklistParams {
            object_name: "Case".to_string(),
            field_name: "Subject".to_string(),
        };
        let err = get_picklist_values(&org(), &not_picklist).await.unwrap_err();
        assert!(matches!(err, ToolError::Unresolved(ref m) if m.contains("type: string")));
    }
}
