//! Record queries

use crate::salesforce::soql::SoqlQuery;
use crate::salesforce::SalesforceApi;
use crate::tools::output::{cell_value, Table, ToolOutput, ToolResult};
use crate::tools::params::QueryRecordsParams;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryPayload {
    query: String,
    total_size: u64,
    records: Vec<Map<String, Value>>,
}

/// Run a SOQL SELECT built from the parameters
pub async fn query_records(api: &dyn SalesforceApi, params: &QueryRecordsParams) -> ToolResult {
    tracing::info!(
        "Querying {} records with fields: {:?}",
        params.object_name,
        params.fields
    );

    let query = SoqlQuery {
        fields: params.fields.clone(),
        from: params.object_name.clone(),
        where_clause: params.where_clause.clone(),
        order_by: params.order_by.clone(),
        limit: Some(params.limit()),
    }
    .to_soql();

    tracing::info!("Executing SOQL query: {}", query);
    let result = api.query(&query).await?;
    tracing::debug!("Query returned {} records", result.total_size);

    let records: Vec<Map<String, Value>> = result
        .records
        .iter()
        .map(|record| {
            params
                .fields
                .iter()
                .map(|path| (path.clone(), field_value(record, path).clone()))
                .collect()
        })
        .collect();

    let text = if records.is_empty() {
        format!("No records found for query: {}", query)
    } else {
        let headers: Vec<&str> = params.fields.iter().map(String::as_str).collect();
        let mut table = Table::new(&headers);
        for record in &records {
            table.row(params.fields.iter().map(|f| cell_value(&record[f])));
        }
        format!(
            "Query: {}\n\nFound {} records. Displaying {}.\n\n{}",
            query,
            result.total_size,
            records.len(),
            table.render()
        )
    };

    ToolOutput::new(
        &QueryPayload {
            query,
            total_size: result.total_size,
            records,
        },
        text,
    )
}

/// Resolve a dotted path such as `Account.Owner.Name`; missing steps yield null.
///
/// API names are case-insensitive while records echo the declared case.
fn field_value<'a>(record: &'a Value, path: &str) -> &'a Value {
    path.split('.')
        .try_fold(record, |value, part| {
            value.get(part).or_else(|| {
                value
                    .as_object()?
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(part))
                    .map(|(_, v)| v)
            })
        })
        .unwrap_or(&Value::Null)
}
