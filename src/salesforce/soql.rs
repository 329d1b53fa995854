//! SOQL helpers
//!
//! Query building plus escaping of values interpolated into SOQL text.

use chrono::{DateTime, SecondsFormat, Utc};

/// Query options for a SOQL SELECT
#[derive(Debug, Clone, Default)]
pub struct SoqlQuery {
    pub fields: Vec<String>,
    pub from: String,
    pub where_clause: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<usize>,
}

impl SoqlQuery {
    pub fn new(from: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            fields,
            from: from.into(),
            ..Default::default()
        }
    }

    /// Build the SOQL statement
    pub fn to_soql(&self) -> String {
        let mut soql = format!("SELECT {} FROM {}", self.fields.join(", "), self.from);

        if let Some(ref filter) = self.where_clause {
            soql.push_str(&format!(" WHERE {}", filter));
        }

        if let Some(ref order_by) = self.order_by {
            soql.push_str(&format!(" ORDER BY {}", order_by));
        }

        if let Some(limit) = self.limit {
            soql.push_str(&format!(" LIMIT {}", limit));
        }

        soql
    }
}

/// Quote a string literal, escaping characters SOQL treats specially
pub fn quote(value: &str) -> String {
    format!("'{}'", escape(value))
}

/// Quote a value for use inside `LIKE '%…%'`, escaping wildcards too
pub fn like_contains(value: &str) -> String {
    let escaped = escape(value).replace('%', "\\%").replace('_', "\\_");
    format!("'%{}%'", escaped)
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Unquoted datetime literal, e.g. `2025-01-31T12:00:00.000Z`
pub fn datetime_literal(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// True for API names such as `Account`, `Custom_Object__c`, `ns__Thing__mdt`
pub fn is_api_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// True for field paths such as `Name` or `Account.Owner.Name`
pub fn is_field_path(path: &str) -> bool {
    !path.is_empty() && path.split('.').all(is_api_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_query_minimal() {
        let query = SoqlQuery::new("Account", vec!["Id".to_string(), "Name".to_string()]);
        assert_eq!(query.to_soql(), "SELECT Id, Name FROM Account");
    }

    #[test]
    fn test_query_full() {
        let query = SoqlQuery {
            fields: vec!["Name".to_string(), "Amount".to_string()],
            from: "Opportunity".to_string(),
            where_clause: Some("Amount > 50000".to_string()),
            order_by: Some("Amount DESC".to_string()),
            limit: Some(5),
        };
        assert_eq!(
            query.to_soql(),
            "SELECT Name, Amount FROM Opportunity WHERE Amount > 50000 ORDER BY Amount DESC LIMIT 5"
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("O'Brien"), r"'O\'Brien'");
        assert_eq!(quote(r"a\b"), r"'a\\b'");
        assert_eq!(like_contains("50%_off"), r"'%50\%\_off%'");
    }

    #[test]
    fn test_datetime_literal() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(datetime_literal(at), "2025-03-01T09:30:00.000Z");
    }

    #[test]
    fn test_api_names() {
        assert!(is_api_name("Account"));
        assert!(is_api_name("Custom_Object__c"));
        assert!(is_api_name("ns__Widget__c"));
        assert!(!is_api_name(""));
        assert!(!is_api_name("1Account"));
        assert!(!is_api_name("Account; DELETE"));
        assert!(!is_api_name("Account/describe"));
        assert!(is_field_path("Account.Owner.Name"));
        assert!(!is_field_path("Account..Name"));
        assert!(!is_field_path("COUNT(Id)"));
    }
}
