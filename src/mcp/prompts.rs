//! Canned prompts that show an agent's user what the tools can answer

use super::protocol::{GetPromptResult, Prompt, PromptMessage, TextContent};

struct PromptDef {
    name: &'static str,
    description: &'static str,
    text: &'static str,
}

const PROMPTS: &[PromptDef] = &[
    PromptDef {
        name: "search_objects",
        description: "Find Salesforce objects by name or business area",
        text: "I'll help you search for Salesforce objects.\n\n\
Examples:\n\
- \"Find all objects related to orders or products\"\n\
- \"What custom objects exist in this org?\"\n\
- \"List objects that might contain customer information\"\n\n\
What objects are you looking for?",
    },
    PromptDef {
        name: "query_records",
        description: "Retrieve records with filters, sorting and limits",
        text: "I'll help you retrieve data from your Salesforce org.\n\n\
Examples:\n\
- \"Show me the 5 most recent accounts created\"\n\
- \"Find opportunities worth more than $100,000 that are closing this month\"\n\
- \"Get cases with high priority that have been open for more than 3 days\"\n\n\
What kind of data would you like to see?",
    },
    PromptDef {
        name: "describe_object",
        description: "Explore the schema of a standard or custom object",
        text: "I'll help you explore and understand Salesforce objects.\n\n\
Examples:\n\
- \"Tell me about the Lead object\"\n\
- \"What fields are available on Opportunity?\"\n\
- \"Get the raw JSON schema for Contact\"\n\n\
Which Salesforce object would you like to explore?",
    },
    PromptDef {
        name: "picklist_values",
        description: "List the options of a picklist field",
        text: "I'll help you explore picklist values for any Salesforce field.\n\n\
Examples:\n\
- \"What are the available Status values for Case?\"\n\
- \"Show me all the Industry options for Account\"\n\
- \"What are the possible Stage values for Opportunity?\"\n\n\
Which object and field would you like to explore?",
    },
    PromptDef {
        name: "relationship_fields",
        description: "Understand lookups, master-detail and child relationships",
        text: "I'll help you understand the relationships between Salesforce objects.\n\n\
Examples:\n\
- \"What objects are related to Account?\"\n\
- \"Explain the parent-child relationships for Opportunity\"\n\
- \"What lookups exist on the Lead object?\"\n\n\
Which object's relationships would you like to explore?",
    },
    PromptDef {
        name: "validation_rules",
        description: "Inspect the validation rules of an object",
        text: "I'll help you understand the validation rules applied to Salesforce objects.\n\n\
Examples:\n\
- \"What validation rules exist for Opportunity?\"\n\
- \"List all the rules that prevent Lead records from being saved\"\n\n\
Which object's validation rules would you like to explore?",
    },
    PromptDef {
        name: "field_type_exploration",
        description: "Find fields of one type on an object",
        text: "I'll help you find fields of specific types within Salesforce objects.\n\n\
Examples:\n\
- \"Show me all picklist fields in Lead\"\n\
- \"Which fields in Opportunity are dates?\"\n\
- \"Find all lookup fields on Case\"\n\n\
Which type of fields would you like to explore?",
    },
    PromptDef {
        name: "debug_logs",
        description: "Enable, retrieve and disable Apex debug logs for a user",
        text: "I'll help you manage debug logs for troubleshooting Salesforce issues.\n\n\
Log levels: NONE, ERROR, WARN, INFO, DEBUG, FINE, FINER, FINEST.\n\n\
Examples:\n\
- \"Enable debug logs for admin@example.com at DEBUG level\"\n\
- \"Set up FINEST debug logging for user.name@company.com for 60 minutes\"\n\
- \"Show me recent debug logs for the system administrator\"\n\
- \"Disable debug logging for admin@example.com\"\n\n\
What would you like to do with debug logs?",
    },
];

pub fn list_prompts() -> Vec<Prompt> {
    PROMPTS
        .iter()
        .map(|p| Prompt {
            name: p.name.to_string(),
            description: Some(p.description.to_string()),
        })
        .collect()
}

pub fn get_prompt(name: &str) -> Option<GetPromptResult> {
    PROMPTS.iter().find(|p| p.name == name).map(|p| GetPromptResult {
        description: Some(p.description.to_string()),
        messages: vec![PromptMessage {
            role: "user".to_string(),
            content: TextContent::new(p.text.to_string()),
        }],
    })
}
