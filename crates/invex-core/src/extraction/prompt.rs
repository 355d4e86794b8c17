//! Prompt construction for schema-driven extraction.

use serde_json::Value;

use invex_llm::ChatMessage;

use crate::schema::{Cardinality, FieldSchema, RecordSchema};

pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are an information extraction assistant. You read the text of a
business document and fill in a record template described by the user.

RULES:
1. Extract ONLY values that are explicitly present in the document text.
2. Copy values verbatim. Do not reformat dates, amounts, codes or names.
3. If a field is not present in the document, output null for that field.
4. Never add fields that are not part of the template.
5. Answer with a single JSON document wrapped in ```json fences and nothing else.
"#;

/// Build the system and user messages for extracting `schema` from `text`.
pub fn build_messages(schema: &RecordSchema, text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(EXTRACTION_SYSTEM_PROMPT),
        ChatMessage::user(build_user_prompt(schema, text)),
    ]
}

/// User message: schema description, fields, examples, output shape, document.
pub fn build_user_prompt(schema: &RecordSchema, text: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("Record: {}\n", schema.id()));
    prompt.push_str(&format!("Description: {}\n", schema.description()));
    prompt.push_str(match schema.cardinality() {
        Cardinality::One => "Extract exactly one record.\n",
        Cardinality::Many => {
            "Extract every matching record, in document order. Use an empty list when there are none.\n"
        }
    });

    prompt.push_str("\nFields:\n");
    for field in schema.fields() {
        prompt.push_str(&describe_field(field));
        prompt.push('\n');
    }

    if !schema.examples().is_empty() {
        prompt.push_str("\nExamples:\n");
        for example in schema.examples() {
            prompt.push_str(&format!("Input: {}\n", example.input));
            prompt.push_str("Output:\n```json\n");
            prompt.push_str(&wrap(schema, &render_record(schema, |name| {
                example.output.get(name).cloned().unwrap_or(Value::Null)
            })));
            prompt.push_str("\n```\n\n");
        }
    }

    prompt.push_str("\nAnswer using exactly this shape:\n```json\n");
    prompt.push_str(&wrap(schema, &render_record(schema, |_| {
        Value::String("value or null".to_string())
    })));
    prompt.push_str("\n```\n");

    prompt.push_str(&format!("\n<document>\n{}\n</document>\n", text));
    prompt
}

fn describe_field(field: &FieldSchema) -> String {
    let mut line = format!("- {}: {}", field.name(), field.description());
    if field.examples().is_empty() {
        return line;
    }

    let samples: Vec<String> = field
        .examples()
        .iter()
        .map(|e| {
            if e.input == e.output {
                json_string(&e.output)
            } else {
                format!("{} -> {}", json_string(&e.input), json_string(&e.output))
            }
        })
        .collect();
    line.push_str(&format!(" (e.g. {})", samples.join(", ")));
    line
}

/// Render a record object with keys in field declaration order.
fn render_record<F>(schema: &RecordSchema, value_of: F) -> String
where
    F: Fn(&str) -> Value,
{
    let entries: Vec<String> = schema
        .field_names()
        .map(|name| format!("{}: {}", json_string(name), value_of(name)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn wrap(schema: &RecordSchema, record: &str) -> String {
    match schema.cardinality() {
        Cardinality::One => format!("{{{}: {}}}", json_string(schema.id()), record),
        Cardinality::Many => format!("{{{}: [{}]}}", json_string(schema.id()), record),
    }
}

fn json_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}
