use serde_json::Value;

/// A named email template. Placeholders use `{{field}}` and resolve
/// against the dispatch context.
pub struct EmailTemplate {
    pub name: &'static str,
    pub subject: &'static str,
    pub body: &'static str,
}

pub static TEMPLATES: &[EmailTemplate] = &[
    EmailTemplate {
        name: "ticket-created",
        subject: "Ticket {{ticket_number}} received",
        body: "Hi {{name}},\n\nWe received your ticket {{ticket_number}}: {{subject}}.\nOur team will get back to you shortly.",
    },
    EmailTemplate {
        name: "ticket-replied",
        subject: "New reply on ticket {{ticket_number}}",
        body: "Hi {{name}},\n\nThere is a new reply on your ticket {{ticket_number}}:\n\n{{message}}",
    },
    EmailTemplate {
        name: "contract-signed",
        subject: "Contract {{contract_number}} signed",
        body: "The contract {{contract_number}} ({{title}}) was signed by {{signer_name}}.",
    },
];

pub fn find(name: &str) -> Option<&'static EmailTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// Render a template against the context: `(subject, body)`.
///
/// Unknown placeholders render empty rather than erroring; a missing
/// context field must never block a dispatch.
pub fn render(template: &EmailTemplate, context: &Value) -> (String, String) {
    (
        substitute(template.subject, context),
        substitute(template.body, context),
    )
}

fn substitute(text: &str, context: &Value) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let field = after[..end].trim();
                if let Some(v) = context.get(field) {
                    match v {
                        Value::String(s) => out.push_str(s),
                        other => out.push_str(&other.to_string()),
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn render_substitutes_known_fields() {
        let template = find("ticket-created").unwrap();
        let (subject, body) = render(
            template,
            &json!({"ticket_number": "TCK-1A2B3C", "name": "Alice", "subject": "Printer on fire"}),
        );

        assert_eq!(subject, "Ticket TCK-1A2B3C received");
        assert!(body.contains("Hi Alice,"));
        assert!(body.contains("Printer on fire"));
    }

    #[test]
    fn unknown_fields_render_empty() {
        let template = find("ticket-replied").unwrap();
        let (subject, _) = render(template, &json!({}));
        assert_eq!(subject, "New reply on ticket ");
    }

    #[test]
    fn unknown_template_is_none() {
        assert!(find("password-reset").is_none());
    }
}
