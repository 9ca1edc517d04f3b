//! Embedding documents in HTML pages.

use crate::record::{IndividualRecord, VisibilityGate};

/// Wraps a JSON-LD document in the `<script>` element search engines look for.
///
/// The document is JSON, so the only sequence that needs attention is `</`,
/// which could otherwise end the script element early.
pub fn script_tag(json: &str) -> String {
    format!(
        r#"<script type="application/ld+json" id="json-ld-data">{}</script>"#,
        json.replace("</", r"<\/")
    )
}

/// Shows the document as readable text.
pub fn pre_block(json: &str) -> String {
    format!("<pre>{}</pre>", escape(json))
}

/// The content of the JSON-LD tab on an individual's page: the machine-readable
/// document followed by a human-readable copy of it.
pub fn tab_content(json: &str) -> String {
    script_tag(json) + &pre_block(json)
}

/// The tab is only offered for individuals who have a name and may be shown.
pub fn has_tab_content<I, G>(record: &I, gate: &G) -> bool
where
    I: IndividualRecord,
    G: VisibilityGate<I> + ?Sized,
{
    record.primary_name().is_some() && gate.can_show(record)
}

fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }

    result
}
