//! Documentation text parsing.
//!
//! Operation and type docs follow the reStructuredText field-list convention:
//!
//! ```text
//! Short description.
//!
//! Longer description, possibly
//! over several lines.
//!
//! :param job_id: Unique job identifier.
//! :returns: The job, if found.
//! :raises NotFoundError: No such job.
//! ```

use indexmap::IndexMap;

/// Parsed documentation of an operation or type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocString {
    pub short: Option<String>,
    pub long: Option<String>,
    pub params: IndexMap<String, String>,
    pub returns: Option<String>,
    /// Declared error types mapped to the condition under which they are raised.
    pub raises: IndexMap<String, String>,
}

enum Field {
    Param(String),
    Returns,
    Raises(String),
}

/// Parse free-text documentation into its parts. Absent text yields an empty [`DocString`].
pub fn parse(text: Option<&str>) -> DocString {
    let mut doc = DocString::default();
    let Some(text) = text else {
        return doc;
    };

    let mut prose: Vec<&str> = Vec::new();
    let mut fields: Vec<(Field, String)> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some((field, rest)) = parse_field(trimmed) {
            fields.push((field, rest.to_string()));
        } else if let Some((_, body)) = fields.last_mut() {
            // continuation of the previous field
            if !trimmed.is_empty() {
                if !body.is_empty() {
                    body.push(' ');
                }
                body.push_str(trimmed);
            }
        } else {
            prose.push(trimmed);
        }
    }

    let mut paragraphs = prose
        .split(|line| line.is_empty())
        .filter(|para| !para.is_empty())
        .map(|para| para.join(" "));
    doc.short = paragraphs.next();
    let rest: Vec<String> = paragraphs.collect();
    if !rest.is_empty() {
        doc.long = Some(rest.join("\n\n"));
    }

    for (field, body) in fields {
        match field {
            Field::Param(name) => {
                doc.params.insert(name, body);
            }
            Field::Returns => doc.returns = Some(body),
            Field::Raises(ty) => {
                doc.raises.insert(ty, body);
            }
        }
    }

    doc
}

fn parse_field(line: &str) -> Option<(Field, &str)> {
    let inner = line.strip_prefix(':')?;
    let (head, body) = inner.split_once(':')?;
    let words: Vec<&str> = head.split_whitespace().collect();
    let field = match words.as_slice() {
        // `:param type name:` carries the type before the name
        ["param", name] | ["param", _, name] => Field::Param(name.to_string()),
        ["returns" | "return"] => Field::Returns,
        ["raises" | "raise", ty] => Field::Raises(ty.to_string()),
        _ => return None,
    };
    Some((field, body.trim()))
}
