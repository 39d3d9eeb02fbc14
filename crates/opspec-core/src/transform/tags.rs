use std::collections::HashMap;

use crate::docs;
use crate::openapi::schema::{SCHEMA_REF_PREFIX, Schema};
use crate::openapi::spec::{Tag, TagGroup};

/// Tag of an endpoint group: the long description, with the short one as heading.
pub fn group_tag(name: &str, doc: Option<&str>) -> Tag {
    let doc = docs::parse(doc);
    Tag {
        name: name.to_string(),
        description: doc.long,
        display_name: doc.short,
    }
}

/// Tag of a named schema, rendered by documentation tools as the schema itself.
pub fn schema_tag(name: &str, schema: Option<&Schema>) -> Tag {
    let marker = format!(r#"<SchemaDefinition schemaRef="{SCHEMA_REF_PREFIX}{name}" />"#);
    let parts: Vec<&str> = [
        schema.and_then(|s| s.title.as_deref()),
        schema.and_then(|s| s.description.as_deref()),
        Some(marker.as_str()),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect();

    Tag {
        name: name.to_string(),
        description: Some(parts.join("\n\n")),
        display_name: None,
    }
}

/// A captioned set of tags that becomes one tag group.
#[derive(Debug, Clone)]
pub struct TagSection {
    pub caption: String,
    pub tags: Vec<Tag>,
}

impl TagSection {
    pub fn new(caption: String, tags: Vec<Tag>) -> Self {
        Self { caption, tags }
    }
}

/// Tags and tag groups of a document.
#[derive(Debug, Clone, Default)]
pub struct TagTaxonomy {
    pub tags: Vec<Tag>,
    pub groups: Vec<TagGroup>,
    /// Names shared by an operation group and a schema; the schema tag was dropped.
    pub clashes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Group,
    Schema,
}

impl TagTaxonomy {
    /// Lay out operation, event, type and extra-type sections in that order.
    ///
    /// A tag name is used once across the document. Operation tags claim their
    /// names first, then events, then extra types, and type tags take what is
    /// left. Members of each group are sorted by name, and empty sections are
    /// omitted.
    ///
    /// Event and extra-type schemas are also registered types, so their repeats
    /// in later sections are dropped silently.
    pub fn build(
        operations: TagSection,
        events: TagSection,
        types: TagSection,
        extras: Vec<TagSection>,
    ) -> Self {
        let mut taxonomy = TagTaxonomy::default();
        let mut claimed = HashMap::new();
        let operations = taxonomy.claim(operations, TagKind::Group, &mut claimed);
        let events = taxonomy.claim(events, TagKind::Schema, &mut claimed);
        let extras: Vec<TagSection> = extras
            .into_iter()
            .map(|section| taxonomy.claim(section, TagKind::Schema, &mut claimed))
            .collect();
        let types = taxonomy.claim(types, TagKind::Schema, &mut claimed);

        for section in [operations, events, types].into_iter().chain(extras) {
            if section.tags.is_empty() {
                continue;
            }
            taxonomy.groups.push(TagGroup {
                name: section.caption,
                tags: section.tags.iter().map(|tag| tag.name.clone()).collect(),
            });
            taxonomy.tags.extend(section.tags);
        }
        taxonomy
    }

    fn claim(
        &mut self,
        mut section: TagSection,
        kind: TagKind,
        claimed: &mut HashMap<String, TagKind>,
    ) -> TagSection {
        section.tags.sort_by(|a, b| a.name.cmp(&b.name));
        section.tags.retain(|tag| match claimed.get(&tag.name) {
            None => {
                claimed.insert(tag.name.clone(), kind);
                true
            }
            Some(owner) if *owner == kind => false,
            Some(_) => {
                log::warn!(
                    "tag `{}` already used; skipped in section `{}`",
                    tag.name,
                    section.caption
                );
                self.clashes.push(tag.name.clone());
                false
            }
        });
        section
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(caption: &str, names: &[&str]) -> TagSection {
        TagSection::new(
            caption.to_string(),
            names.iter().map(|name| schema_tag(name, None)).collect(),
        )
    }

    #[test]
    fn group_tag_uses_short_description_as_heading() {
        let tag = group_tag("Jobs", Some("Job management.\n\nCreate and track jobs."));
        assert_eq!(tag.display_name.as_deref(), Some("Job management."));
        assert_eq!(tag.description.as_deref(), Some("Create and track jobs."));
    }

    #[test]
    fn schema_tag_description_skips_empty_parts() {
        let schema = Schema {
            title: Some("A job.".into()),
            ..Schema::default()
        };
        let tag = schema_tag("Job", Some(&schema));
        assert_eq!(
            tag.description.as_deref(),
            Some("A job.\n\n<SchemaDefinition schemaRef=\"#/components/schemas/Job\" />")
        );
    }

    #[test]
    fn sections_are_sorted_unique_and_ordered() {
        let taxonomy = TagTaxonomy::build(
            section("Operations", &["Jobs", "People"]),
            section("Events", &["StatusEvent"]),
            section("Types", &["Person", "Job", "StatusEvent", "AuditRecord", "People"]),
            vec![
                section("Additional types", &["AuditRecord"]),
                section("Empty", &[]),
            ],
        );

        let groups: Vec<(&str, Vec<&str>)> = taxonomy
            .groups
            .iter()
            .map(|g| (g.name.as_str(), g.tags.iter().map(String::as_str).collect()))
            .collect();
        assert_eq!(
            groups,
            vec![
                ("Operations", vec!["Jobs", "People"]),
                ("Events", vec!["StatusEvent"]),
                ("Types", vec!["Job", "Person"]),
                ("Additional types", vec!["AuditRecord"]),
            ]
        );

        let mut names: Vec<&str> = taxonomy.tags.iter().map(|t| t.name.as_str()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);

        // only the group named like a type is a clash
        assert_eq!(taxonomy.clashes, vec!["People"]);
    }

    #[test]
    fn schema_repeats_are_not_clashes() {
        let taxonomy = TagTaxonomy::build(
            section("Operations", &["Jobs"]),
            section("Events", &["DataEvent"]),
            section("Types", &["DataEvent", "Job"]),
            vec![section("Additional types", &["DataEvent"])],
        );
        assert!(taxonomy.clashes.is_empty());
        assert_eq!(taxonomy.groups[1].tags, vec!["DataEvent"]);
        assert_eq!(taxonomy.groups[2].tags, vec!["Job"]);
        assert_eq!(taxonomy.groups.len(), 3);
    }
}
