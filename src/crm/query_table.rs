//! Template filters and their query-table hierarchy
//!
//! A template filter describes one root query table; every table names the
//! info-area to fetch, the link to its parent table, template default values
//! and nested child tables.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

/// Link id meaning "any link between the two info-areas"
pub const LINK_ID_ANY: i32 = -1;

/// Property condition naming an explicit search-and-list configuration
pub const SOURCE_CONFIG_PROPERTY: &str = "SourceConfig";

static PARAMETER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("valid parameter pattern"));

static FUNCTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid function pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldValue {
    pub field_id: u32,
    pub value: String,
    /// Byte ranges of `value` stamped from parameters or row values. They are
    /// concrete text and never read as placeholders again.
    #[serde(skip)]
    literal_spans: Vec<Range<usize>>,
}

impl FieldValue {
    pub fn new(field_id: u32, value: impl Into<String>) -> Self {
        Self {
            field_id,
            value: value.into(),
            literal_spans: Vec::new(),
        }
    }

    /// Resolves the placeholders `pattern` matches outside the literal spans.
    /// `None` when any of them cannot be resolved.
    fn substituted<F>(&self, pattern: &Regex, lookup: F) -> Option<FieldValue>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (value, literal_spans) = substitute(&self.value, &self.literal_spans, pattern, lookup)?;
        Some(FieldValue {
            field_id: self.field_id,
            value,
            literal_spans,
        })
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.field_id == other.field_id && self.value == other.value
    }
}

impl Eq for FieldValue {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryTableNode {
    pub info_area_id: String,
    #[serde(default = "default_link_id")]
    pub link_id: i32,
    #[serde(default)]
    pub properties: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub field_values: Vec<FieldValue>,
    #[serde(default)]
    pub sub_tables: Vec<QueryTableNode>,
}

fn default_link_id() -> i32 {
    LINK_ID_ANY
}

impl QueryTableNode {
    pub fn new(info_area_id: impl Into<String>) -> Self {
        Self {
            info_area_id: info_area_id.into(),
            link_id: LINK_ID_ANY,
            properties: HashMap::new(),
            field_values: Vec::new(),
            sub_tables: Vec::new(),
        }
    }

    pub fn with_link_id(mut self, link_id: i32) -> Self {
        self.link_id = link_id;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, values: &[&str]) -> Self {
        self.properties
            .insert(name.into(), values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn with_field_value(mut self, field_id: u32, value: impl Into<String>) -> Self {
        self.field_values.push(FieldValue::new(field_id, value));
        self
    }

    pub fn with_sub_table(mut self, table: QueryTableNode) -> Self {
        self.sub_tables.push(table);
        self
    }

    /// Values of a property condition, if the table carries it
    pub fn property_condition(&self, name: &str) -> Option<&[String]> {
        self.properties.get(name).map(|values| values.as_slice())
    }

    /// Resolves `{Function}` references in the template values against the
    /// function-tagged values of one result row.
    ///
    /// A value referencing a function the row does not provide is dropped.
    /// Child tables are carried over unchanged; they get their own row values
    /// when their step runs.
    pub fn apply_value_dictionary(&self, values: &HashMap<String, String>) -> QueryTableNode {
        let field_values = self
            .field_values
            .iter()
            .filter_map(|field| field.substituted(&FUNCTION_PATTERN, |name| values.get(name).cloned()))
            .collect();

        QueryTableNode {
            field_values,
            ..self.clone()
        }
    }

    fn replace_parameters(
        &self,
        parameters: &HashMap<String, String>,
        apply_defaults: bool,
    ) -> QueryTableNode {
        let field_values = self
            .field_values
            .iter()
            .filter_map(|field| {
                field.substituted(&PARAMETER_PATTERN, |name| {
                    parameters
                        .get(name)
                        .cloned()
                        .or_else(|| apply_defaults.then(|| builtin_parameter(name)).flatten())
                })
            })
            .collect();

        QueryTableNode {
            info_area_id: self.info_area_id.clone(),
            link_id: self.link_id,
            properties: self.properties.clone(),
            field_values,
            sub_tables: self
                .sub_tables
                .iter()
                .map(|table| table.replace_parameters(parameters, apply_defaults))
                .collect(),
        }
    }

    /// Number of tables in this subtree, this one included
    pub fn table_count(&self) -> usize {
        1 + self.sub_tables.iter().map(|t| t.table_count()).sum::<usize>()
    }
}

fn builtin_parameter(name: &str) -> Option<String> {
    let now = chrono::Local::now();
    match name {
        "curDay" => Some(now.format("%Y-%m-%d").to_string()),
        "curTime" => Some(now.format("%H:%M").to_string()),
        _ => None,
    }
}

/// Replaces every capture of `pattern` through `lookup`, skipping matches
/// that overlap `literal_spans`. Returns the new value with the literal spans
/// moved to their new offsets plus the spans of the inserted text, or `None`
/// when any reference cannot be resolved.
fn substitute<F>(
    value: &str,
    literal_spans: &[Range<usize>],
    pattern: &Regex,
    lookup: F,
) -> Option<(String, Vec<Range<usize>>)>
where
    F: Fn(&str) -> Option<String>,
{
    let mut output = String::with_capacity(value.len());
    let mut inserted = Vec::new();
    let mut replaced: Vec<(Range<usize>, usize)> = Vec::new();
    let mut last = 0;

    for caps in pattern.captures_iter(value) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let range = whole.range();
        if literal_spans
            .iter()
            .any(|span| span.start < range.end && range.start < span.end)
        {
            continue;
        }

        let resolved = lookup(&caps[1])?;
        output.push_str(&value[last..range.start]);
        let start = output.len();
        output.push_str(&resolved);
        inserted.push(start..output.len());
        replaced.push((range.clone(), resolved.len()));
        last = range.end;
    }
    output.push_str(&value[last..]);

    let mut spans: Vec<Range<usize>> = literal_spans
        .iter()
        .map(|span| {
            let shift: isize = replaced
                .iter()
                .filter(|(range, _)| range.end <= span.start)
                .map(|(range, len)| *len as isize - range.len() as isize)
                .sum();
            let start = (span.start as isize + shift) as usize;
            start..start + span.len()
        })
        .chain(inserted)
        .collect();
    spans.sort_by_key(|span| span.start);

    Some((output, spans))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinition {
    pub name: String,
    pub root: QueryTableNode,
}

impl FilterDefinition {
    pub fn new(name: impl Into<String>, root: QueryTableNode) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    pub fn info_area_id(&self) -> &str {
        &self.root.info_area_id
    }

    /// Filter with every `$Name` placeholder replaced by its parameter value.
    ///
    /// With `apply_defaults`, `$curDay` and `$curTime` resolve from the local
    /// clock when the caller did not pass them. Field values with unresolved
    /// placeholders are removed.
    pub fn replaced_with_parameters(
        &self,
        parameters: &HashMap<String, String>,
        apply_defaults: bool,
    ) -> FilterDefinition {
        FilterDefinition {
            name: self.name.clone(),
            root: self.root.replace_parameters(parameters, apply_defaults),
        }
    }
}
