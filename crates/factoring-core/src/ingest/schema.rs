//! Field specifications and column-name normalisation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::raw::{RawRecord, RawValue};

/// Strict vs lenient handling of unparseable cells.
///
/// Strict rejects the record; lenient substitutes the documented fallback
/// (zero, null or the original text) and keeps going.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    #[default]
    Strict,
    Lenient,
}

/// Semantic target type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    TaxId,
    Money,
    NullableInteger,
    Date,
    Boolean,
}

/// What happens when a field is absent or blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    Required,
    Optional,
    /// Money only: blank or unparseable (lenient) becomes zero.
    ZeroDefault,
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Canonical column name.
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    /// Source spellings accepted besides the canonical name, in priority order.
    pub aliases: &'static [&'static str],
}

impl FieldSpec {
    pub const fn new(
        name: &'static str,
        kind: FieldKind,
        presence: Presence,
        aliases: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            kind,
            presence,
            aliases,
        }
    }
}

/// A named, ordered set of fields with a precomputed lookup from normalised
/// column name to `(field index, alias priority)`.
#[derive(Debug, Clone)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldSpec>,
    lookup: HashMap<String, (usize, usize)>,
}

impl Schema {
    pub fn new(name: &'static str, fields: Vec<FieldSpec>) -> Self {
        let mut lookup = HashMap::new();
        for (index, field) in fields.iter().enumerate() {
            let spellings = std::iter::once(field.name).chain(field.aliases.iter().copied());
            for (priority, spelling) in spellings.enumerate() {
                lookup
                    .entry(normalize_column_name(spelling))
                    .or_insert((index, priority));
            }
        }
        Self {
            name,
            fields,
            lookup,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Canonical column names in field order.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Resolve a source column name to its field, if the schema knows it.
    pub fn resolve(&self, column: &str) -> Option<&FieldSpec> {
        self.lookup
            .get(&normalize_column_name(column))
            .map(|(index, _)| &self.fields[*index])
    }

    /// Map a raw record onto canonical fields, position-aligned with
    /// [`Schema::fields`]. When several source spellings of one field are
    /// present the highest-priority spelling wins. Unknown columns are ignored.
    pub fn normalize<'r>(&self, raw: &'r RawRecord) -> Vec<Option<&'r RawValue>> {
        let mut slots: Vec<Option<(usize, &'r RawValue)>> = vec![None; self.fields.len()];
        for (column, value) in raw {
            let Some(&(index, priority)) = self.lookup.get(&normalize_column_name(column)) else {
                continue;
            };
            match slots[index] {
                Some((best, _)) if best <= priority => {}
                _ => slots[index] = Some((priority, value)),
            }
        }
        slots.into_iter().map(|s| s.map(|(_, v)| v)).collect()
    }
}

/// Lower-case and strip whitespace.
pub fn normalize_column_name(column: &str) -> String {
    column
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
