use serde::{Deserialize, Serialize};

/// Number of positional fields in every license record.
pub const FIELD_COUNT: usize = 18;

/// Role of each field position, in file order.
pub const SCHEMA: [FieldRole; FIELD_COUNT] = [
    FieldRole::Unclassified(0),
    FieldRole::Unclassified(1),
    FieldRole::Unclassified(2),
    FieldRole::Unclassified(3),
    FieldRole::LicenseType,
    FieldRole::Unclassified(5),
    FieldRole::Unclassified(6),
    FieldRole::Unclassified(7),
    FieldRole::Unclassified(8),
    FieldRole::CompanyName,
    FieldRole::Unclassified(10),
    FieldRole::Unclassified(11),
    FieldRole::Unclassified(12),
    FieldRole::Subdistrict,
    FieldRole::District,
    FieldRole::Province,
    FieldRole::PostalCode,
    FieldRole::Unclassified(17),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    LicenseType,
    CompanyName,
    Subdistrict,
    District,
    Province,
    PostalCode,
    /// Retained verbatim; the payload is the field's position.
    Unclassified(usize),
}

impl FieldRole {
    /// Position of the first field carrying this role.
    pub fn position(&self) -> usize {
        SCHEMA
            .iter()
            .position(|role| role == self)
            .unwrap_or(FIELD_COUNT)
    }
}

impl std::fmt::Display for FieldRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldRole::LicenseType => write!(f, "license_type"),
            FieldRole::CompanyName => write!(f, "company_name"),
            FieldRole::Subdistrict => write!(f, "subdistrict"),
            FieldRole::District => write!(f, "district"),
            FieldRole::Province => write!(f, "province"),
            FieldRole::PostalCode => write!(f, "postal_code"),
            FieldRole::Unclassified(pos) => write!(f, "col{}", pos),
        }
    }
}

/// One license record. `None` marks an absent (empty) field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number in the input file.
    pub line: u64,
    pub fields: Vec<Option<String>>,
}

impl Record {
    pub fn new(line: u64, fields: Vec<Option<String>>) -> Self {
        Self { line, fields }
    }

    pub fn field(&self, role: FieldRole) -> Option<&str> {
        self.fields
            .get(role.position())
            .and_then(|f| f.as_deref())
    }

    pub fn company_name(&self) -> Option<&str> {
        self.field(FieldRole::CompanyName)
    }
}

/// The two record sets handed to the exporter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub with_id: Vec<Record>,
    pub without_id: Vec<Record>,
}

impl Partition {
    pub fn total(&self) -> usize {
        self.with_id.len() + self.without_id.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Un-wrap every parenthetical but the last, which stays as a trailing marker.
    #[default]
    RelocateLastParenthetical,
    /// Keep 5-digit IDs parenthesised, un-wrap the rest, wrap bare IDs.
    CanonicalizeIdParentheses,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::RelocateLastParenthetical => write!(f, "relocate-last-parenthetical"),
            Strategy::CanonicalizeIdParentheses => write!(f, "canonicalize-id-parentheses"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizeScope {
    #[default]
    CompanyNameOnly,
    AllFields,
}

impl std::fmt::Display for NormalizeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeScope::CompanyNameOnly => write!(f, "company-name-only"),
            NormalizeScope::AllFields => write!(f, "all-fields"),
        }
    }
}

/// Where the relocate strategy puts the inner text of non-last parentheticals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReinsertMode {
    /// Ahead of the parenthesis-free text, in order of appearance.
    #[default]
    Leading,
    /// Where each span originally stood.
    InPlace,
    /// Character offsets of the raw text applied to the shortened text.
    LegacyOffsets,
}

impl std::fmt::Display for ReinsertMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReinsertMode::Leading => write!(f, "leading"),
            ReinsertMode::InPlace => write!(f, "in-place"),
            ReinsertMode::LegacyOffsets => write!(f, "legacy-offsets"),
        }
    }
}

/// Shape of a branch ID inside parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdPattern {
    /// Exactly `n` decimal digits.
    Fixed(usize),
    /// One or more decimal digits.
    Variable,
}

impl std::fmt::Display for IdPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdPattern::Fixed(n) => write!(f, "fixed({})", n),
            IdPattern::Variable => write!(f, "variable"),
        }
    }
}

/// Machine-readable run summary emitted by `--report json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: String,
    pub strategy: Strategy,
    pub scope: NormalizeScope,
    pub reinsert: ReinsertMode,
    pub id_pattern: IdPattern,
    pub total: usize,
    pub with_id: usize,
    pub without_id: usize,
    pub outputs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_positions() {
        assert_eq!(FieldRole::LicenseType.position(), 4);
        assert_eq!(FieldRole::CompanyName.position(), 9);
        assert_eq!(FieldRole::PostalCode.position(), 16);
        assert_eq!(FieldRole::Unclassified(17).position(), 17);
    }

    #[test]
    fn test_record_field_lookup() {
        let mut fields = vec![None; FIELD_COUNT];
        fields[9] = Some("Shop Alpha".to_string());
        fields[16] = Some("01000".to_string());
        let record = Record::new(1, fields);
        assert_eq!(record.company_name(), Some("Shop Alpha"));
        assert_eq!(record.field(FieldRole::PostalCode), Some("01000"));
        assert_eq!(record.field(FieldRole::Province), None);
    }

    #[test]
    fn test_id_pattern_display() {
        assert_eq!(IdPattern::Fixed(5).to_string(), "fixed(5)");
        assert_eq!(IdPattern::Variable.to_string(), "variable");
    }
}
