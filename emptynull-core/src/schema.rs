//! Table schemas and type classification.
//!
//! The transform never inspects a type directly. It asks a [`TypeCatalog`]
//! for the column's base type and that type's category, and only treats
//! columns in the string category as candidates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// TYPE CATEGORY
// ============================================================================

/// Host type category, keyed by the single-letter catalog code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeCategory {
    Array,
    Boolean,
    Composite,
    DateTime,
    Enum,
    Geometric,
    Network,
    Numeric,
    Pseudo,
    Range,
    String,
    Timespan,
    UserDefined,
    BitString,
    Unknown,
    Internal,
}

impl TypeCategory {
    /// Map a catalog category code. Codes the host may add later map to
    /// `Unknown`.
    pub fn from_code(code: char) -> Self {
        match code {
            'A' => TypeCategory::Array,
            'B' => TypeCategory::Boolean,
            'C' => TypeCategory::Composite,
            'D' => TypeCategory::DateTime,
            'E' => TypeCategory::Enum,
            'G' => TypeCategory::Geometric,
            'I' => TypeCategory::Network,
            'N' => TypeCategory::Numeric,
            'P' => TypeCategory::Pseudo,
            'R' => TypeCategory::Range,
            'S' => TypeCategory::String,
            'T' => TypeCategory::Timespan,
            'U' => TypeCategory::UserDefined,
            'V' => TypeCategory::BitString,
            'Z' => TypeCategory::Internal,
            _ => TypeCategory::Unknown,
        }
    }

    pub fn code(&self) -> char {
        match self {
            TypeCategory::Array => 'A',
            TypeCategory::Boolean => 'B',
            TypeCategory::Composite => 'C',
            TypeCategory::DateTime => 'D',
            TypeCategory::Enum => 'E',
            TypeCategory::Geometric => 'G',
            TypeCategory::Network => 'I',
            TypeCategory::Numeric => 'N',
            TypeCategory::Pseudo => 'P',
            TypeCategory::Range => 'R',
            TypeCategory::String => 'S',
            TypeCategory::Timespan => 'T',
            TypeCategory::UserDefined => 'U',
            TypeCategory::BitString => 'V',
            TypeCategory::Unknown => 'X',
            TypeCategory::Internal => 'Z',
        }
    }

    #[inline]
    pub fn is_string_like(&self) -> bool {
        matches!(self, TypeCategory::String)
    }
}

// ============================================================================
// COLUMNS AND TABLES
// ============================================================================

/// A declared column type, by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnType(pub String);

impl ColumnType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, column_type: impl Into<ColumnType>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
}

/// Ordered column list of a table, plus the table name used in warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Number of attributes.
    #[inline]
    pub fn natts(&self) -> usize {
        self.columns.len()
    }

    /// Look up a column by 1-based attribute number.
    pub fn column(&self, attnum: usize) -> Option<&ColumnDescriptor> {
        attnum.checked_sub(1).and_then(|i| self.columns.get(i))
    }
}

// ============================================================================
// TYPE CATALOG
// ============================================================================

/// Type lookups the transform needs from its host.
pub trait TypeCatalog {
    /// Unwrap one level of domain typing. Non-domain types return themselves.
    fn base_type(&self, declared: &ColumnType) -> ColumnType;

    fn category(&self, base: &ColumnType) -> TypeCategory;

    fn is_string_like(&self, declared: &ColumnType) -> bool {
        self.category(&self.base_type(declared)).is_string_like()
    }
}

impl<T: TypeCatalog + ?Sized> TypeCatalog for &T {
    fn base_type(&self, declared: &ColumnType) -> ColumnType {
        (**self).base_type(declared)
    }

    fn category(&self, base: &ColumnType) -> TypeCategory {
        (**self).category(base)
    }
}

/// In-process catalog seeded with the common built-in types.
#[derive(Debug, Clone)]
pub struct BuiltinTypeCatalog {
    categories: HashMap<String, TypeCategory>,
    domains: HashMap<String, String>,
}

const BUILTIN_TYPES: &[(&str, TypeCategory)] = &[
    ("text", TypeCategory::String),
    ("varchar", TypeCategory::String),
    ("character varying", TypeCategory::String),
    ("bpchar", TypeCategory::String),
    ("char", TypeCategory::String),
    ("character", TypeCategory::String),
    ("name", TypeCategory::String),
    ("citext", TypeCategory::String),
    ("int2", TypeCategory::Numeric),
    ("int4", TypeCategory::Numeric),
    ("int8", TypeCategory::Numeric),
    ("smallint", TypeCategory::Numeric),
    ("integer", TypeCategory::Numeric),
    ("int", TypeCategory::Numeric),
    ("bigint", TypeCategory::Numeric),
    ("float4", TypeCategory::Numeric),
    ("float8", TypeCategory::Numeric),
    ("real", TypeCategory::Numeric),
    ("double precision", TypeCategory::Numeric),
    ("numeric", TypeCategory::Numeric),
    ("bool", TypeCategory::Boolean),
    ("boolean", TypeCategory::Boolean),
    ("date", TypeCategory::DateTime),
    ("time", TypeCategory::DateTime),
    ("timestamp", TypeCategory::DateTime),
    ("timestamptz", TypeCategory::DateTime),
    ("interval", TypeCategory::Timespan),
    ("json", TypeCategory::UserDefined),
    ("jsonb", TypeCategory::UserDefined),
    ("bytea", TypeCategory::UserDefined),
    ("uuid", TypeCategory::UserDefined),
    ("inet", TypeCategory::Network),
    ("cidr", TypeCategory::Network),
    ("bit", TypeCategory::BitString),
    ("varbit", TypeCategory::BitString),
    ("text[]", TypeCategory::Array),
];

impl BuiltinTypeCatalog {
    pub fn new() -> Self {
        let categories = BUILTIN_TYPES
            .iter()
            .map(|(name, category)| (name.to_string(), *category))
            .collect();
        Self {
            categories,
            domains: HashMap::new(),
        }
    }

    /// Register a domain over `base`.
    pub fn with_domain(mut self, name: impl Into<String>, base: impl Into<String>) -> Self {
        self.domains.insert(name.into(), base.into());
        self
    }

    /// Register or override a non-domain type.
    pub fn with_type(mut self, name: impl Into<String>, category: TypeCategory) -> Self {
        self.categories.insert(name.into(), category);
        self
    }
}

impl Default for BuiltinTypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCatalog for BuiltinTypeCatalog {
    fn base_type(&self, declared: &ColumnType) -> ColumnType {
        match self.domains.get(declared.name()) {
            Some(base) => ColumnType::new(base.clone()),
            None => declared.clone(),
        }
    }

    fn category(&self, base: &ColumnType) -> TypeCategory {
        if self.domains.contains_key(base.name()) {
            // A domain still wrapped after one unwrap is not classified.
            return TypeCategory::Unknown;
        }
        self.categories
            .get(base.name())
            .copied()
            .unwrap_or(TypeCategory::Unknown)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes_round_trip() {
        for code in "ABCDEGINPRSTUVXZ".chars() {
            assert_eq!(TypeCategory::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_unknown_code_maps_to_unknown() {
        assert_eq!(TypeCategory::from_code('?'), TypeCategory::Unknown);
    }

    #[test]
    fn test_only_string_category_is_string_like() {
        assert!(TypeCategory::String.is_string_like());
        assert!(!TypeCategory::Array.is_string_like());
        assert!(!TypeCategory::UserDefined.is_string_like());
    }

    #[test]
    fn test_column_lookup_is_one_based() {
        let schema = TableSchema::new(
            "t",
            vec![ColumnDescriptor::new("a", "int4"), ColumnDescriptor::new("b", "text")],
        );
        assert!(schema.column(0).is_none());
        assert_eq!(schema.column(1).map(|c| c.name.as_str()), Some("a"));
        assert_eq!(schema.column(2).map(|c| c.name.as_str()), Some("b"));
        assert!(schema.column(3).is_none());
    }

    #[test]
    fn test_builtin_string_types() {
        let catalog = BuiltinTypeCatalog::new();
        for name in ["text", "varchar", "bpchar", "name"] {
            assert!(catalog.is_string_like(&ColumnType::new(name)), "{name}");
        }
        for name in ["int4", "jsonb", "bytea", "text[]", "no_such_type"] {
            assert!(!catalog.is_string_like(&ColumnType::new(name)), "{name}");
        }
    }

    #[test]
    fn test_domain_over_text_is_string_like() {
        let catalog = BuiltinTypeCatalog::new().with_domain("email", "text");
        assert_eq!(catalog.base_type(&"email".into()), ColumnType::new("text"));
        assert!(catalog.is_string_like(&"email".into()));
    }

    #[test]
    fn test_domain_unwrapped_one_level_only() {
        let catalog = BuiltinTypeCatalog::new()
            .with_domain("email", "text")
            .with_domain("work_email", "email");
        assert!(!catalog.is_string_like(&"work_email".into()));
    }

    #[test]
    fn test_with_type_registers_custom_string() {
        let catalog = BuiltinTypeCatalog::new().with_type("short_text", TypeCategory::String);
        assert!(catalog.is_string_like(&"short_text".into()));
    }
}
