use crate::{TableRef, Value};
use std::borrow::Cow;

/// Fully-qualified reference to a table column.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    /// Column name.
    pub name: &'static str,
    /// Table name (may be empty for columns of a not-yet-resolved type).
    pub table: &'static str,
    /// Schema name (may be empty).
    pub schema: &'static str,
}

impl ColumnRef {
    pub fn table(&self) -> TableRef {
        TableRef {
            name: Cow::Borrowed(self.table),
            schema: Cow::Borrowed(self.schema),
        }
    }
}

/// Indicates how (or if) a column participates in the primary key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKeyType {
    /// Single-column primary key.
    PrimaryKey,
    /// Member of a composite primary key.
    PartOfPrimaryKey,
    /// Not part of the primary key.
    #[default]
    None,
}

/// Declarative specification of a table column.
#[derive(Default, Debug, Clone)]
pub struct ColumnDef {
    /// Column identity.
    pub column_ref: ColumnRef,
    /// Explicit SQL type override (empty => infer from `value`).
    pub column_type: &'static str,
    /// `Value` describing the declared scalar type.
    pub value: Value,
    /// Nullability flag.
    pub nullable: bool,
    /// Primary key participation.
    pub primary_key: PrimaryKeyType,
    /// Explicit 1-based position. Required on every member of a composite
    /// primary or foreign key, where declaration order would be ambiguous.
    pub ordinal: Option<u16>,
    /// Declared maximum length (strings).
    pub max_length: Option<u32>,
    /// Value is generated by the storage engine.
    pub identity: bool,
    /// Single-column unique constraint.
    pub unique: bool,
}

impl ColumnDef {
    pub fn name(&self) -> &'static str {
        self.column_ref.name
    }
    pub fn table(&self) -> &'static str {
        self.column_ref.table
    }
    pub fn schema(&self) -> &'static str {
        self.column_ref.schema
    }
}

impl<'a> From<&'a ColumnDef> for &'a ColumnRef {
    fn from(value: &'a ColumnDef) -> Self {
        &value.column_ref
    }
}
