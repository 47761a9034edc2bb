use std::collections::HashMap;

/// A column as described by the relational catalog of the live storage.
///
/// Read per validation or exists check and discarded; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    pub name: String,
    /// Raw SQL type name, possibly carrying a length suffix.
    pub data_type: String,
    /// 1-based position in the live table.
    pub ordinal: u16,
    pub is_nullable: bool,
    pub max_length: Option<u32>,
}

/// Constraint kinds the catalog can report for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    NotNull,
    PrimaryKey,
    ForeignKey,
    Unique,
}

/// The two-primitives storage boundary the schema components run against.
///
/// Everything behind it (connection handling, dialect, asynchrony) belongs
/// to the surrounding persistence layer; the core only ever issues these
/// four calls and treats a failing `query_constraints` as "no constraint
/// info" rather than an error.
pub trait StorageGateway {
    /// Does the relational catalog list a table by this name.
    fn rows_exist(&mut self, table: &str) -> anyhow::Result<bool>;

    /// Executes a statement with no result set (DDL in this core).
    fn execute_non_query(&mut self, sql: &str) -> anyhow::Result<()>;

    /// Live column descriptors of a table, in ordinal order.
    fn query_columns(&mut self, table: &str) -> anyhow::Result<Vec<SchemaColumn>>;

    /// Constraint kinds per column name for a table.
    fn query_constraints(
        &mut self,
        table: &str,
        columns: &[String],
    ) -> anyhow::Result<HashMap<String, Vec<ConstraintKind>>>;
}
