use crate::{ColumnDef, Error, Result, TableRef, Value, separated_by};
use std::fmt::Write;

/// One `FOREIGN KEY ... REFERENCES` clause of a `CREATE TABLE` statement.
///
/// `columns` and `references` are positionally paired and listed in the
/// principal key's order.
#[derive(Debug, Clone)]
pub struct ForeignKeyClause {
    /// Principal (referenced) table.
    pub table: TableRef,
    /// Local columns holding the foreign values.
    pub columns: Vec<&'static ColumnDef>,
    /// Referenced primary key columns.
    pub references: Vec<&'static ColumnDef>,
}

/// DDL text layer. The default methods produce the generic dialect used by
/// the schema synthesizer; a backend can override individual fragments.
pub trait SqlWriter {
    fn write_identifier(&self, out: &mut String, value: &str) {
        out.push_str(value);
    }

    fn write_table_ref(&self, out: &mut String, value: &TableRef) {
        if !value.schema.is_empty() {
            self.write_identifier(out, &value.schema);
            out.push('.');
        }
        self.write_identifier(out, &value.name);
    }

    /// Renders the SQL type of a column from the fixed scalar mapping table,
    /// honoring an explicit `column_type` override.
    fn write_column_type(
        &self,
        out: &mut String,
        entity: &'static str,
        column: &ColumnDef,
    ) -> Result<()> {
        if !column.column_type.is_empty() {
            out.push_str(column.column_type);
            return Ok(());
        }
        match &column.value {
            Value::Boolean(..) => out.push_str("BIT"),
            Value::Int8(..) | Value::UInt8(..) => out.push_str("TINYINT"),
            Value::Int16(..) | Value::UInt16(..) => out.push_str("SMALLINT"),
            Value::Int32(..) | Value::UInt32(..) => out.push_str("INT"),
            Value::Int64(..) | Value::UInt64(..) => out.push_str("BIGINT"),
            Value::Float32(..) => out.push_str("REAL"),
            Value::Float64(..) => out.push_str("FLOAT"),
            Value::Decimal(.., precision, scale) => {
                out.push_str("DECIMAL");
                if (precision, scale) != (&0, &0) {
                    let _ = write!(out, "({},{})", precision, scale);
                }
            }
            Value::Varchar(..) => {
                out.push_str("NVARCHAR(");
                match column.max_length {
                    Some(length) => {
                        let mut buffer = itoa::Buffer::new();
                        out.push_str(buffer.format(length));
                    }
                    None => out.push_str("MAX"),
                }
                out.push(')');
            }
            Value::Blob(..) => out.push_str("VARBINARY(MAX)"),
            Value::Date(..)
            | Value::Time(..)
            | Value::Timestamp(..)
            | Value::TimestampWithTimezone(..) => out.push_str("DATETIME"),
            Value::Uuid(..) => out.push_str("UNIQUEIDENTIFIER"),
            Value::Null | Value::Interval(..) => {
                return Err(Error::UnsupportedType {
                    entity,
                    column: column.name(),
                    type_name: column.value.type_name(),
                });
            }
        }
        Ok(())
    }

    fn write_column_fragment(
        &self,
        out: &mut String,
        entity: &'static str,
        column: &ColumnDef,
    ) -> Result<()> {
        self.write_identifier(out, column.name());
        out.push(' ');
        self.write_column_type(out, entity, column)?;
        if column.identity {
            out.push_str(" IDENTITY");
        }
        if !column.nullable {
            out.push_str(" NOT NULL");
        }
        if column.unique {
            out.push_str(" UNIQUE");
        }
        Ok(())
    }

    /// Renders a full `CREATE TABLE` statement: column clauses first, then a
    /// single `PRIMARY KEY` constraint and one `FOREIGN KEY` constraint per
    /// referenced table.
    fn write_create_table(
        &self,
        out: &mut String,
        entity: &'static str,
        table: &TableRef,
        columns: &[&ColumnDef],
        primary_key: &[&ColumnDef],
        foreign_keys: &[ForeignKeyClause],
    ) -> Result<()> {
        out.push_str("CREATE TABLE ");
        self.write_table_ref(out, table);
        out.push_str(" (\n");
        for column in columns {
            out.push('\t');
            self.write_column_fragment(out, entity, column)?;
            out.push_str(",\n");
        }
        out.push_str("\tCONSTRAINT PK_");
        out.push_str(&table.name);
        out.push_str(" PRIMARY KEY(");
        separated_by(
            out,
            primary_key,
            |out, v| self.write_identifier(out, v.name()),
            ", ",
        );
        out.push(')');
        for clause in foreign_keys {
            out.push_str(",\n\tCONSTRAINT FK_");
            out.push_str(&clause.table.name);
            out.push_str(" FOREIGN KEY(");
            separated_by(
                out,
                &clause.columns,
                |out, v| self.write_identifier(out, v.name()),
                ", ",
            );
            out.push_str(") REFERENCES ");
            self.write_table_ref(out, &clause.table);
            out.push('(');
            separated_by(
                out,
                &clause.references,
                |out, v| self.write_identifier(out, v.name()),
                ", ",
            );
            out.push(')');
        }
        out.push_str("\n)");
        Ok(())
    }
}

/// Writer for the generic dialect, entirely made of the trait defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericSqlWriter;

impl SqlWriter for GenericSqlWriter {}
