use crate::{
    ConstraintKind, EntityDescriptor, Error, Multiplicity, Result, SchemaColumn,
    StorageGateway, TypeFamily, resolve_entity, resolve_foreign_key,
};
use std::collections::HashMap;

/// Divergence classes between the model and the live table.
///
/// Validation fails fast on the first failing class for a type; it never
/// accumulates further per-column findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    ColumnCount,
    ColumnName,
    PropertyType,
    OrdinalPosition,
    IsNullable,
    PrimaryKey,
    CharacterMaximumLength,
}

/// Compares the live table of `descriptor` against its convention-derived
/// expectation, in the fixed class order: column set, then per column type,
/// ordinal, nullability and length.
pub fn validate_schema(
    gateway: &mut dyn StorageGateway,
    descriptor: &'static EntityDescriptor,
) -> Result<()> {
    let resolved = resolve_entity(descriptor);
    let table = resolved.table.full_name();
    let live = gateway.query_columns(&table)?;
    let mismatch = |kind| Error::SchemaMismatch {
        entity: descriptor.type_name,
        kind,
    };

    if live.len() != resolved.columns.len() {
        return Err(mismatch(MismatchKind::ColumnCount));
    }
    if resolved
        .columns
        .iter()
        .any(|c| !live.iter().any(|l| l.name == c.name()))
    {
        return Err(mismatch(MismatchKind::ColumnName));
    }

    let names: Vec<String> = live.iter().map(|l| l.name.clone()).collect();
    let constraints = match gateway.query_constraints(&table, &names) {
        Ok(map) => map,
        Err(error) => {
            log::warn!(
                "constraint metadata unavailable for {}, validating without it: {:#}",
                table,
                error
            );
            HashMap::new()
        }
    };
    let primary_key = resolved.primary_key.clone().unwrap_or_default();
    let offsets = foreign_key_offsets(descriptor, &live)?;

    for live_column in &live {
        let Some(column) = resolved
            .columns
            .iter()
            .find(|c| c.name() == live_column.name)
        else {
            // Same cardinality and every model column matched above, so this
            // only fires on duplicated live names.
            return Err(mismatch(MismatchKind::ColumnName));
        };
        let kinds = constraints
            .get(&live_column.name)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let declared_family = column.value.family();
        if declared_family.is_none()
            || declared_family != TypeFamily::from_sql_type(&live_column.data_type)
        {
            return Err(mismatch(MismatchKind::PropertyType));
        }

        if let Some(ordinal) = column.ordinal {
            // Composite foreign keys may be declared with ordinals relative
            // to the principal's key order; the whole key shifts by one
            // constant offset against the physical layout.
            let expected = i32::from(ordinal) + offsets.get(column.name()).copied().unwrap_or(0);
            if i32::from(live_column.ordinal) != expected {
                return Err(mismatch(MismatchKind::OrdinalPosition));
            }
        }

        let live_not_null = !live_column.is_nullable
            || kinds.contains(&ConstraintKind::NotNull)
            || kinds.contains(&ConstraintKind::PrimaryKey);
        if live_not_null && column.nullable {
            return Err(mismatch(MismatchKind::IsNullable));
        }

        if kinds.contains(&ConstraintKind::PrimaryKey)
            && !primary_key.iter().any(|k| k.name() == column.name())
        {
            return Err(mismatch(MismatchKind::PrimaryKey));
        }

        if let Some(declared) = column.max_length {
            if live_column.max_length != Some(declared) {
                return Err(mismatch(MismatchKind::CharacterMaximumLength));
            }
        }
    }
    Ok(())
}

/// Per-column ordinal shift for members of composite foreign keys, observed
/// at the first column of each key.
fn foreign_key_offsets(
    descriptor: &'static EntityDescriptor,
    live: &[SchemaColumn],
) -> Result<HashMap<&'static str, i32>> {
    let mut offsets = HashMap::new();
    for navigation in &descriptor.navigations {
        if navigation.multiplicity != Multiplicity::Single {
            continue;
        }
        let Some(fk) = resolve_foreign_key(descriptor, navigation)? else {
            continue;
        };
        if fk.local_columns.len() < 2 {
            continue;
        }
        let first = fk.local_columns[0];
        let (Some(declared), Some(live_column)) = (
            first.ordinal,
            live.iter().find(|l| l.name == first.name()),
        ) else {
            continue;
        };
        let offset = i32::from(live_column.ordinal) - i32::from(declared);
        for column in &fk.local_columns {
            offsets.insert(column.name(), offset);
        }
    }
    Ok(offsets)
}
