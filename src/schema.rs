use crate::{
    EntityDescriptor, Error, ForeignKeyClause, GenericSqlWriter, Multiplicity, Result, SqlWriter,
    StorageGateway, resolve_entity, resolve_foreign_key, resolve_primary_key, validate_schema,
};
use std::{any::TypeId, collections::HashSet};

/// Terminal state of an ensure-schema run for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// The table (and any missing referenced table, depth-first) was created.
    Created,
    /// The table already existed and was validated against the model instead.
    AlreadyExists,
}

/// Makes sure the table behind `descriptor` exists and matches the model.
///
/// Referenced tables are created first, following single-valued navigations
/// only: the dependent side owns the constraint, so a many-valued navigation
/// contributes nothing to its owner's DDL and materializes when the child
/// type is ensured. Malformed cycles are rejected before any recursion, and
/// a principal that is itself mid-ensure (a self reference) is not recursed
/// into, its constraint lands in the statement already being built.
pub fn ensure_schema(
    gateway: &mut dyn StorageGateway,
    descriptor: &'static EntityDescriptor,
) -> Result<SchemaOutcome> {
    ensure_recursive(gateway, descriptor, &mut HashSet::new())
}

fn ensure_recursive(
    gateway: &mut dyn StorageGateway,
    descriptor: &'static EntityDescriptor,
    in_flight: &mut HashSet<TypeId>,
) -> Result<SchemaOutcome> {
    let resolved = resolve_entity(descriptor);
    let table = resolved.table.full_name();
    if gateway.rows_exist(&table)? {
        validate_schema(gateway, descriptor)?;
        return Ok(SchemaOutcome::AlreadyExists);
    }
    check_multiplicities(descriptor)?;

    let primary_key = resolve_primary_key(descriptor)?;
    if primary_key.len() > 1 && primary_key.iter().any(|c| c.ordinal.is_none()) {
        return Err(Error::AmbiguousKeyOrder {
            entity: descriptor.type_name,
        });
    }

    // Reject unmappable scalars before any referenced table is created, so a
    // doomed type leaves no side effects behind.
    let mut scratch = String::new();
    for column in &resolved.columns {
        GenericSqlWriter.write_column_type(&mut scratch, descriptor.type_name, column)?;
    }

    in_flight.insert(descriptor.type_id);
    let mut foreign_keys = Vec::new();
    let mut referenced: HashSet<String> = HashSet::new();
    for navigation in &descriptor.navigations {
        if navigation.multiplicity != Multiplicity::Single {
            continue;
        }
        let Some(fk) = resolve_foreign_key(descriptor, navigation)? else {
            continue;
        };
        let principal = resolve_entity(fk.principal);
        let principal_table = principal.table.full_name();
        if !in_flight.contains(&fk.principal.type_id) && !gateway.rows_exist(&principal_table)? {
            ensure_recursive(gateway, fk.principal, in_flight)?;
        }
        // One constraint per distinct referenced table.
        if referenced.insert(principal_table) {
            foreign_keys.push(ForeignKeyClause {
                table: principal.table.clone(),
                columns: fk.local_columns,
                references: fk.principal_key,
            });
        }
    }
    in_flight.remove(&descriptor.type_id);

    let mut query = String::with_capacity(512);
    GenericSqlWriter.write_create_table(
        &mut query,
        descriptor.type_name,
        &resolved.table,
        &resolved.columns,
        &primary_key,
        &foreign_keys,
    )?;
    gateway.execute_non_query(&query)?;
    log::debug!("created table {} for {}", table, descriptor.type_name);
    Ok(SchemaOutcome::Created)
}

/// Rejects relation shapes the synthesizer cannot express: a second,
/// conflicting multiplicity between one ordered pair of types, and cycles
/// where both sides share the same multiplicity (mutual references have no
/// valid creation order, many-to-many needs a join table this core does not
/// model).
fn check_multiplicities(descriptor: &'static EntityDescriptor) -> Result<()> {
    for (i, navigation) in descriptor.navigations.iter().enumerate() {
        let target = navigation.target();
        for other in &descriptor.navigations[i + 1..] {
            if other.target().type_id == target.type_id
                && other.multiplicity != navigation.multiplicity
            {
                return Err(Error::ConflictingMultiplicity {
                    owner: descriptor.type_name,
                    target: target.type_name,
                });
            }
        }
        if target.type_id != descriptor.type_id
            && target.navigations.iter().any(|back| {
                back.target().type_id == descriptor.type_id
                    && back.multiplicity == navigation.multiplicity
            })
        {
            return Err(Error::ConflictingMultiplicity {
                owner: descriptor.type_name,
                target: target.type_name,
            });
        }
    }
    Ok(())
}
