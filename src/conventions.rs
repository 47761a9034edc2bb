use crate::{
    ColumnDef, EntityDescriptor, Error, Multiplicity, NavigationDef, PrimaryKeyType, Result,
    TableRef,
};
use pluralizer::pluralize;
use std::{
    any::TypeId,
    borrow::Cow,
    collections::HashMap,
    sync::{Arc, LazyLock, RwLock},
};

/// Convention-derived metadata for one entity type.
///
/// Derived once per type and memoized process-wide; the schema synthesizer,
/// the validator and the fetch engine all consume the same instance, so key
/// ordering and table resolution can never disagree between them.
#[derive(Debug)]
pub struct ResolvedEntity {
    pub table: TableRef,
    /// Scalar columns in relational order: explicit ordinal when present,
    /// declaration order otherwise.
    pub columns: Vec<&'static ColumnDef>,
    /// Primary key columns, `None` when no marker and no name convention
    /// resolves one. Composite keys are ordered by explicit ordinal.
    pub primary_key: Option<Vec<&'static ColumnDef>>,
}

/// Resolved relation between a dependent (column-holding) type and the
/// principal type whose primary key it references.
#[derive(Debug, Clone)]
pub struct ForeignKeyDef {
    pub dependent: &'static EntityDescriptor,
    pub principal: &'static EntityDescriptor,
    /// Columns on the dependent side, positionally paired with
    /// `principal_key` (same length, principal key order).
    pub local_columns: Vec<&'static ColumnDef>,
    pub principal_key: Vec<&'static ColumnDef>,
    /// Single-valued navigation on the navigation's target type pointing
    /// back at the owner, when the model declares one.
    pub back_reference: Option<&'static NavigationDef>,
}

static CACHE: LazyLock<RwLock<HashMap<TypeId, Arc<ResolvedEntity>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Resolves (or recalls) the conventions of an entity type.
///
/// Safe to call concurrently for any mix of types: resolution is a pure
/// function of the descriptor, so a race during first population at worst
/// computes the same value twice and the last write wins.
pub fn resolve_entity(descriptor: &'static EntityDescriptor) -> Arc<ResolvedEntity> {
    {
        let cache = CACHE.read().unwrap_or_else(|e| e.into_inner());
        if let Some(resolved) = cache.get(&descriptor.type_id) {
            return resolved.clone();
        }
    }
    let resolved = Arc::new(compute(descriptor));
    log::debug!(
        "resolved {} as table {}",
        descriptor.type_name,
        resolved.table.full_name()
    );
    CACHE
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .insert(descriptor.type_id, resolved.clone());
    resolved
}

fn compute(descriptor: &'static EntityDescriptor) -> ResolvedEntity {
    let table = TableRef {
        name: match descriptor.table_name {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(pluralize(descriptor.type_name, 2, false)),
        },
        schema: Cow::Borrowed(""),
    };
    let mut columns: Vec<(u32, &'static ColumnDef)> = descriptor
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.ordinal.map(u32::from).unwrap_or(i as u32 + 1), c))
        .collect();
    columns.sort_by_key(|(position, _)| *position);
    let columns: Vec<_> = columns.into_iter().map(|(_, c)| c).collect();

    let mut key: Vec<&'static ColumnDef> = columns
        .iter()
        .copied()
        .filter(|c| c.primary_key != PrimaryKeyType::None)
        .collect();
    if key.is_empty() {
        let conventional = format!("{}Id", descriptor.type_name);
        key.extend(
            columns
                .iter()
                .copied()
                .find(|c| c.name() == "Id")
                .or_else(|| columns.iter().copied().find(|c| c.name() == conventional)),
        );
    }
    key.sort_by_key(|c| c.ordinal.unwrap_or(u16::MAX));
    ResolvedEntity {
        table,
        columns,
        primary_key: (!key.is_empty()).then_some(key),
    }
}

/// Table name of an entity type: explicit override if declared, else the
/// pluralized type name.
pub fn resolve_table_name(descriptor: &'static EntityDescriptor) -> String {
    resolve_entity(descriptor).table.full_name()
}

/// Primary key columns of an entity type, for callers that require one.
pub fn resolve_primary_key(descriptor: &'static EntityDescriptor) -> Result<Vec<&'static ColumnDef>> {
    resolve_entity(descriptor)
        .primary_key
        .clone()
        .ok_or_else(|| Error::Convention {
            entity: descriptor.type_name,
            reason: "no explicit key marker and no column matching \"Id\" or \"<TypeName>Id\""
                .into(),
        })
}

/// Resolves the foreign key behind an (owner, navigation) pair.
///
/// For a single-valued navigation the owner holds the foreign columns, named
/// `<NavigationName><PrincipalKeyColumnName>` per principal key column. For
/// a many-valued navigation they live on the target, named after its
/// back-reference navigation (or the owner's type name when none is
/// declared). `Ok(None)` means the convention simply does not match, which
/// callers treat as "no relation", not as an error.
pub fn resolve_foreign_key(
    owner: &'static EntityDescriptor,
    navigation: &NavigationDef,
) -> Result<Option<ForeignKeyDef>> {
    let target = navigation.target();
    let (dependent, principal) = match navigation.multiplicity {
        Multiplicity::Single => (owner, target),
        Multiplicity::Many => (target, owner),
    };
    let Some(principal_key) = resolve_entity(principal).primary_key.clone() else {
        return Ok(None);
    };
    let back_reference = target.navigations.iter().find(|n| {
        n.multiplicity == Multiplicity::Single && n.target().type_id == owner.type_id
    });
    let prefix = match navigation.multiplicity {
        Multiplicity::Single => navigation.name,
        Multiplicity::Many => back_reference.map(|n| n.name).unwrap_or(owner.type_name),
    };

    let matches: Vec<Option<&'static ColumnDef>> = principal_key
        .iter()
        .map(|key_column| {
            let local_name = format!("{}{}", prefix, key_column.name());
            dependent.columns.iter().find(|c| c.name() == local_name)
        })
        .collect();
    if matches.iter().all(Option::is_none) {
        return Ok(None);
    }
    if matches.iter().any(Option::is_none) {
        return Err(Error::Convention {
            entity: owner.type_name,
            reason: format!(
                "navigation {} targets a composite key but {} declares only part of the matching columns",
                navigation.name, dependent.type_name
            ),
        });
    }
    let local_columns: Vec<&'static ColumnDef> = matches.into_iter().flatten().collect();
    if local_columns.len() > 1 && local_columns.iter().any(|c| c.ordinal.is_none()) {
        return Err(Error::Convention {
            entity: owner.type_name,
            reason: format!(
                "composite foreign key behind navigation {} needs explicit ordinals on every local column",
                navigation.name
            ),
        });
    }
    Ok(Some(ForeignKeyDef {
        dependent,
        principal,
        local_columns,
        principal_key,
        back_reference,
    }))
}
