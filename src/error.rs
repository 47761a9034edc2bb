use crate::MismatchKind;
use thiserror::Error;

/// Failure kinds raised by the mapping core.
///
/// Every variant is fatal to the operation that raised it and is never
/// retried. The two conditions that degrade instead of failing (missing
/// constraint metadata during validation, unresolvable foreign key during a
/// fetch) never reach this type.
#[derive(Debug, Error)]
pub enum Error {
    /// Metadata could not be resolved unambiguously from naming conventions.
    #[error("convention resolution failed for {entity}: {reason}")]
    Convention {
        entity: &'static str,
        reason: String,
    },

    /// A composite primary key is declared without explicit per-column ordinals.
    #[error("composite key of {entity} carries no explicit column ordering")]
    AmbiguousKeyOrder { entity: &'static str },

    /// A scalar column type has no mapping in the DDL type table.
    #[error("column {column} of {entity} has type {type_name} with no SQL mapping")]
    UnsupportedType {
        entity: &'static str,
        column: &'static str,
        type_name: &'static str,
    },

    /// The live table diverges from the convention-derived expectation.
    #[error("live schema of {entity} does not match the model: {kind:?}")]
    SchemaMismatch {
        entity: &'static str,
        kind: MismatchKind,
    },

    /// A fetch path names a navigation chain that does not exist.
    #[error("path {path:?} does not resolve on {entity}: no navigation {segment:?}")]
    InvalidPath {
        entity: &'static str,
        path: String,
        segment: String,
    },

    /// Two navigations relate the same pair of types with incompatible shapes.
    #[error("conflicting navigation multiplicity between {owner} and {target}")]
    ConflictingMultiplicity {
        owner: &'static str,
        target: &'static str,
    },

    /// The storage gateway failed.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
