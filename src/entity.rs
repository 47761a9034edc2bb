use crate::{ColumnDef, Value};
use std::{any::TypeId, cell::RefCell, rc::Rc};

/// How many related instances a navigation can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    Single,
    Many,
}

/// A member referencing another entity rather than a scalar value.
#[derive(Debug, Clone, Copy)]
pub struct NavigationDef {
    pub name: &'static str,
    pub multiplicity: Multiplicity,
    /// Thunk rather than a direct reference: descriptors of mutually related
    /// types cannot reference each other as statics.
    pub target: fn() -> &'static EntityDescriptor,
}

impl NavigationDef {
    pub fn target(&self) -> &'static EntityDescriptor {
        (self.target)()
    }
}

/// Explicit schema description of an entity type, built once per type and
/// immutable afterwards. Replaces the runtime reflection a dynamic language
/// would use for member discovery.
#[derive(Debug)]
pub struct EntityDescriptor {
    /// Identity of the described Rust type, used as the memoization key.
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// Explicit table name override; `None` means the pluralized type name.
    pub table_name: Option<&'static str>,
    /// Scalar members, in declaration order.
    pub columns: Vec<ColumnDef>,
    pub navigations: Vec<NavigationDef>,
}

impl EntityDescriptor {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn navigation(&self, name: &str) -> Option<&NavigationDef> {
        self.navigations.iter().find(|n| n.name == name)
    }
}

/// Shared handle to a materialized entity instance.
///
/// The fetch engine threads these through projections and joins; navigation
/// assignments made through any handle are visible from every other handle
/// to the same instance, so results always land on the root-reachable graph.
pub type EntityRef = Rc<RefCell<dyn EntityObject>>;

/// Runtime access to one entity instance: scalar reads for key comparison
/// and navigation reads/writes for graph materialization.
pub trait EntityObject: 'static {
    fn descriptor(&self) -> &'static EntityDescriptor;

    /// Current value of a scalar column; `Value::Null` for unknown names.
    fn get(&self, column: &str) -> Value;

    fn nav_single(&self, _navigation: &str) -> Option<EntityRef> {
        None
    }

    fn nav_many(&self, _navigation: &str) -> Vec<EntityRef> {
        Vec::new()
    }

    fn set_nav_single(&mut self, _navigation: &str, _value: EntityRef) {}

    fn set_nav_many(&mut self, _navigation: &str, _values: Vec<EntityRef>) {}
}
