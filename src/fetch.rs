use crate::{
    ColumnDef, EntityDescriptor, EntityRef, Error, Multiplicity, NavigationDef, Result, Value,
    resolve_foreign_key,
};
use std::collections::{HashMap, HashSet};

/// Supplies the inner side of a join: every currently known instance of a
/// type. Whether that is a table scan, an in-memory set or a cache is the
/// caller's business.
pub trait EntityLoader {
    fn load_all(&self, target: &'static EntityDescriptor) -> Vec<EntityRef>;
}

/// Realizes eager-load paths over already-materialized entity sequences.
///
/// One engine instance tracks which dotted paths it has satisfied so that
/// multi-level paths are only processed leaf-first after their parent.
pub struct FetchEngine<'a> {
    loader: &'a dyn EntityLoader,
    fetched_paths: HashSet<String>,
}

impl<'a> FetchEngine<'a> {
    pub fn new(loader: &'a dyn EntityLoader) -> Self {
        Self {
            loader,
            fetched_paths: HashSet::new(),
        }
    }

    /// Joins the related sequence named by `path` onto `sequence` and mutates
    /// navigation properties to realize the graph. The returned sequence is
    /// the input, unchanged in identity and order.
    ///
    /// A multi-segment path whose parent has not been satisfied yet is a
    /// no-op, except on a fresh engine where the very first call always
    /// proceeds. A path naming an unknown navigation fails with
    /// `InvalidPath`; an unresolvable foreign key or an unmatched key merely
    /// leaves navigations unset.
    pub fn include(
        &mut self,
        root: &'static EntityDescriptor,
        sequence: Vec<EntityRef>,
        path: &str,
    ) -> Result<Vec<EntityRef>> {
        if let Some(split) = path.rfind('.') {
            if !self.fetched_paths.is_empty() && !self.fetched_paths.contains(&path[..split]) {
                log::debug!("include {:?} skipped, parent path not satisfied yet", path);
                return Ok(sequence);
            }
        }

        let mut chain: Vec<&'static NavigationDef> = Vec::new();
        let mut owner = root;
        for segment in path.split('.') {
            let navigation =
                owner
                    .navigation(segment)
                    .ok_or_else(|| Error::InvalidPath {
                        entity: root.type_name,
                        path: path.to_string(),
                        segment: segment.to_string(),
                    })?;
            chain.push(navigation);
            owner = navigation.target();
        }
        let leaf = chain[chain.len() - 1];
        let leaf_owner = match chain.len() {
            1 => root,
            n => chain[n - 2].target(),
        };

        // Project the roots down to the sequence owning the leaf navigation,
        // flattening collection-valued hops. The projected items are shared
        // handles into the root graph, so the joins below mutate objects
        // reachable from `sequence` directly.
        let mut outer = sequence.clone();
        for navigation in &chain[..chain.len() - 1] {
            outer = project(&outer, navigation);
        }
        self.join_segment(leaf_owner, &outer, leaf)?;
        self.fetched_paths.insert(path.to_string());
        Ok(sequence)
    }

    fn join_segment(
        &self,
        owner: &'static EntityDescriptor,
        outer: &[EntityRef],
        navigation: &'static NavigationDef,
    ) -> Result<()> {
        let Some(fk) = resolve_foreign_key(owner, navigation)? else {
            log::debug!(
                "no foreign key resolves for {}.{}, join skipped",
                owner.type_name,
                navigation.name
            );
            return Ok(());
        };
        let inner = self.loader.load_all(navigation.target());
        match navigation.multiplicity {
            Multiplicity::Many => {
                // Children grouped by their foreign columns, matched against
                // each outer item's primary key, element-wise and in order.
                let mut groups: HashMap<Vec<Value>, Vec<EntityRef>> = HashMap::new();
                for item in &inner {
                    if let Some(key) = key_of(item, &fk.local_columns) {
                        groups.entry(key).or_default().push(item.clone());
                    }
                }
                for item in outer {
                    let Some(key) = key_of(item, &fk.principal_key) else {
                        continue;
                    };
                    let matched = groups.get(&key).cloned().unwrap_or_default();
                    if let Some(back) = fk.back_reference {
                        for child in &matched {
                            child.borrow_mut().set_nav_single(back.name, item.clone());
                        }
                    }
                    item.borrow_mut().set_nav_many(navigation.name, matched);
                }
            }
            Multiplicity::Single => {
                let mut by_key: HashMap<Vec<Value>, EntityRef> = HashMap::new();
                for item in &inner {
                    if let Some(key) = key_of(item, &fk.principal_key) {
                        by_key.insert(key, item.clone());
                    }
                }
                for item in outer {
                    let Some(key) = key_of(item, &fk.local_columns) else {
                        continue;
                    };
                    // Left join: a miss leaves the navigation unset.
                    if let Some(matched) = by_key.get(&key) {
                        if let Some(back) = fk.back_reference {
                            matched.borrow_mut().set_nav_single(back.name, item.clone());
                        }
                        item.borrow_mut()
                            .set_nav_single(navigation.name, matched.clone());
                    }
                }
            }
        }
        Ok(())
    }
}

fn project(outer: &[EntityRef], navigation: &NavigationDef) -> Vec<EntityRef> {
    let mut projected = Vec::new();
    for item in outer {
        let item = item.borrow();
        match navigation.multiplicity {
            Multiplicity::Single => projected.extend(item.nav_single(navigation.name)),
            Multiplicity::Many => projected.extend(item.nav_many(navigation.name)),
        }
    }
    projected
}

/// Composite key of an item over `columns`; `None` when any component is
/// null, which can never match.
fn key_of(item: &EntityRef, columns: &[&ColumnDef]) -> Option<Vec<Value>> {
    let item = item.borrow();
    let mut key = Vec::with_capacity(columns.len());
    for column in columns {
        let value = item.get(column.name());
        if value.is_null() {
            return None;
        }
        key.push(value);
    }
    Some(key)
}
