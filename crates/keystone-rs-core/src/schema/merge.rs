//! Merge schema contributors into a single tree.

use super::{Group, Schema, SchemaNode};
use crate::path::ConfigPath;
use log::debug;

impl Schema {
    /// Merge contributors in precedence order; later contributors win.
    pub fn merge<I>(contributors: I) -> Schema
    where
        I: IntoIterator<Item = Schema>,
    {
        let mut merged = Schema::default();
        for contributor in contributors {
            merged.extend(contributor);
        }
        merged
    }

    /// Overlay `other` onto this schema.
    ///
    /// Groups merge key by key. Anywhere else the incoming node replaces the
    /// existing one, resolver included.
    pub fn extend(&mut self, other: Schema) {
        merge_groups(&mut self.root, other.root, &ConfigPath::root());
    }
}

fn merge_groups(base: &mut Group, overlay: Group, path: &ConfigPath) {
    for (key, incoming) in overlay.into_children() {
        let child_path = path.child(&key);
        let Some(existing) = base.get_mut(&key) else {
            base.insert(key, incoming);
            continue;
        };
        match (existing, incoming) {
            (SchemaNode::Group(existing), SchemaNode::Group(incoming)) => {
                merge_groups(existing, incoming, &child_path);
            }
            (existing, incoming) => {
                debug!("schema contributor overrides node (path={child_path})");
                *existing = incoming;
            }
        }
    }
}
