//! The store every namespace lives in.

use crate::NamespaceError;
use crate::entry::RequiredArtifact;
use crate::namespace::{Namespace, NamespaceMut};
use kiln_artifact::ArtifactCoordinate;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

/// The name of the root namespace.
pub const ROOT: &str = "root";

/// A handle on one namespace in a [`NamespaceRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(usize);

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a name in `using` is bound to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Binding {
    Selected(ArtifactCoordinate),
    Namespace(NamespaceId),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NamespaceData {
    pub(crate) name: String,
    pub(crate) parent: Option<NamespaceId>,
    /// Selections and sub-namespaces, keyed by logical name. A selection
    /// made under a spec is keyed by its unversioned identity.
    pub(crate) using: BTreeMap<String, Binding>,
    /// Unversioned identity to the `using` key selected for it last.
    pub(crate) latest: BTreeMap<String, String>,
    /// Requirements, keyed by unversioned identity.
    pub(crate) requires: BTreeMap<String, RequiredArtifact>,
    /// Both directions: name to identity and identity to name.
    pub(crate) aliases: BTreeMap<String, String>,
}

impl NamespaceData {
    fn new(name: String, parent: Option<NamespaceId>) -> Self {
        Self {
            name,
            parent,
            ..Self::default()
        }
    }

    pub(crate) fn reset(&mut self) {
        self.using.clear();
        self.latest.clear();
        self.requires.clear();
        self.aliases.clear();
    }

    /// The binding stored under `key`, or the latest selection of `key`
    /// when it is an unversioned identity.
    pub(crate) fn binding(&self, key: &str) -> Option<&Binding> {
        self.using
            .get(key)
            .or_else(|| self.latest.get(key).and_then(|name| self.using.get(name)))
    }

    pub(crate) fn insert_selection(&mut self, key: String, coordinate: ArtifactCoordinate) {
        self.remove_binding(&key);
        self.latest
            .insert(coordinate.unversioned_identity(), key.clone());
        self.using.insert(key, Binding::Selected(coordinate));
    }

    pub(crate) fn insert_namespace(&mut self, key: String, sub: NamespaceId) {
        self.remove_binding(&key);
        self.using.insert(key, Binding::Namespace(sub));
    }

    /// Drop the binding under `key`. When it was the latest selection of
    /// its artifact, another name selecting the same artifact takes over.
    pub(crate) fn remove_binding(&mut self, key: &str) {
        let Some(Binding::Selected(removed)) = self.using.remove(key) else {
            return;
        };
        let identity = removed.unversioned_identity();
        if self.latest.get(&identity).is_none_or(|name| name != key) {
            return;
        }
        self.latest.remove(&identity);
        let successor = self.using.iter().find_map(|(name, binding)| match binding {
            Binding::Selected(other) if other.unversioned_identity() == identity => {
                Some(name.clone())
            }
            _ => None,
        });
        if let Some(name) = successor {
            self.latest.insert(identity, name);
        }
    }
}

/// Every namespace of one build session.
///
/// Namespaces are created on first reference and live until
/// [`NamespaceRegistry::clear_all`]. Handles obtained before `clear_all`
/// must not be used afterwards.
#[derive(Debug, Clone)]
pub struct NamespaceRegistry {
    namespaces: Vec<NamespaceData>,
    by_name: HashMap<String, NamespaceId>,
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceRegistry {
    /// A registry holding only the root namespace.
    pub fn new() -> Self {
        let mut registry = Self {
            namespaces: Vec::new(),
            by_name: HashMap::new(),
        };
        registry.clear_all();
        registry
    }

    pub fn root(&self) -> NamespaceId {
        NamespaceId(0)
    }

    /// The namespace called `name`, created if absent.
    ///
    /// `a::b`, `a:b` and `a:::b` all name the same namespace; a blank name,
    /// `~` or `root` names the root. The parent of `a:b:c` is `a:b`,
    /// created along with it when needed.
    pub fn instance(&mut self, name: &str) -> NamespaceId {
        let name = normalize(name);
        if let Some(id) = self.by_name.get(&name) {
            return *id;
        }
        let parent = match name.rsplit_once(':') {
            Some((prefix, _)) => self.instance(prefix),
            None => self.root(),
        };
        let id = self.push(NamespaceData::new(name.clone(), Some(parent)));
        debug!(namespace = %name, "created namespace");
        self.by_name.insert(name, id);
        id
    }

    /// [`NamespaceRegistry::instance`] for a name given as segments.
    pub fn instance_path(&mut self, segments: &[&str]) -> NamespaceId {
        self.instance(&segments.join(":"))
    }

    /// The namespace called `name`, if it exists.
    pub fn lookup(&self, name: &str) -> Option<NamespaceId> {
        self.by_name.get(&normalize(name)).copied()
    }

    /// Drop every namespace and start over with an empty root.
    pub fn clear_all(&mut self) {
        self.namespaces.clear();
        self.by_name.clear();
        self.namespaces.push(NamespaceData::new(ROOT.to_string(), None));
        self.by_name.insert(ROOT.to_string(), NamespaceId(0));
    }

    /// The names of all named namespaces, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// # Panics
    ///
    /// If `id` was issued before the last [`NamespaceRegistry::clear_all`].
    pub fn namespace(&self, id: NamespaceId) -> Namespace<'_> {
        Namespace::new(self, id)
    }

    /// # Panics
    ///
    /// If `id` was issued before the last [`NamespaceRegistry::clear_all`].
    pub fn namespace_mut(&mut self, id: NamespaceId) -> NamespaceMut<'_> {
        NamespaceMut::new(self, id)
    }

    /// Apply a table of `namespace -> name -> spec or version` with `use`
    /// semantics. Namespace names are normalized as by
    /// [`NamespaceRegistry::instance`]. Parents are loaded before their
    /// children, so a child may select a bare version of a parent's entry.
    pub fn load(
        &mut self,
        table: &BTreeMap<String, BTreeMap<String, String>>,
    ) -> Result<(), NamespaceError> {
        let mut ordered: Vec<_> = table
            .iter()
            .map(|(namespace, entries)| (self.instance(namespace), entries))
            .collect();
        ordered.sort_by_key(|(id, _)| self.chain(*id).count());

        for (id, entries) in ordered {
            let mut ns = self.namespace_mut(id);
            for (name, value) in entries {
                ns.select(name, value.as_str())?;
            }
        }
        Ok(())
    }

    /// A nested namespace owned by `owner`. It is reachable through the
    /// owner's binding only, not by name.
    pub(crate) fn create_sub(&mut self, owner: NamespaceId, name: &str) -> NamespaceId {
        let full = format!("{}:{}", self.data(owner).name, name);
        self.push(NamespaceData::new(full, Some(owner)))
    }

    pub(crate) fn data(&self, id: NamespaceId) -> &NamespaceData {
        &self.namespaces[id.0]
    }

    pub(crate) fn data_mut(&mut self, id: NamespaceId) -> &mut NamespaceData {
        &mut self.namespaces[id.0]
    }

    /// `id` followed by its ancestors, nearest first.
    pub(crate) fn chain(&self, id: NamespaceId) -> impl Iterator<Item = NamespaceId> + '_ {
        std::iter::successors(Some(id), |current| self.data(*current).parent)
    }

    fn push(&mut self, data: NamespaceData) -> NamespaceId {
        self.namespaces.push(data);
        NamespaceId(self.namespaces.len() - 1)
    }
}

fn normalize(name: &str) -> String {
    let name = name
        .split(':')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(":");
    if name.is_empty() || name == "~" {
        ROOT.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_is_memoized() {
        let mut registry = NamespaceRegistry::new();
        let a = registry.instance("app:web");
        assert_eq!(registry.instance("app::web"), a);
        assert_eq!(registry.instance_path(&["app", "web"]), a);
        assert_eq!(registry.lookup("app:web"), Some(a));
    }

    #[test]
    fn test_root_names() {
        let mut registry = NamespaceRegistry::new();
        let root = registry.root();
        assert_eq!(registry.instance(""), root);
        assert_eq!(registry.instance("~"), root);
        assert_eq!(registry.instance(ROOT), root);
        assert!(registry.data(root).parent.is_none());
    }

    #[test]
    fn test_parents_created_with_child() {
        let mut registry = NamespaceRegistry::new();
        let child = registry.instance("a:b:c");
        let parent = registry.lookup("a:b").unwrap();
        assert_eq!(registry.data(child).parent, Some(parent));
        let chain: Vec<_> = registry.chain(child).collect();
        assert_eq!(chain.len(), 4);
        assert_eq!(chain[3], registry.root());
        assert_eq!(registry.names(), vec!["a", "a:b", "a:b:c", "root"]);
    }

    #[test]
    fn test_clear_all() {
        let mut registry = NamespaceRegistry::new();
        registry.instance("a");
        registry.clear_all();
        assert_eq!(registry.lookup("a"), None);
        assert_eq!(registry.names(), vec!["root"]);
    }

    #[test]
    fn test_sub_namespaces_are_not_named() {
        let mut registry = NamespaceRegistry::new();
        let owner = registry.instance("a");
        let sub = registry.create_sub(owner, "b");
        assert_eq!(registry.data(sub).name, "a:b");
        assert_eq!(registry.lookup("a:b"), None);
        assert_eq!(registry.data(sub).parent, Some(owner));
    }

    #[test]
    fn test_load() {
        let mut table = BTreeMap::new();
        table.insert(
            "~".to_string(),
            BTreeMap::from([("lib".to_string(), "org.x:lib:jar:1.0".to_string())]),
        );
        table.insert(
            "app".to_string(),
            BTreeMap::from([("lib".to_string(), "1.1".to_string())]),
        );
        let mut registry = NamespaceRegistry::new();
        registry.load(&table).unwrap();
        let root = registry.root();
        assert_eq!(
            registry.namespace(root).spec("lib").unwrap().to_spec(),
            "org.x:lib:jar:1.0"
        );
        let app = registry.lookup("app").unwrap();
        assert_eq!(registry.namespace(app).spec("lib").unwrap().version(), Some("1.1"));
    }
}
