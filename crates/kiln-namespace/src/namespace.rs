//! Reading and changing one namespace.
//!
//! Selections and sub-namespaces are stored under their logical name, so
//! two names may hold different versions of one artifact. Requirements are
//! stored under the unversioned identity, and names reach them through
//! aliases. An unversioned spec finds the latest selection of its artifact.

use crate::NamespaceError;
use crate::entry::{ArtifactRequirement, RequiredArtifact, UseValue, parse_need};
use crate::guard::SelectionGuard;
use crate::registry::{Binding, NamespaceData, NamespaceId, NamespaceRegistry};
use kiln_artifact::ArtifactCoordinate;
use kiln_search::VersionSearch;
use kiln_version::VersionRequirement;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, trace, warn};

/// The key `name` is stored under: the unversioned identity for specs,
/// the trimmed name otherwise.
fn storage_key(name: &str) -> Result<String, NamespaceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(NamespaceError::UndefinedName(name.to_string()));
    }
    if ArtifactCoordinate::looks_like_spec(name) {
        Ok(ArtifactCoordinate::parse(name)?.unversioned_identity())
    } else {
        Ok(name.to_string())
    }
}

/// Add every alias of `keys` in `data`, transitively.
fn expand(data: &NamespaceData, keys: &mut Vec<String>) {
    let mut i = 0;
    while i < keys.len() {
        if let Some(alias) = data.aliases.get(&keys[i]) {
            if !keys.contains(alias) {
                keys.push(alias.clone());
            }
        }
        i += 1;
    }
}

/// A read-only view of one namespace.
#[derive(Clone, Copy)]
pub struct Namespace<'a> {
    registry: &'a NamespaceRegistry,
    id: NamespaceId,
}

impl<'a> Namespace<'a> {
    pub(crate) fn new(registry: &'a NamespaceRegistry, id: NamespaceId) -> Self {
        Self { registry, id }
    }

    fn data(&self) -> &'a NamespaceData {
        self.registry.data(self.id)
    }

    pub fn id(&self) -> NamespaceId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.data().name
    }

    pub fn is_root(&self) -> bool {
        self.id == self.registry.root()
    }

    pub fn parent(&self) -> Option<Namespace<'a>> {
        self.data()
            .parent
            .map(|parent| Namespace::new(self.registry, parent))
    }

    /// Walk this namespace and its ancestors, following aliases, and return
    /// the first thing `pick` finds.
    fn find<T>(
        &self,
        key: &str,
        pick: impl Fn(&'a NamespaceData, &str) -> Option<T>,
    ) -> Option<(NamespaceId, T)> {
        let mut keys = vec![key.to_string()];
        for id in self.registry.chain(self.id) {
            let data = self.registry.data(id);
            expand(data, &mut keys);
            if let Some(found) = keys.iter().find_map(|k| pick(data, k.as_str())) {
                return Some((id, found));
            }
        }
        None
    }

    fn binding(&self, key: &str) -> Option<&'a Binding> {
        self.find(key, |data, k| data.binding(k))
            .map(|(_, binding)| binding)
    }

    fn required_for(&self, key: &str) -> Option<&'a RequiredArtifact> {
        self.find(key, |data, k| data.requires.get(k))
            .map(|(_, required)| required)
    }

    /// The unversioned identity `name` is aliased to, if any.
    pub(crate) fn alias_of(&self, name: &str) -> Option<String> {
        self.find(name.trim(), |data, k| {
            data.aliases
                .get(k)
                .filter(|alias| ArtifactCoordinate::looks_like_spec(alias))
                .cloned()
        })
        .map(|(_, identity)| identity)
    }

    /// The logical name of `identity`, or the identity itself.
    fn name_of(&self, identity: &str) -> String {
        self.find(identity, |data, k| {
            data.aliases
                .get(k)
                .filter(|alias| !ArtifactCoordinate::looks_like_spec(alias))
                .cloned()
        })
        .map_or_else(|| identity.to_string(), |(_, name)| name)
    }

    /// `key` as listed: itself, or the logical name of an identity key.
    fn display_name(&self, key: &str) -> String {
        if ArtifactCoordinate::looks_like_spec(key) {
            self.name_of(key)
        } else {
            key.to_string()
        }
    }

    /// The nearest requirement on the `using` key `key` or on the artifact
    /// selected under it.
    fn required_for_selection(
        &self,
        key: &str,
        coordinate: &ArtifactCoordinate,
    ) -> Option<&'a RequiredArtifact> {
        self.required_for(key)
            .or_else(|| self.required_for(&coordinate.unversioned_identity()))
    }

    /// Every requirement on any of `keys` in this namespace and its
    /// ancestors, nearest first.
    pub(crate) fn requirement_chain(&self, keys: &[String]) -> Vec<&'a RequiredArtifact> {
        let mut keys = keys.to_vec();
        let mut found: Vec<&'a RequiredArtifact> = Vec::new();
        for id in self.registry.chain(self.id) {
            let data = self.registry.data(id);
            expand(data, &mut keys);
            for key in &keys {
                if let Some(required) = data.requires.get(key) {
                    if !found.iter().any(|f| std::ptr::eq(*f, required)) {
                        found.push(required);
                    }
                }
            }
        }
        found
    }

    /// `foo_bar` names `bar` in the sub-namespace `foo`, unless `foo_bar`
    /// is itself defined here.
    pub(crate) fn flattened(&self, name: &str) -> Option<(NamespaceId, String)> {
        let data = self.data();
        if ArtifactCoordinate::looks_like_spec(name)
            || data.using.contains_key(name)
            || data.requires.contains_key(name)
            || data.aliases.contains_key(name)
        {
            return None;
        }
        name.match_indices('_').find_map(|(i, _)| match data.using.get(&name[..i]) {
            Some(Binding::Namespace(sub)) => Some((*sub, name[i + 1..].to_string())),
            _ => None,
        })
    }

    /// Look up `name`: a logical name, an unversioned spec, or `foo_bar`
    /// for `bar` in the sub-namespace `foo`.
    ///
    /// A selection that does not satisfy the nearest requirement on the
    /// same artifact is reported as unselected. With a versioned spec such
    /// as `g:a:jar:>1.0`, the first selection in the chain satisfying the
    /// version is returned instead.
    pub fn get(&self, name: &str) -> Option<ArtifactRequirement> {
        let name = name.trim();
        if ArtifactCoordinate::looks_like_spec(name) {
            let spec = ArtifactCoordinate::parse(name).ok()?;
            if spec.version().is_some() {
                return self.first_satisfying(&spec);
            }
        }
        if let Some((sub, rest)) = self.flattened(name) {
            return Namespace::new(self.registry, sub).get(&rest);
        }
        let key = storage_key(name).ok()?;
        self.entry(&key, name)
    }

    fn entry(&self, key: &str, name: &str) -> Option<ArtifactRequirement> {
        let required = self.required_for(key);
        let name = Some(name.to_string());
        match self.binding(key) {
            Some(Binding::Selected(coordinate)) => {
                let required =
                    required.or_else(|| self.required_for(&coordinate.unversioned_identity()));
                match required {
                    Some(r) if !r.satisfied_by(coordinate.version()) => {
                        trace!(namespace = %self.name(), key, "selection hidden by requirement");
                        Some(ArtifactRequirement::unselected(name, r.clone()))
                    }
                    _ => Some(ArtifactRequirement::selected(
                        name,
                        coordinate.clone(),
                        required.cloned(),
                    )),
                }
            }
            Some(Binding::Namespace(_)) => None,
            None => required.map(|r| ArtifactRequirement::unselected(name, r.clone())),
        }
    }

    fn first_satisfying(&self, spec: &ArtifactCoordinate) -> Option<ArtifactRequirement> {
        let requirement = VersionRequirement::parse(spec.version()?).ok()?;
        for id in self.registry.chain(self.id) {
            let data = self.registry.data(id);
            for (key, binding) in &data.using {
                let Binding::Selected(coordinate) = binding else {
                    continue;
                };
                if coordinate.key() == spec.key()
                    && coordinate
                        .version()
                        .is_some_and(|v| requirement.satisfied_by(v))
                {
                    return Some(ArtifactRequirement::selected(
                        Some(self.display_name(key)),
                        coordinate.clone(),
                        self.required_for_selection(key, coordinate).cloned(),
                    ));
                }
            }
        }
        None
    }

    /// Look up several names at once. Unknown names are an error.
    pub fn only(&self, names: &[&str]) -> Result<Vec<ArtifactRequirement>, NamespaceError> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| NamespaceError::UndefinedName(name.to_string()))
            })
            .collect()
    }

    /// The selected coordinate for `name`.
    pub fn spec(&self, name: &str) -> Option<ArtifactCoordinate> {
        self.get(name)
            .filter(ArtifactRequirement::is_selected)
            .map(|entry| entry.coordinate().clone())
    }

    /// The nearest requirement on `name`.
    pub fn requirement(&self, name: &str) -> Option<&'a RequiredArtifact> {
        let name = name.trim();
        if let Some((sub, rest)) = self.flattened(name) {
            return Namespace::new(self.registry, sub).requirement(&rest);
        }
        let key = storage_key(name).ok()?;
        self.required_for(&key).or_else(|| match self.binding(&key) {
            Some(Binding::Selected(coordinate)) => {
                self.required_for(&coordinate.unversioned_identity())
            }
            _ => None,
        })
    }

    /// Whether `candidate`, a version or a spec, would be accepted for
    /// `name`.
    pub fn is_satisfied_by(&self, name: &str, candidate: &str) -> bool {
        self.get(name)
            .is_some_and(|entry| entry.is_satisfied_by(candidate))
    }

    /// Whether `name` is defined and selected.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|entry| entry.is_selected())
    }

    /// The sub-namespace stored under `name` here.
    pub fn sub(&self, name: &str) -> Option<NamespaceId> {
        match self.data().using.get(name.trim()) {
            Some(Binding::Namespace(sub)) => Some(*sub),
            _ => None,
        }
    }

    /// Logical names defined in this namespace, sorted.
    pub fn keys(&self) -> Vec<String> {
        let data = self.data();
        let names: BTreeSet<&String> = data
            .using
            .keys()
            .chain(data.aliases.keys())
            .filter(|key| !ArtifactCoordinate::looks_like_spec(key))
            .collect();
        names.into_iter().cloned().collect()
    }

    fn scope(&self, include_parents: bool) -> Vec<NamespaceId> {
        if include_parents {
            self.registry.chain(self.id).collect()
        } else {
            vec![self.id]
        }
    }

    /// Selected artifacts, one per unversioned identity. With
    /// `include_parents`, ancestors' selections are added unless a nearer
    /// namespace already selected the same artifact.
    pub fn to_vec(&self, include_parents: bool) -> Vec<ArtifactRequirement> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for id in self.scope(include_parents) {
            self.push_selected(id, &mut seen, &mut entries);
        }
        entries
    }

    fn push_selected(
        &self,
        id: NamespaceId,
        seen: &mut HashSet<String>,
        entries: &mut Vec<ArtifactRequirement>,
    ) {
        for (key, binding) in &self.registry.data(id).using {
            let Binding::Selected(coordinate) = binding else {
                continue;
            };
            if !seen.insert(coordinate.unversioned_identity()) {
                continue;
            }
            entries.push(ArtifactRequirement::selected(
                Some(self.display_name(key)),
                coordinate.clone(),
                self.required_for_selection(key, coordinate).cloned(),
            ));
        }
    }

    /// Names of the requirements in scope that have no satisfying
    /// selection yet.
    pub fn unresolved(&self, include_parents: bool) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for id in self.scope(include_parents) {
            for identity in self.registry.data(id).requires.keys() {
                let name = self.name_of(identity);
                if !self.has(&name) && !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Like [`Namespace::to_vec`], plus the contents of sub-namespaces and
    /// every requirement in scope, resolved through the parent chain. A
    /// requirement nothing selected is reported at its default version.
    ///
    /// A requirement left without any version is an error unless
    /// `ignore_missing`, which skips it.
    pub fn values(
        &self,
        include_parents: bool,
        ignore_missing: bool,
    ) -> Result<Vec<ArtifactRequirement>, NamespaceError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let scope = self.scope(include_parents);
        for id in &scope {
            self.push_selected(*id, &mut seen, &mut entries);
        }
        for id in &scope {
            for binding in self.registry.data(*id).using.values() {
                if let Binding::Namespace(sub) = binding {
                    for entry in Namespace::new(self.registry, *sub).values(false, ignore_missing)? {
                        if seen.insert(entry.unversioned_spec()) {
                            entries.push(entry);
                        }
                    }
                }
            }
        }
        for id in &scope {
            for identity in self.registry.data(*id).requires.keys() {
                if seen.contains(identity) {
                    continue;
                }
                let Some(entry) = self.entry(identity, &self.name_of(identity)) else {
                    continue;
                };
                if entry.version().is_none() {
                    if ignore_missing {
                        continue;
                    }
                    warn!(namespace = %self.name(), artifact = %identity, "requirement has no version");
                    return Err(NamespaceError::MissingVersion(identity.clone()));
                }
                seen.insert(identity.clone());
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

impl std::fmt::Debug for Namespace<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespace")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

/// A mutable handle on one namespace.
pub struct NamespaceMut<'a> {
    registry: &'a mut NamespaceRegistry,
    id: NamespaceId,
}

impl std::fmt::Debug for NamespaceMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceMut")
            .field("id", &self.id)
            .field("name", &self.view().name())
            .finish()
    }
}

impl<'a> NamespaceMut<'a> {
    pub(crate) fn new(registry: &'a mut NamespaceRegistry, id: NamespaceId) -> Self {
        Self { registry, id }
    }

    pub fn id(&self) -> NamespaceId {
        self.id
    }

    /// Read access to the same namespace.
    pub fn view(&self) -> Namespace<'_> {
        Namespace::new(self.registry, self.id)
    }

    fn data_mut(&mut self) -> &mut NamespaceData {
        self.registry.data_mut(self.id)
    }

    /// Register a requirement written as
    /// `[name ->] group:id:type[:classifier]:[version ->] requirement`.
    ///
    /// Without a name the artifact id becomes its name, unless the id
    /// already names something else.
    pub fn need(&mut self, spec: &str) -> Result<&mut Self, NamespaceError> {
        let (name, required) = parse_need(spec)?;
        match name {
            Some(name) => self.register_requirement(&name, required)?,
            None => {
                let id = required.key().id.clone();
                let identity = required.key().to_string();
                self.register_requirement(&identity, required)?;
                if self.view().alias_of(&id).is_none() {
                    self.link_alias(&id, &identity);
                }
            }
        }
        Ok(self)
    }

    /// Register a requirement under `name`. `spec` may carry a preferred
    /// version: `org.x:lib:jar:2.1 -> ~>2.0`.
    pub fn need_named(&mut self, name: &str, spec: &str) -> Result<&mut Self, NamespaceError> {
        let (_, required) = parse_need(spec)?;
        self.register_requirement(name, required)?;
        Ok(self)
    }

    fn register_requirement(
        &mut self,
        name: &str,
        required: RequiredArtifact,
    ) -> Result<(), NamespaceError> {
        let name = name.trim();
        let identity = required.key().to_string();
        let data = self.registry.data(self.id);
        let mut keys = vec![name.to_string(), identity.clone()];
        expand(data, &mut keys);
        for key in &keys {
            if let Some(Binding::Selected(selected)) = data.binding(key) {
                SelectionGuard::enforce(Some(&required), Some(selected)).inspect_err(|err| {
                    warn!(namespace = %data.name, name, error = %err, "requirement rejects selection");
                })?;
            }
        }
        debug!(namespace = %data.name, name, requirement = %required, "need");

        self.data_mut().requires.insert(identity.clone(), required);
        if name != identity {
            self.link_alias(name, &identity);
        }
        Ok(())
    }

    /// Point `name` at `identity` and back. A name aliased elsewhere
    /// before loses its old pairing.
    fn link_alias(&mut self, name: &str, identity: &str) {
        let aliases = &mut self.data_mut().aliases;
        if let Some(old) = aliases.insert(name.to_string(), identity.to_string()) {
            if old != identity && aliases.get(&old).is_some_and(|n| n == name) {
                aliases.remove(&old);
            }
        }
        aliases.insert(identity.to_string(), name.to_string());
    }

    /// Select a value for `name`, checked against every requirement on the
    /// artifact in this namespace and its ancestors.
    ///
    /// A bare version keeps the group, id and type already known for
    /// `name`. A spec whose version is a requirement is registered with
    /// [`NamespaceMut::need_named`] instead.
    pub fn select(
        &mut self,
        name: &str,
        value: impl Into<UseValue>,
    ) -> Result<&mut Self, NamespaceError> {
        self.assign(name, value.into(), false)?;
        Ok(self)
    }

    /// Like [`NamespaceMut::select`], but leaves an existing selection
    /// alone.
    pub fn default(
        &mut self,
        name: &str,
        value: impl Into<UseValue>,
    ) -> Result<&mut Self, NamespaceError> {
        self.assign(name, value.into(), true)?;
        Ok(self)
    }

    /// Select a full spec under its own identity, with its id as name when
    /// that is free.
    pub fn select_spec(&mut self, spec: &str) -> Result<&mut Self, NamespaceError> {
        let coordinate = ArtifactCoordinate::parse(spec)?;
        if coordinate
            .version()
            .is_some_and(VersionRequirement::is_requirement)
        {
            return self.need(spec);
        }
        let identity = coordinate.unversioned_identity();
        self.assign(&identity, UseValue::Spec(spec.to_string()), false)?;
        if self.view().alias_of(coordinate.id()).is_none() {
            self.link_alias(coordinate.id(), &identity);
        }
        Ok(self)
    }

    /// Copy the value `name` has through the parent chain into this
    /// namespace.
    pub fn use_inherited(&mut self, name: &str) -> Result<&mut Self, NamespaceError> {
        let coordinate = self
            .view()
            .spec(name)
            .ok_or_else(|| NamespaceError::UndefinedName(name.to_string()))?;
        self.assign(name, UseValue::Copied(coordinate), false)?;
        Ok(self)
    }

    fn assign(
        &mut self,
        name: &str,
        value: UseValue,
        only_default: bool,
    ) -> Result<(), NamespaceError> {
        let name = name.trim();
        if let Some((sub, rest)) = self.view().flattened(name) {
            return NamespaceMut::new(&mut *self.registry, sub).assign(&rest, value, only_default);
        }
        let key = storage_key(name)?;
        if only_default && self.view().has(name) {
            trace!(namespace = %self.view().name(), name, "keeping existing selection");
            return Ok(());
        }

        let coordinate = match value {
            UseValue::Namespace(sub) => {
                self.data_mut().insert_namespace(key, sub);
                return Ok(());
            }
            UseValue::Version(version) => {
                let base = self.base_key(name)?;
                base.with_version(version)
            }
            UseValue::Spec(spec) => {
                let coordinate = ArtifactCoordinate::parse(&spec)?;
                if coordinate
                    .version()
                    .is_some_and(VersionRequirement::is_requirement)
                {
                    return self.need_named(name, &spec).map(|_| ());
                }
                if coordinate.version().is_some() {
                    coordinate
                } else {
                    // An unversioned spec picks up the version last selected.
                    self.view()
                        .spec(&coordinate.unversioned_identity())
                        .ok_or(NamespaceError::MissingVersion(spec))?
                }
            }
            UseValue::Copied(coordinate) => {
                if coordinate.version().is_none() {
                    return Err(NamespaceError::MissingVersion(coordinate.to_spec()));
                }
                coordinate
            }
            UseValue::Reference(other) => match self.view().get(&other) {
                Some(entry) if entry.version().is_some() => entry.coordinate().clone(),
                _ => return Err(NamespaceError::UndefinedName(other)),
            },
        };

        self.commit(&key, coordinate)
    }

    /// The group, id and type a bare version is attached to.
    fn base_key(&self, name: &str) -> Result<kiln_artifact::ArtifactKey, NamespaceError> {
        if ArtifactCoordinate::looks_like_spec(name) {
            return Ok(ArtifactCoordinate::parse(name)?.key().clone());
        }
        let view = self.view();
        view.requirement(name)
            .map(|required| required.key().clone())
            .or_else(|| view.spec(name).map(|spec| spec.key().clone()))
            .ok_or_else(|| NamespaceError::UndefinedName(name.to_string()))
    }

    fn commit(&mut self, key: &str, coordinate: ArtifactCoordinate) -> Result<(), NamespaceError> {
        let identity = coordinate.unversioned_identity();
        {
            let view = self.view();
            let mut keys = vec![key.to_string()];
            if identity != key {
                keys.push(identity);
            }
            let chain = view.requirement_chain(&keys);
            SelectionGuard::enforce_all(chain, &coordinate).inspect_err(|err| {
                warn!(namespace = %view.name(), name = key, error = %err, "selection rejected");
            })?;
            debug!(namespace = %view.name(), name = key, spec = %coordinate, "selected");
        }

        self.data_mut().insert_selection(key.to_string(), coordinate);
        Ok(())
    }

    /// Make `name` another name for `target`, a spec or a name that
    /// already refers to an artifact.
    pub fn alias(&mut self, name: &str, target: &str) -> Result<&mut Self, NamespaceError> {
        let identity = if ArtifactCoordinate::looks_like_spec(target) {
            storage_key(target)?
        } else {
            let view = self.view();
            view.alias_of(target)
                .or_else(|| view.spec(target).map(|spec| spec.unversioned_identity()))
                .ok_or_else(|| NamespaceError::UndefinedName(target.to_string()))?
        };
        self.link_alias(name.trim(), &identity);
        Ok(self)
    }

    /// Forget `name` here: its selection, its requirement and its alias,
    /// and the same for whatever it is aliased to. Parents are untouched.
    pub fn delete(&mut self, name: &str) -> Result<&mut Self, NamespaceError> {
        let key = storage_key(name)?;
        let data = self.data_mut();
        let linked = data.aliases.get(&key).cloned();
        for key in std::iter::once(key).chain(linked) {
            data.requires.remove(&key);
            data.remove_binding(&key);
            data.aliases.remove(&key);
        }
        debug!(namespace = %data.name, name, "deleted");
        Ok(self)
    }

    /// Forget every selection, requirement and alias. Name and parent are
    /// kept.
    pub fn clear(&mut self) -> &mut Self {
        self.data_mut().reset();
        self
    }

    pub fn set_parent(&mut self, parent: NamespaceId) -> Result<&mut Self, NamespaceError> {
        if self.id == self.registry.root() {
            return Err(NamespaceError::RootParent);
        }
        if self.registry.chain(parent).any(|ancestor| ancestor == self.id) {
            return Err(NamespaceError::ParentCycle(self.view().name().to_string()));
        }
        self.data_mut().parent = Some(parent);
        Ok(self)
    }

    /// The sub-namespace `name`, created if absent. Fails when `name`
    /// already holds an artifact.
    pub fn sub_namespace(&mut self, name: &str) -> Result<NamespaceId, NamespaceError> {
        let name = name.trim();
        let data = self.registry.data(self.id);
        match data.using.get(name) {
            Some(Binding::Namespace(sub)) => return Ok(*sub),
            Some(Binding::Selected(_)) => {
                return Err(NamespaceError::NotASubNamespace(name.to_string()));
            }
            None if data.aliases.contains_key(name) => {
                return Err(NamespaceError::NotASubNamespace(name.to_string()));
            }
            None => {}
        }
        let sub = self.registry.create_sub(self.id, name);
        self.data_mut().insert_namespace(name.to_string(), sub);
        Ok(sub)
    }

    /// The selection for `name`, searching for one when there is only a
    /// requirement. The result is selected here, guarded like any other
    /// selection.
    pub fn resolve(
        &mut self,
        name: &str,
        search: &VersionSearch,
    ) -> Result<ArtifactRequirement, NamespaceError> {
        let view = self.view();
        if let Some(entry) = view.get(name).filter(ArtifactRequirement::is_selected) {
            return Ok(entry);
        }
        let required = view
            .requirement(name)
            .cloned()
            .ok_or_else(|| NamespaceError::UndefinedName(name.to_string()))?;

        let resolved = search.best_version_or(&required.search_spec(), required.default_version())?;
        debug!(name, spec = %resolved, "resolved");
        self.assign(name, UseValue::Copied(resolved), false)?;
        self.view()
            .get(name)
            .ok_or_else(|| NamespaceError::UndefinedName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_search::RuntimeProbe;

    fn setup() -> (NamespaceRegistry, NamespaceId) {
        let mut registry = NamespaceRegistry::new();
        let id = registry.instance("app");
        (registry, id)
    }

    #[test]
    fn test_alias_symmetry() {
        let (mut registry, id) = setup();
        registry.namespace_mut(id).need_named("thing", "g:a:jar:1.0").unwrap();
        let ns = registry.namespace(id);
        let by_name = ns.get("thing").unwrap();
        let by_spec = ns.get("g:a:jar").unwrap();
        assert_eq!(by_name.coordinate().key(), by_spec.coordinate().key());
        assert_eq!(by_name.version(), Some("1.0"));
        assert!(!by_name.is_selected());
    }

    #[test]
    fn test_bare_need_names_by_id() {
        let (mut registry, id) = setup();
        registry.namespace_mut(id).need("org.x:lib:jar:>=1.0").unwrap();
        assert!(registry.namespace(id).requirement("lib").is_some());
    }

    #[test]
    fn test_select_version_after_need() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.need_named("lib", "org.x:lib:jar:~>2.0").unwrap();
        ns.select("lib", "2.4").unwrap();
        assert_eq!(ns.view().spec("lib").unwrap().to_spec(), "org.x:lib:jar:2.4");
        assert!(ns.view().has("lib"));
        assert!(matches!(
            ns.select("lib", "3.0"),
            Err(NamespaceError::UnsatisfiedRequirement { .. })
        ));
    }

    #[test]
    fn test_need_checks_existing_selection() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.select("lib", "org.x:lib:jar:1.0").unwrap();
        assert!(ns.need_named("lib", "org.x:lib:jar:>=2.0").is_err());
        assert!(ns.need_named("lib", "org.x:lib:jar:>=0.5").is_ok());
    }

    #[test]
    fn test_attribute_mismatch() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.need_named("lib", "org.x:lib:jar:1.0").unwrap();
        assert!(matches!(
            ns.select("lib", "org.y:lib:jar:1.0"),
            Err(NamespaceError::AttributeMismatch { .. })
        ));
    }

    #[test]
    fn test_requirement_spec_value_is_a_need() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.select("lib", "org.x:lib:jar:>=1.0").unwrap();
        assert!(!ns.view().has("lib"));
        assert_eq!(ns.view().requirement("lib").unwrap().text(), ">=1.0");
    }

    #[test]
    fn test_undefined_reference() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        assert!(matches!(
            ns.select("invalid", "unknown"),
            Err(NamespaceError::UndefinedName(_))
        ));
        assert!(matches!(
            ns.select("lib", "1.0"),
            Err(NamespaceError::UndefinedName(_))
        ));
    }

    #[test]
    fn test_reference_is_copied() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.select("one", "g:a:jar:1.0").unwrap();
        ns.select("copied", "one").unwrap();
        ns.select("one", "2.0").unwrap();
        assert_eq!(ns.view().spec("copied").unwrap().version(), Some("1.0"));
        assert_eq!(ns.view().spec("g:a:jar").unwrap().version(), Some("2.0"));
    }

    #[test]
    fn test_unversioned_spec_uses_last_selection() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.select_spec("g:a:jar:1.0").unwrap();
        ns.select("other", "g:a:jar").unwrap();
        assert_eq!(ns.view().spec("other").unwrap().version(), Some("1.0"));
        assert_eq!(ns.view().spec("a").unwrap().version(), Some("1.0"));
    }

    #[test]
    fn test_default_keeps_selection() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.default("lib", "org.x:lib:jar:1.0").unwrap();
        ns.default("lib", "org.x:lib:jar:2.0").unwrap();
        assert_eq!(ns.view().spec("lib").unwrap().version(), Some("1.0"));
        ns.select("lib", "org.x:lib:jar:2.0").unwrap();
        assert_eq!(ns.view().spec("lib").unwrap().version(), Some("2.0"));
    }

    #[test]
    fn test_sub_namespaces() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        let sub = ns.sub_namespace("foo").unwrap();
        assert_eq!(ns.sub_namespace("foo").unwrap(), sub);
        ns.select("foo_bar", "g:bar:jar:1.0").unwrap();
        assert_eq!(ns.view().spec("foo_bar").unwrap().version(), Some("1.0"));
        assert!(registry.namespace(sub).has("bar"));

        let mut ns = registry.namespace_mut(id);
        ns.select("plain", "g:plain:jar:1.0").unwrap();
        assert!(matches!(
            ns.sub_namespace("plain"),
            Err(NamespaceError::NotASubNamespace(_))
        ));
    }

    #[test]
    fn test_keys_and_values() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.need_named("one", "g:one:jar:1.0 -> >=1.0").unwrap();
        ns.select("two", "g:two:jar:2.0").unwrap();
        ns.sub_namespace("inner").unwrap();
        ns.select("inner_three", "g:three:jar:3.0").unwrap();

        let view = ns.view();
        assert_eq!(view.keys(), vec!["inner", "one", "two"]);
        assert_eq!(view.to_vec(false).len(), 1);

        let values = view.values(false, false).unwrap();
        let specs: Vec<String> = values.iter().map(ArtifactRequirement::to_spec).collect();
        assert_eq!(specs, vec!["g:two:jar:2.0", "g:three:jar:3.0", "g:one:jar:1.0"]);
        assert!(!values[2].is_selected());
        assert_eq!(values[2].name(), Some("one"));
        assert_eq!(view.values(false, true).unwrap().len(), 3);
    }

    #[test]
    fn test_values_at_walks_chain() {
        let mut registry = NamespaceRegistry::new();
        let parent = registry.instance("p");
        let child = registry.instance("p:c");
        registry.namespace_mut(parent).select_spec("g:i:t:2.0").unwrap();
        registry.namespace_mut(child).select_spec("g:i:t:1.0").unwrap();
        let view = registry.namespace(child);
        assert_eq!(view.get("g:i:t:>1.0").unwrap().version(), Some("2.0"));
        assert_eq!(view.get("g:i:t:<=1.0").unwrap().version(), Some("1.0"));
        assert!(view.get("g:i:t:>5").is_none());
    }

    #[test]
    fn test_child_sees_parent_selection_through_own_requirement() {
        let mut registry = NamespaceRegistry::new();
        let parent = registry.instance("p");
        let c = registry.instance("p:c");
        let d = registry.instance("p:d");
        registry.namespace_mut(parent).select_spec("foo:bar:jar:1.5").unwrap();
        registry.namespace_mut(c).need_named("one", "foo:bar:jar:>=1.0").unwrap();
        registry.namespace_mut(d).need_named("two", "foo:bar:jar:>2").unwrap();
        let one = registry.namespace(c).get("one").unwrap();
        assert!(one.is_selected());
        assert_eq!(one.version(), Some("1.5"));
        let two = registry.namespace(d).get("two").unwrap();
        assert!(!two.is_selected());
        assert_eq!(two.version(), None);
    }

    #[test]
    fn test_only() {
        let (mut registry, id) = setup();
        registry.namespace_mut(id).select("a", "g:a:jar:1").unwrap();
        let view = registry.namespace(id);
        assert_eq!(view.only(&["a"]).unwrap().len(), 1);
        assert!(matches!(
            view.only(&["a", "missing"]),
            Err(NamespaceError::UndefinedName(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_delete_and_clear() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.need_named("lib", "org.x:lib:jar:>=1.0").unwrap();
        ns.select("lib", "1.2").unwrap();
        ns.select("other", "org.x:other:jar:1.0").unwrap();
        ns.delete("lib").unwrap();
        assert!(!ns.view().has("lib"));
        assert!(ns.view().requirement("lib").is_none());
        assert!(ns.view().get("org.x:lib:jar").is_none());
        assert_eq!(ns.view().keys(), vec!["other"]);
        ns.clear();
        assert!(!ns.view().has("other"));
        assert_eq!(ns.view().name(), "app");
    }

    #[test]
    fn test_names_keep_their_own_versions() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.select("foo", "a:b:c:1").unwrap();
        ns.select("bar", "a:b:c:2").unwrap();
        assert_eq!(ns.view().spec("foo").unwrap().version(), Some("1"));
        assert_eq!(ns.view().spec("bar").unwrap().version(), Some("2"));
        assert_eq!(ns.view().spec("a:b:c").unwrap().version(), Some("2"));

        ns.delete("bar").unwrap();
        assert_eq!(ns.view().spec("a:b:c").unwrap().version(), Some("1"));
    }

    #[test]
    fn test_reselecting_a_name_moves_the_identity() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.select("thing", "a:b:c:1").unwrap();
        ns.select("thing", "a:d:c:2").unwrap();
        assert!(ns.view().spec("a:b:c").is_none());
        assert_eq!(ns.view().spec("a:d:c").unwrap().version(), Some("2"));
    }

    #[test]
    fn test_values_resolve_through_parents() {
        let mut registry = NamespaceRegistry::new();
        let root = registry.root();
        let foo = registry.instance("foo");
        registry
            .namespace_mut(root)
            .select_spec("num:one:jar:1.1")
            .unwrap()
            .select_spec("num:two:jar:2.2")
            .unwrap();
        registry
            .namespace_mut(foo)
            .need_named("one", "num:one:jar:>=1.0")
            .unwrap()
            .default("one", "1.0")
            .unwrap()
            .need_named("three", "num:three:jar:>=3.0")
            .unwrap()
            .default("three", "3.0")
            .unwrap();

        let specs = |values: Vec<ArtifactRequirement>| -> Vec<String> {
            values.iter().map(ArtifactRequirement::to_spec).collect()
        };
        let local = specs(registry.namespace(foo).values(false, false).unwrap());
        assert_eq!(local, vec!["num:three:jar:3.0", "num:one:jar:1.1"]);
        let all = specs(registry.namespace(foo).values(true, false).unwrap());
        assert!(all.contains(&"num:two:jar:2.2".to_string()));
        assert!(all.contains(&"num:one:jar:1.1".to_string()));

        registry
            .namespace_mut(foo)
            .need_named("four", "num:four:jar:>4.0")
            .unwrap();
        let err = registry.namespace(foo).values(false, false).unwrap_err();
        assert!(matches!(err, NamespaceError::MissingVersion(_)));
        assert!(err.to_string().contains("no version"));
        let lenient = specs(registry.namespace(foo).values(false, true).unwrap());
        assert_eq!(lenient, vec!["num:three:jar:3.0", "num:one:jar:1.1"]);
    }

    #[test]
    fn test_unresolved_names() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.need_named("done", "g:done:jar:>=1.0").unwrap();
        ns.select("done", "1.2").unwrap();
        ns.need_named("open", "g:open:jar:>4.0").unwrap();
        ns.need("g:bare:jar:~>2.0").unwrap();
        assert_eq!(ns.view().unresolved(false), vec!["bare", "open"]);
    }

    #[test]
    fn test_parents() {
        let mut registry = NamespaceRegistry::new();
        let root = registry.root();
        let a = registry.instance("a");
        let b = registry.instance("b");
        assert!(matches!(
            registry.namespace_mut(root).set_parent(a),
            Err(NamespaceError::RootParent)
        ));
        registry.namespace_mut(b).set_parent(a).unwrap();
        assert_eq!(registry.namespace(b).parent().unwrap().id(), a);
        assert!(matches!(
            registry.namespace_mut(a).set_parent(b),
            Err(NamespaceError::ParentCycle(_))
        ));
    }

    #[test]
    fn test_explicit_alias() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.select("lib", "org.x:lib:jar:1.0").unwrap();
        ns.alias("other", "lib").unwrap();
        assert_eq!(ns.view().spec("other").unwrap().version(), Some("1.0"));
        assert!(ns.alias("nothing", "missing").is_err());
    }

    #[test]
    fn test_resolve_uses_search_and_preferred_default() {
        let (mut registry, id) = setup();
        let mut ns = registry.namespace_mut(id);
        ns.need_named("lib", "org.x:lib:jar:2.1 -> ~>2.0").unwrap();
        ns.need_named("dep", "org.x:dep:jar:~>1.0").unwrap();

        let probe = RuntimeProbe::from_specs(&[
            ArtifactCoordinate::parse("org.x:dep:jar:1.4").unwrap(),
        ]);
        let search = VersionSearch::new().with_probe(probe);

        let lib = ns.resolve("lib", &search).unwrap();
        assert_eq!(lib.version(), Some("2.1"));
        let dep = ns.resolve("dep", &search).unwrap();
        assert_eq!(dep.version(), Some("1.4"));
        assert!(ns.view().has("dep"));
        assert!(matches!(
            ns.resolve("missing", &search),
            Err(NamespaceError::UndefinedName(_))
        ));
    }
}
