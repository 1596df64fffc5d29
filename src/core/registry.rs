// Copyright @yucwang 2026

use crate::core::error::{RenderError, RenderResult};
use crate::core::properties::Properties;
use std::collections::{HashMap, VecDeque};

pub type Factory<T> = Box<dyn Fn(&Properties) -> RenderResult<Box<T>> + Send + Sync>;

struct ClassEntry<T: ?Sized> {
    parent: Option<String>,
    factory: Option<Factory<T>>,
    ancestors: Vec<String>,
}

/// Name-keyed class table. Entries are registered first, then `resolve`
/// links every class to its ancestors in one topological pass. Lookups
/// before resolution fail.
pub struct ClassRegistry<T: ?Sized> {
    entries: HashMap<String, ClassEntry<T>>,
    resolved: bool,
}

impl<T: ?Sized> Default for ClassRegistry<T> {
    fn default() -> Self {
        Self { entries: HashMap::new(), resolved: false }
    }
}

impl<T: ?Sized> ClassRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_abstract(&mut self, name: &str, parent: Option<&str>) {
        self.insert(name, parent, None);
    }

    pub fn register<F>(&mut self, name: &str, parent: Option<&str>, factory: F)
    where
        F: Fn(&Properties) -> RenderResult<Box<T>> + Send + Sync + 'static,
    {
        self.insert(name, parent, Some(Box::new(factory)));
    }

    fn insert(&mut self, name: &str, parent: Option<&str>, factory: Option<Factory<T>>) {
        if self.entries.contains_key(name) {
            log::warn!("Class {} registered twice, keeping the latest entry.", name);
        }
        self.entries.insert(name.to_string(), ClassEntry {
            parent: parent.map(|p| p.to_string()),
            factory,
            ancestors: Vec::new(),
        });
        self.resolved = false;
    }

    /// Resolve parent links. Fails on a parent that was never registered or
    /// on an inheritance cycle.
    pub fn resolve(&mut self) -> RenderResult<()> {
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        for (name, entry) in &self.entries {
            match entry.parent.as_deref() {
                Some(parent) => {
                    if !self.entries.contains_key(parent) {
                        return Err(RenderError::Registry(
                            format!("class {} derives from unknown class {}", name, parent)));
                    }
                    children.entry(parent).or_insert_with(Vec::new).push(name.as_str());
                }
                None => queue.push_back(name.as_str()),
            }
        }

        let mut order: Vec<String> = Vec::with_capacity(self.entries.len());
        while let Some(name) = queue.pop_front() {
            order.push(name.to_string());
            if let Some(kids) = children.get(name) {
                queue.extend(kids.iter().copied());
            }
        }
        if order.len() != self.entries.len() {
            return Err(RenderError::Registry("inheritance cycle detected".to_string()));
        }

        for name in &order {
            let ancestors = match self.entries[name].parent.clone() {
                Some(parent) => {
                    let mut chain = vec![parent.clone()];
                    chain.extend(self.entries[&parent].ancestors.iter().cloned());
                    chain
                }
                None => Vec::new(),
            };
            if let Some(entry) = self.entries.get_mut(name) {
                entry.ancestors = ancestors;
            }
        }

        self.resolved = true;
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn derives_from(&self, name: &str, ancestor: &str) -> bool {
        match self.entries.get(name) {
            Some(entry) => name == ancestor || entry.ancestors.iter().any(|a| a == ancestor),
            None => false,
        }
    }

    pub fn instantiate(&self, name: &str, properties: &Properties) -> RenderResult<Box<T>> {
        if !self.resolved {
            return Err(RenderError::Registry("registry used before resolve()".to_string()));
        }
        let entry = self.entries.get(name)
            .ok_or_else(|| RenderError::Registry(format!("unknown class {}", name)))?;
        let factory = entry.factory.as_ref()
            .ok_or_else(|| RenderError::Registry(format!("class {} is abstract", name)))?;
        factory(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named {
        fn name(&self) -> String;
    }

    struct Leaf(String);

    impl Named for Leaf {
        fn name(&self) -> String {
            self.0.clone()
        }
    }

    fn sample_registry() -> ClassRegistry<dyn Named> {
        let mut registry: ClassRegistry<dyn Named> = ClassRegistry::new();
        registry.register("leaf", Some("middle"), |props: &Properties| {
            Ok(Box::new(Leaf(props.get_string("label", "leaf"))) as Box<dyn Named>)
        });
        registry.register_abstract("middle", Some("root"));
        registry.register_abstract("root", None);
        registry
    }

    #[test]
    fn test_registry_resolves_inheritance() {
        let mut registry = sample_registry();
        assert!(registry.instantiate("leaf", &Properties::new()).is_err());

        registry.resolve().unwrap();
        assert!(registry.derives_from("leaf", "root"));
        assert!(registry.derives_from("leaf", "middle"));
        assert!(registry.derives_from("middle", "middle"));
        assert!(!registry.derives_from("root", "leaf"));

        let leaf = registry.instantiate("leaf", &Properties::new().with("label", "x")).unwrap();
        assert_eq!(leaf.name(), "x");
        assert!(registry.instantiate("middle", &Properties::new()).is_err());
        assert!(registry.instantiate("nope", &Properties::new()).is_err());
    }

    #[test]
    fn test_registry_rejects_unknown_parent_and_cycles() {
        let mut registry: ClassRegistry<dyn Named> = ClassRegistry::new();
        registry.register_abstract("orphan", Some("ghost"));
        assert!(registry.resolve().is_err());

        let mut registry: ClassRegistry<dyn Named> = ClassRegistry::new();
        registry.register_abstract("a", Some("b"));
        registry.register_abstract("b", Some("a"));
        assert!(registry.resolve().is_err());
    }
}
