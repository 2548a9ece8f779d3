//! Lexical scoping during resolution and evaluation
//!
//! A `Scope<T>` is a reference-counted environment node: local bindings,
//! nested namespaces, "used" namespaces, and a parent link. Closures capture
//! a scope handle, so a scope created inside a call frame can outlive that
//! frame; the chain is a forward child-to-parent DAG and ordinary shared
//! ownership suffices. The evaluator instantiates `T = Value` and the
//! precedence resolver `T = OperatorInfo` — the same machinery serves both.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::Association;

/// Precedence and associativity attached to an operator binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatorInfo {
    pub precedence: f64,
    pub association: Association,
}

impl OperatorInfo {
    pub fn new(precedence: f64, association: Association) -> Self {
        Self {
            precedence,
            association,
        }
    }
}

impl Default for OperatorInfo {
    fn default() -> Self {
        Self::new(0.0, Association::Left)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("local binding {0} already exists")]
    AlreadyBound(String),
    #[error("binding {0} not found")]
    NotFound(String),
    #[error("binding {0} is not mutable")]
    NotMutable(String),
    #[error("namespace {0} not found")]
    NamespaceNotFound(String),
}

/// A named slot. Reassignment through `set` mutates the slot in place, and
/// only when the binding was created mutable.
#[derive(Debug, Clone)]
pub struct Binding<T> {
    pub name: String,
    pub mutable: bool,
    pub item: T,
    pub operator_info: Option<OperatorInfo>,
}

struct ScopeData<T> {
    bindings: HashMap<String, Binding<T>>,
    namespaces: HashMap<String, Scope<T>>,
    used: Vec<Scope<T>>,
    parent: Option<Scope<T>>,
}

impl<T> Default for ScopeData<T> {
    fn default() -> Self {
        Self {
            bindings: HashMap::new(),
            namespaces: HashMap::new(),
            used: Vec::new(),
            parent: None,
        }
    }
}

pub struct Scope<T> {
    inner: Rc<RefCell<ScopeData<T>>>,
}

impl<T> Clone for Scope<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for Scope<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> std::fmt::Debug for Scope<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<scope>")
    }
}

/// The per-evaluation snapshot the REPL driver uses to roll a failed line
/// back: the scope's own tables, bindings cloned one level deep.
pub struct ScopeSnapshot<T> {
    bindings: HashMap<String, Binding<T>>,
    namespaces: HashMap<String, Scope<T>>,
    used: Vec<Scope<T>>,
}

impl<T> Scope<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ScopeData::default())),
        }
    }

    /// A nested scope with this one as parent.
    pub fn new_child(&self) -> Scope<T> {
        let child = Scope::new();
        child.inner.borrow_mut().parent = Some(self.clone());
        child
    }

    /// Create a child scope and register it as a namespace under the dotted
    /// path in this scope.
    pub fn new_namespace(&self, path: &[String]) -> Scope<T> {
        let child = self.new_child();
        self.add_namespace(path, child.clone());
        child
    }

    /// Register an existing scope as a namespace reachable along the dotted
    /// path, creating intermediate empty namespace nodes as needed.
    pub fn add_namespace(&self, path: &[String], scope: Scope<T>) {
        match path {
            [] => {}
            [name] => {
                self.inner
                    .borrow_mut()
                    .namespaces
                    .insert(name.clone(), scope);
            }
            [name, rest @ ..] => {
                let next = self
                    .inner
                    .borrow_mut()
                    .namespaces
                    .entry(name.clone())
                    .or_insert_with(Scope::new)
                    .clone();
                next.add_namespace(rest, scope);
            }
        }
    }

    /// Create a new local binding; fails if the name is already bound in
    /// this exact scope (shadowing an inherited binding is fine).
    pub fn bind(
        &self,
        name: impl Into<String>,
        item: T,
        mutable: bool,
        operator_info: Option<OperatorInfo>,
    ) -> Result<(), ScopeError> {
        let name = name.into();
        let mut data = self.inner.borrow_mut();
        if data.bindings.contains_key(&name) {
            return Err(ScopeError::AlreadyBound(name));
        }
        data.bindings.insert(
            name.clone(),
            Binding {
                name,
                mutable,
                item,
                operator_info,
            },
        );
        Ok(())
    }

    /// Bind under a dotted namespace path, creating namespaces as needed.
    pub fn bind_namespaced(
        &self,
        name: impl Into<String>,
        item: T,
        path: &[String],
        operator_info: Option<OperatorInfo>,
    ) -> Result<(), ScopeError> {
        if path.is_empty() {
            return self.bind(name, item, false, operator_info);
        }
        self.ensure_namespace(path).bind(name, item, false, operator_info)
    }

    fn ensure_namespace(&self, path: &[String]) -> Scope<T> {
        let mut current = self.clone();
        for name in path {
            let next = current
                .inner
                .borrow_mut()
                .namespaces
                .entry(name.clone())
                .or_insert_with(Scope::new)
                .clone();
            current = next;
        }
        current
    }

    /// Find the scope that owns a binding for `name`: local bindings first,
    /// then each used namespace's own bindings (first match wins, one level
    /// deep), then the parent chain.
    fn owner_of(&self, name: &str) -> Option<Scope<T>> {
        if self.inner.borrow().bindings.contains_key(name) {
            return Some(self.clone());
        }
        let (used, parent) = {
            let data = self.inner.borrow();
            (data.used.clone(), data.parent.clone())
        };
        for namespace in used {
            if namespace.inner.borrow().bindings.contains_key(name) {
                return Some(namespace);
            }
        }
        parent?.owner_of(name)
    }

    /// Mutate an existing binding in place; the binding must resolve and be
    /// mutable.
    pub fn set(&self, name: &str, item: T) -> Result<(), ScopeError> {
        let owner = self
            .owner_of(name)
            .ok_or_else(|| ScopeError::NotFound(name.to_string()))?;
        let mut data = owner.inner.borrow_mut();
        let binding = data
            .bindings
            .get_mut(name)
            .ok_or_else(|| ScopeError::NotFound(name.to_string()))?;
        if !binding.mutable {
            return Err(ScopeError::NotMutable(name.to_string()));
        }
        binding.item = item;
        Ok(())
    }

    /// Resolve a single namespace segment: local namespaces, then used
    /// namespaces' own tables, then the parent chain.
    fn namespace(&self, name: &str) -> Option<Scope<T>> {
        if let Some(scope) = self.inner.borrow().namespaces.get(name) {
            return Some(scope.clone());
        }
        let (used, parent) = {
            let data = self.inner.borrow();
            (data.used.clone(), data.parent.clone())
        };
        for namespace in used {
            if let Some(scope) = namespace.inner.borrow().namespaces.get(name) {
                return Some(scope.clone());
            }
        }
        parent?.namespace(name)
    }

    /// Resolve a dotted namespace path.
    pub fn get_namespace(&self, path: &[String]) -> Result<Scope<T>, ScopeError> {
        let mut current = self.clone();
        for name in path {
            current = current
                .namespace(name)
                .ok_or_else(|| ScopeError::NamespaceNotFound(path.join(".")))?;
        }
        Ok(current)
    }

    /// Add a namespace to the unqualified-lookup search set.
    pub fn use_namespace(&self, path: &[String]) -> Result<(), ScopeError> {
        let namespace = self.get_namespace(path)?;
        self.inner.borrow_mut().used.push(namespace);
        Ok(())
    }
}

impl<T: Clone> Scope<T> {
    /// Resolve a name to its bound item.
    pub fn get(&self, name: &str) -> Result<T, ScopeError> {
        let owner = self
            .owner_of(name)
            .ok_or_else(|| ScopeError::NotFound(name.to_string()))?;
        let item = owner
            .inner
            .borrow()
            .bindings
            .get(name)
            .map(|binding| binding.item.clone());
        item.ok_or_else(|| ScopeError::NotFound(name.to_string()))
    }

    /// Resolve a name inside a dotted namespace path.
    pub fn get_namespaced(&self, name: &str, path: &[String]) -> Result<T, ScopeError> {
        self.get_namespace(path)?.get(name)
    }

    pub fn snapshot(&self) -> ScopeSnapshot<T> {
        let data = self.inner.borrow();
        ScopeSnapshot {
            bindings: data.bindings.clone(),
            namespaces: data.namespaces.clone(),
            used: data.used.clone(),
        }
    }

    pub fn restore(&self, snapshot: ScopeSnapshot<T>) {
        let mut data = self.inner.borrow_mut();
        data.bindings = snapshot.bindings;
        data.namespaces = snapshot.namespaces;
        data.used = snapshot.used;
    }
}

impl<T> Default for Scope<T> {
    fn default() -> Self {
        Self::new()
    }
}
