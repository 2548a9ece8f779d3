//! The live parse-time record of which names denote operators, definitions,
//! and namespaces
//!
//! `Context` is an immutable persistent value: cloning copies a handle, and
//! every change builds a new node sharing the parent chain. A
//! [`super::Checkpoint`] captures one by handle, which is what lets the
//! grammar answer "is `x` an operator here" mid-parse while still supporting
//! unlimited backtracking.

use std::collections::HashMap;
use std::rc::Rc;

use crate::interpreter::OperatorInfo;

/// A name learned during parsing. Operator definitions additionally carry
/// precedence and associativity, which is how the grammar decides whether an
/// identifier token is an operator occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub operator_info: Option<OperatorInfo>,
}

impl Definition {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operator_info: None,
        }
    }

    pub fn operator(name: impl Into<String>, info: OperatorInfo) -> Self {
        Self {
            name: name.into(),
            operator_info: Some(info),
        }
    }
}

#[derive(Debug, Default)]
struct ContextData {
    definitions: HashMap<String, Definition>,
    namespaces: HashMap<String, Context>,
    used: Vec<Context>,
    parent: Option<Context>,
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    inner: Rc<ContextData>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definitions(definitions: impl IntoIterator<Item = Definition>) -> Self {
        Self {
            inner: Rc::new(ContextData {
                definitions: definitions
                    .into_iter()
                    .map(|def| (def.name.clone(), def))
                    .collect(),
                ..ContextData::default()
            }),
        }
    }

    /// Shallow copy of the node's own tables, for building a changed sibling
    /// that shares the parent chain.
    fn data(&self) -> ContextData {
        ContextData {
            definitions: self.inner.definitions.clone(),
            namespaces: self.inner.namespaces.clone(),
            used: self.inner.used.clone(),
            parent: self.inner.parent.clone(),
        }
    }

    /// A nested context: empty local definitions, the namespace table carried
    /// over, and this context as the parent.
    pub fn new_child(&self) -> Context {
        Context {
            inner: Rc::new(ContextData {
                definitions: HashMap::new(),
                namespaces: self.inner.namespaces.clone(),
                used: Vec::new(),
                parent: Some(self.clone()),
            }),
        }
    }

    /// The enclosing context, or an empty root when already at the top.
    pub fn pop(&self) -> Context {
        self.inner.parent.clone().unwrap_or_default()
    }

    pub fn add_definition(&self, definition: Definition) -> Context {
        let mut data = self.data();
        data.definitions.insert(definition.name.clone(), definition);
        Context {
            inner: Rc::new(data),
        }
    }

    /// Register a definition under a dotted namespace path, creating
    /// intermediate namespace nodes as needed.
    pub fn add_namespaced_definition(
        &self,
        namespaces: &[String],
        definition: Definition,
    ) -> Context {
        match namespaces {
            [] => self.add_definition(definition),
            [name, rest @ ..] => {
                let nested = self
                    .inner
                    .namespaces
                    .get(name)
                    .cloned()
                    .unwrap_or_default()
                    .add_namespaced_definition(rest, definition);
                let mut data = self.data();
                data.namespaces.insert(name.clone(), nested);
                Context {
                    inner: Rc::new(data),
                }
            }
        }
    }

    pub fn add_namespace(&self, namespaces: &[String], inner: Context) -> Context {
        match namespaces {
            [] => self.clone(),
            [name] => {
                let mut data = self.data();
                data.namespaces.insert(name.clone(), inner);
                Context {
                    inner: Rc::new(data),
                }
            }
            [name, rest @ ..] => {
                let nested = self
                    .inner
                    .namespaces
                    .get(name)
                    .cloned()
                    .unwrap_or_default()
                    .add_namespace(rest, inner);
                let mut data = self.data();
                data.namespaces.insert(name.clone(), nested);
                Context {
                    inner: Rc::new(data),
                }
            }
        }
    }

    /// Resolve a definition: local first, then each used namespace's local
    /// definitions (first match wins), then the parent chain.
    pub fn get_definition(&self, name: &str) -> Option<&Definition> {
        if let Some(definition) = self.inner.definitions.get(name) {
            return Some(definition);
        }
        for used in &self.inner.used {
            if let Some(definition) = used.inner.definitions.get(name) {
                return Some(definition);
            }
        }
        self.inner.parent.as_ref()?.get_definition(name)
    }

    /// Resolve a dotted namespace path: local namespaces, then used
    /// namespaces, then the parent chain.
    pub fn get_namespace(&self, namespaces: &[String]) -> Option<&Context> {
        let (name, rest) = match namespaces {
            [] => return Some(self),
            [name, rest @ ..] => (name, rest),
        };
        if let Some(context) = self.inner.namespaces.get(name) {
            return context.get_namespace(rest);
        }
        for used in &self.inner.used {
            if let Some(context) = used.get_namespace(namespaces) {
                return Some(context);
            }
        }
        self.inner.parent.as_ref()?.get_namespace(namespaces)
    }

    /// Mark a namespace as used for unqualified lookup; `None` when the path
    /// does not resolve.
    pub fn use_namespace(&self, namespaces: &[String]) -> Option<Context> {
        let used = self.get_namespace(namespaces)?.clone();
        let mut data = self.data();
        data.used.push(used);
        Some(Context {
            inner: Rc::new(data),
        })
    }
}
