//! Block/module model consumed by the evaluator.
//!
//! Built elsewhere (the repo adapter, or tests) and read-only for the whole scan.

use blockguard_types::{Location, RepoPath};
use std::collections::BTreeMap;

/// Attribute value as produced by the configuration parser.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view: numbers, and strings that parse as numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        }
    }

    /// Textual form of a scalar; `None` for null, lists and maps.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(format_number(*n)),
            Value::Null | Value::List(_) | Value::Map(_) => None,
        }
    }

    /// String rendering used when a value is bound to a variable.
    pub fn render(&self) -> String {
        match self.scalar_text() {
            Some(text) => text,
            None if matches!(self, Value::Null) => String::new(),
            None => serde_json::Value::from(self).to_string(),
        }
    }

    /// Map key or list index lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            Value::List(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Dotted-path lookup below this value.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, |cur, seg| cur.get(seg))
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// One declared configuration element: `kind "label" ... { attributes; children }`.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    kind: String,
    labels: Vec<String>,
    attributes: BTreeMap<String, Value>,
    children: Vec<Block>,
    location: Option<Location>,
    module: RepoPath,
}

impl Block {
    pub fn new<K: Into<String>>(kind: K, labels: &[&str]) -> Self {
        Self {
            kind: kind.into(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            location: None,
            module: RepoPath::default(),
        }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_attribute<N: Into<String>, V: Into<Value>>(mut self, name: N, value: V) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Block) -> Self {
        self.children.push(child);
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// First label: the resource type for `resource`/`data` blocks.
    pub fn type_label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    /// `aws_vpc.main` for resources, `data.aws_ami.ubuntu` / `module.vpc` otherwise.
    pub fn full_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.labels.len() + 1);
        if self.kind != "resource" || self.labels.is_empty() {
            parts.push(&self.kind);
        }
        parts.extend(self.labels.iter().map(String::as_str));
        parts.join(".")
    }

    pub fn children(&self) -> &[Block] {
        &self.children
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn in_module(&self) -> bool {
        !self.module.is_root()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    /// Resolve an attribute by dotted path.
    ///
    /// Each segment is looked up as an attribute first (descending into map/list values),
    /// then as a child block (the first one of that kind).
    pub fn attribute(&self, path: &str) -> Option<&Value> {
        match path.split_once('.') {
            None => self.attributes.get(path),
            Some((head, rest)) => self
                .attributes
                .get(head)
                .and_then(|value| value.lookup(rest))
                .or_else(|| self.children_named(head).next()?.attribute(rest)),
        }
    }

    pub fn children_named<'a, 'k>(
        &'a self,
        kind: &'k str,
    ) -> impl Iterator<Item = &'a Block> + use<'a, 'k> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// All nested blocks reachable through a dotted path of block kinds.
    pub fn blocks_at(&self, path: &str) -> Vec<&Block> {
        match path.split_once('.') {
            None => self.children_named(path).collect(),
            Some((head, rest)) => self
                .children_named(head)
                .flat_map(|child| child.blocks_at(rest))
                .collect(),
        }
    }

    fn assign_module(&mut self, module: &RepoPath) {
        self.module = module.clone();
        for child in &mut self.children {
            child.assign_module(module);
        }
    }
}

/// Blocks declared by one configuration unit (one directory).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Module {
    path: RepoPath,
    blocks: Vec<Block>,
}

impl Module {
    pub fn new(path: RepoPath, mut blocks: Vec<Block>) -> Self {
        for block in &mut blocks {
            block.assign_module(&path);
        }
        Self { path, blocks }
    }

    pub fn path(&self) -> &RepoPath {
        &self.path
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

/// The whole scanned tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Modules {
    modules: Vec<Module>,
}

impl Modules {
    pub fn new(modules: Vec<Module>) -> Self {
        Self { modules }
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Top-level blocks of every module, in scan order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.modules.iter().flat_map(|m| m.blocks.iter())
    }

    /// Top-level blocks whose kind or type label equals `declared_type`, in scan order.
    pub fn blocks_of_type<'a, 'k>(
        &'a self,
        declared_type: &'k str,
    ) -> impl Iterator<Item = &'a Block> + use<'a, 'k> {
        self.blocks()
            .filter(move |b| b.kind == declared_type || b.type_label() == Some(declared_type))
    }

    pub fn block_count(&self) -> usize {
        self.modules.iter().map(|m| m.blocks.len()).sum()
    }
}
