use std::collections::HashMap;
use std::fmt::{self, Display};

use thiserror::Error;

/// Symbol-table category of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Class-wide storage shared by all instances.
    Static,
    /// Per-instance storage.
    Field,
    /// Subroutine parameter.
    Argument,
    /// Subroutine local variable.
    Local,
}

impl Kind {
    /// Class-scope kinds outlive a single subroutine.
    pub fn is_class_scope(&self) -> bool {
        matches!(self, Kind::Static | Kind::Field)
    }

    fn slot(&self) -> usize {
        match self {
            Kind::Static => 0,
            Kind::Field => 1,
            Kind::Argument => 2,
            Kind::Local => 3,
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Static => "static",
            Kind::Field => "field",
            Kind::Argument => "argument",
            Kind::Local => "local",
        };
        f.write_str(name)
    }
}

/// An entry in the symbol table. Never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    typ: String,
    kind: Kind,
    index: usize,
}

impl Variable {
    /// Declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type, either a primitive keyword or a class name.
    pub fn typ(&self) -> &str {
        &self.typ
    }

    /// Which kind of storage the variable lives in.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Dense index among variables of the same kind in the same scope.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Errors reported by [`SymbolTable::define`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    /// The name is already bound in the scope the new kind belongs to.
    #[error("'{0}' is already defined in this scope")]
    Redefined(String),
}

/// Two-tier scope: a class scope that lives as long as the class, and a subroutine scope that is
/// thrown away at every subroutine boundary.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Variable>,
    subroutine_scope: HashMap<String, Variable>,
    counts: [usize; 4],
}

impl SymbolTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the subroutine scope and restarts argument and local numbering at zero.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.counts[Kind::Argument.slot()] = 0;
        self.counts[Kind::Local.slot()] = 0;
    }

    /// Binds `name` at the next free index for `kind` and returns that index.
    pub fn define(
        &mut self,
        name: &str,
        typ: &str,
        kind: Kind,
    ) -> Result<usize, SymbolError> {
        let scope = if kind.is_class_scope() {
            &mut self.class_scope
        } else {
            &mut self.subroutine_scope
        };
        if scope.contains_key(name) {
            return Err(SymbolError::Redefined(name.to_owned()));
        }
        let index = self.counts[kind.slot()];
        scope.insert(
            name.to_owned(),
            Variable {
                name: name.to_owned(),
                typ: typ.to_owned(),
                kind,
                index,
            },
        );
        self.counts[kind.slot()] += 1;
        Ok(index)
    }

    /// Number of variables of `kind` defined so far in the active scope.
    pub fn var_count(&self, kind: Kind) -> usize {
        self.counts[kind.slot()]
    }

    /// Subroutine scope first, then class scope.
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    /// Declared type of `name`, `None` if unresolved.
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(Variable::typ)
    }

    /// Kind of `name`, `None` if unresolved.
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.lookup(name).map(Variable::kind)
    }

    /// Index of `name`, `None` if unresolved.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup(name).map(Variable::index)
    }
}
