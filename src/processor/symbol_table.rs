//! Two-scope symbol table: class scope (`Static`, `Field`) and subroutine
//! scope (`Argument`, `Local`).
//!
//! Indices are handed out per kind in declaration order and never reused
//! within a scope. `reset_scope` drops the subroutine scope in bulk and
//! leaves the class scope untouched. A subroutine-scope name may reuse a
//! class-scope name and shadows it until the next reset.

use std::collections::HashMap;

use super::lexer::is_identifier;
use super::vm::Segment;
use crate::error::SymbolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Argument,
    Local,
}

impl Kind {
    fn slot(self) -> usize {
        match self {
            Kind::Static => 0,
            Kind::Field => 1,
            Kind::Argument => 2,
            Kind::Local => 3,
        }
    }

    fn is_class_scope(self) -> bool {
        matches!(self, Kind::Static | Kind::Field)
    }

    /// VM memory segment a variable of this kind lives in.
    pub fn segment(self) -> Segment {
        match self {
            Kind::Static => Segment::Static,
            Kind::Field => Segment::This,
            Kind::Argument => Segment::Argument,
            Kind::Local => Segment::Local,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub ty: String,
    pub kind: Kind,
    pub index: u16,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Entry>,
    subroutine_scope: HashMap<String, Entry>,
    counts: [u16; 4],
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` and returns the index it was given.
    pub fn define(&mut self, name: &str, ty: &str, kind: Kind) -> Result<u16, SymbolError> {
        if name.trim().is_empty() {
            return Err(SymbolError::EmptyName);
        }
        if !is_identifier(name) {
            return Err(SymbolError::InvalidName(name.to_string()));
        }

        let scope = if kind.is_class_scope() {
            &mut self.class_scope
        } else {
            &mut self.subroutine_scope
        };
        if scope.contains_key(name) {
            return Err(SymbolError::Duplicate(name.to_string()));
        }

        let index = self.counts[kind.slot()];
        scope.insert(
            name.to_string(),
            Entry {
                ty: ty.to_string(),
                kind,
                index,
            },
        );
        self.counts[kind.slot()] += 1;
        Ok(index)
    }

    /// Starts a new subroutine: forgets every argument and local.
    pub fn reset_scope(&mut self) {
        self.subroutine_scope.clear();
        self.counts[Kind::Argument.slot()] = 0;
        self.counts[Kind::Local.slot()] = 0;
    }

    pub fn var_count(&self, kind: Kind) -> u16 {
        self.counts[kind.slot()]
    }

    pub fn lookup(&self, name: &str) -> Option<&Entry> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    /// `None` means the name is not a variable in scope; callers use that to
    /// treat it as a class name.
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.lookup(name).map(|e| e.kind)
    }

    pub fn type_of(&self, name: &str) -> Result<&str, SymbolError> {
        self.lookup(name)
            .map(|e| e.ty.as_str())
            .ok_or_else(|| SymbolError::Undefined(name.to_string()))
    }

    pub fn index_of(&self, name: &str) -> Result<u16, SymbolError> {
        self.lookup(name)
            .map(|e| e.index)
            .ok_or_else(|| SymbolError::Undefined(name.to_string()))
    }
}
