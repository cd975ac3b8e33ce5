use std::collections::HashMap;

use crate::vm::Segment;

/// Storage class of a Jack variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Static,
    Field,
    Argument,
    Local,
}

impl SymbolKind {
    /// The VM segment this kind of variable lives in. Fields are addressed
    /// through `this` once the receiver pointer is set.
    pub fn segment(self) -> Segment {
        match self {
            SymbolKind::Static => Segment::Static,
            SymbolKind::Field => Segment::This,
            SymbolKind::Argument => Segment::Argument,
            SymbolKind::Local => Segment::Local,
        }
    }

    fn is_class_scope(self) -> bool {
        matches!(self, SymbolKind::Static | SymbolKind::Field)
    }
}

/// A resolved variable: declared type, storage kind, and the kind-local
/// ordinal assigned at declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub ty: String,
    pub kind: SymbolKind,
    pub index: u16,
}

/// Two-scope symbol table for one compilation unit.
///
/// The class scope holds `static` and `field` symbols for the lifetime of the
/// unit; the subroutine scope holds `argument` and `local` symbols and is
/// cleared at the start of each subroutine. Lookup consults the subroutine
/// scope first. Indices count per kind within a scope and are never reused.
#[derive(Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Symbol>,
    subroutine_scope: HashMap<String, Symbol>,
    statics: u16,
    fields: u16,
    arguments: u16,
    locals: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the subroutine scope. Called at the start of each subroutine.
    pub fn reset_subroutine_scope(&mut self) {
        self.subroutine_scope.clear();
        self.arguments = 0;
        self.locals = 0;
    }

    /// Define a symbol, assigning the next index for its kind. Returns the
    /// assigned index, or `None` if the name is already taken in that scope.
    pub fn define(&mut self, name: &str, ty: &str, kind: SymbolKind) -> Option<u16> {
        let scope = if kind.is_class_scope() {
            &mut self.class_scope
        } else {
            &mut self.subroutine_scope
        };
        if scope.contains_key(name) {
            return None;
        }

        let counter = match kind {
            SymbolKind::Static => &mut self.statics,
            SymbolKind::Field => &mut self.fields,
            SymbolKind::Argument => &mut self.arguments,
            SymbolKind::Local => &mut self.locals,
        };
        let index = *counter;
        *counter += 1;

        scope.insert(
            name.to_string(),
            Symbol {
                ty: ty.to_string(),
                kind,
                index,
            },
        );
        Some(index)
    }

    /// Resolve a name, subroutine scope first, then class scope.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    /// Number of symbols of the given kind currently defined.
    pub fn count_of(&self, kind: SymbolKind) -> u16 {
        match kind {
            SymbolKind::Static => self.statics,
            SymbolKind::Field => self.fields,
            SymbolKind::Argument => self.arguments,
            SymbolKind::Local => self.locals,
        }
    }
}
