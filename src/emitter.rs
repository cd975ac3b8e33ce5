use crate::lexeme::Lexeme;
use crate::symbols::Symbol;
use crate::vm::{Segment, VmOp};

/// Accumulates the VM instructions of one compilation unit.
///
/// The parser drives this directly while descending the grammar; the helpers
/// encode the calling-convention and constant-lowering rules so the parser
/// only states intent.
#[derive(Default)]
pub struct CodeEmitter {
    ops: Vec<VmOp>,
}

impl CodeEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, op: VmOp) {
        self.ops.push(op);
    }

    pub fn push(&mut self, segment: Segment, index: u16) {
        self.emit(VmOp::Push(segment, index));
    }

    pub fn pop(&mut self, segment: Segment, index: u16) {
        self.emit(VmOp::Pop(segment, index));
    }

    pub fn push_symbol(&mut self, symbol: &Symbol) {
        self.push(symbol.kind.segment(), symbol.index);
    }

    pub fn pop_symbol(&mut self, symbol: &Symbol) {
        self.pop(symbol.kind.segment(), symbol.index);
    }

    pub fn push_int(&mut self, value: u16) {
        self.push(Segment::Constant, value);
    }

    /// `true` is all ones; `false` and `null` are zero; `this` is the
    /// receiver pointer.
    pub fn push_keyword_constant(&mut self, keyword: &Lexeme) {
        match keyword {
            Lexeme::True => {
                self.push_int(0);
                self.emit(VmOp::Not);
            }
            Lexeme::False | Lexeme::Null => self.push_int(0),
            Lexeme::This => self.push(Segment::Pointer, 0),
            _ => unreachable!("not a keyword constant: {:?}", keyword),
        }
    }

    /// Build a string object at runtime, one appendChar call per code unit.
    pub fn push_string(&mut self, text: &str) {
        let units: Vec<u16> = text.chars().map(|c| c as u16).collect();
        self.push_int(units.len() as u16);
        self.call("String.new".to_string(), 1);
        for unit in units {
            self.push_int(unit);
            self.call("String.appendChar".to_string(), 2);
        }
    }

    /// Lower a binary operator token. `*` and `/` dispatch to the OS math
    /// routines; everything else is a native VM opcode.
    pub fn binary_op(&mut self, op: &Lexeme) {
        match op {
            Lexeme::Plus => self.emit(VmOp::Add),
            Lexeme::Minus => self.emit(VmOp::Sub),
            Lexeme::Amp => self.emit(VmOp::And),
            Lexeme::Pipe => self.emit(VmOp::Or),
            Lexeme::Lt => self.emit(VmOp::Lt),
            Lexeme::Gt => self.emit(VmOp::Gt),
            Lexeme::Eq => self.emit(VmOp::Eq),
            Lexeme::Star => self.call("Math.multiply".to_string(), 2),
            Lexeme::Slash => self.call("Math.divide".to_string(), 2),
            _ => unreachable!("not a binary operator: {:?}", op),
        }
    }

    // ── Subroutine prologues ──────────────────────────────────────

    /// `function`: plain entry, no receiver.
    pub fn declare_function(&mut self, class: &str, name: &str, locals: u16) {
        self.emit(VmOp::Function {
            name: format!("{}.{}", class, name),
            locals,
        });
    }

    /// `method`: the receiver arrives as argument 0 and becomes `this`.
    pub fn declare_method(&mut self, class: &str, name: &str, locals: u16) {
        self.declare_function(class, name, locals);
        self.push(Segment::Argument, 0);
        self.pop(Segment::Pointer, 0);
    }

    /// `constructor`: allocate one word per field and anchor `this` on it.
    pub fn declare_constructor(&mut self, class: &str, name: &str, fields: u16, locals: u16) {
        self.declare_function(class, name, locals);
        self.push_int(fields);
        self.call("Memory.alloc".to_string(), 1);
        self.pop(Segment::Pointer, 0);
    }

    pub fn call(&mut self, name: String, args: u16) {
        self.emit(VmOp::Call { name, args });
    }

    pub fn ret(&mut self) {
        self.emit(VmOp::Return);
    }

    pub fn label(&mut self, name: String) {
        self.emit(VmOp::Label(name));
    }

    pub fn goto(&mut self, name: String) {
        self.emit(VmOp::Goto(name));
    }

    pub fn if_goto(&mut self, name: String) {
        self.emit(VmOp::IfGoto(name));
    }

    pub fn finish(self) -> Vec<VmOp> {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolKind;
    use crate::vm::render;

    #[test]
    fn test_method_prologue() {
        let mut e = CodeEmitter::new();
        e.declare_method("Point", "getX", 0);
        assert_eq!(
            render(&e.finish()),
            "function Point.getX 0\npush argument 0\npop pointer 0\n"
        );
    }

    #[test]
    fn test_constructor_prologue() {
        let mut e = CodeEmitter::new();
        e.declare_constructor("Point", "new", 2, 0);
        assert_eq!(
            render(&e.finish()),
            "function Point.new 0\npush constant 2\ncall Memory.alloc 1\npop pointer 0\n"
        );
    }

    #[test]
    fn test_keyword_constants() {
        let mut e = CodeEmitter::new();
        e.push_keyword_constant(&Lexeme::True);
        e.push_keyword_constant(&Lexeme::False);
        e.push_keyword_constant(&Lexeme::Null);
        e.push_keyword_constant(&Lexeme::This);
        assert_eq!(
            render(&e.finish()),
            "push constant 0\nnot\npush constant 0\npush constant 0\npush pointer 0\n"
        );
    }

    #[test]
    fn test_push_string() {
        let mut e = CodeEmitter::new();
        e.push_string("Hi");
        assert_eq!(
            render(&e.finish()),
            "push constant 2\ncall String.new 1\npush constant 72\ncall String.appendChar 2\npush constant 105\ncall String.appendChar 2\n"
        );
    }

    #[test]
    fn test_field_symbol_uses_this_segment() {
        let sym = Symbol {
            ty: "int".into(),
            kind: SymbolKind::Field,
            index: 3,
        };
        let mut e = CodeEmitter::new();
        e.push_symbol(&sym);
        e.pop_symbol(&sym);
        assert_eq!(render(&e.finish()), "push this 3\npop this 3\n");
    }

    #[test]
    fn test_star_and_slash_become_os_calls() {
        let mut e = CodeEmitter::new();
        e.binary_op(&Lexeme::Star);
        e.binary_op(&Lexeme::Slash);
        assert_eq!(
            render(&e.finish()),
            "call Math.multiply 2\ncall Math.divide 2\n"
        );
    }
}
