use crate::diagnostic::Diagnostic;
use crate::emitter::CodeEmitter;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};
use crate::symbols::{Symbol, SymbolKind, SymbolTable};
use crate::vm::{Segment, VmOp};

const MAX_NESTING_DEPTH: u32 = 256;

/// Single-pass recursive-descent parser and code generator for one Jack
/// class. There is no AST: the parser walks the token stream once, keeping
/// the symbol table current and driving the emitter as each production is
/// recognized.
///
/// All state is per-instance, so one compilation unit can never leak label
/// numbers or symbols into the next.
pub struct Parser {
    tokens: Vec<Spanned<Lexeme>>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    symbols: SymbolTable,
    emitter: CodeEmitter,
    class_name: String,
    label_counter: u32,
    depth: u32,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned<Lexeme>>) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            symbols: SymbolTable::new(),
            emitter: CodeEmitter::new(),
            class_name: String::new(),
            label_counter: 0,
            depth: 0,
        }
    }

    /// Compile the single class this token stream must contain. The first
    /// diagnostic aborts the unit; no partial program is returned.
    pub fn compile_class(mut self) -> Result<Vec<VmOp>, Vec<Diagnostic>> {
        self.parse_class();
        if self.diagnostics.is_empty() {
            Ok(self.emitter.finish())
        } else {
            Err(self.diagnostics)
        }
    }

    fn parse_class(&mut self) {
        self.expect(&Lexeme::Class);
        let name = self.expect_ident();
        self.class_name = name.node;
        self.expect(&Lexeme::LBrace);

        while !self.failed() && (self.at(&Lexeme::Static) || self.at(&Lexeme::Field)) {
            self.parse_class_var_dec();
        }

        while !self.failed()
            && (self.at(&Lexeme::Constructor)
                || self.at(&Lexeme::Function)
                || self.at(&Lexeme::Method))
        {
            self.parse_subroutine();
        }

        self.expect(&Lexeme::RBrace);
        if !self.failed() && !self.at(&Lexeme::Eof) {
            self.error_with_help(
                "expected end of file after class body",
                "each .jack file holds exactly one class",
            );
        }
    }

    fn parse_class_var_dec(&mut self) {
        let kind = if self.eat(&Lexeme::Static) {
            SymbolKind::Static
        } else {
            self.expect(&Lexeme::Field);
            SymbolKind::Field
        };
        let ty = self.parse_type();
        loop {
            let name = self.expect_ident();
            self.define_symbol(&name, &ty, kind);
            if self.failed() || !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        self.expect(&Lexeme::Semicolon);
    }

    fn parse_subroutine(&mut self) {
        let kind = self.advance().node.clone();
        self.symbols.reset_subroutine_scope();

        // Return type is parsed but plays no part in code generation: void
        // subroutines push their own zero stub at each return.
        if !self.eat(&Lexeme::Void) {
            self.parse_type();
        }
        let name = self.expect_ident();

        // A method's receiver occupies argument 0, so it is seeded before
        // any declared parameter is read.
        if kind == Lexeme::Method {
            let class_name = self.class_name.clone();
            self.symbols.define("this", &class_name, SymbolKind::Argument);
        }

        self.expect(&Lexeme::LParen);
        self.parse_parameter_list();
        self.expect(&Lexeme::RParen);

        self.expect(&Lexeme::LBrace);
        while !self.failed() && self.at(&Lexeme::Var) {
            self.parse_var_dec();
        }

        // The local count is known only now, after every `var` line.
        let locals = self.symbols.count_of(SymbolKind::Local);
        match kind {
            Lexeme::Constructor => {
                let fields = self.symbols.count_of(SymbolKind::Field);
                self.emitter
                    .declare_constructor(&self.class_name, &name.node, fields, locals);
            }
            Lexeme::Method => self
                .emitter
                .declare_method(&self.class_name, &name.node, locals),
            _ => self
                .emitter
                .declare_function(&self.class_name, &name.node, locals),
        }

        self.parse_statements();
        self.expect(&Lexeme::RBrace);
    }

    fn parse_parameter_list(&mut self) {
        if self.at(&Lexeme::RParen) {
            return;
        }
        loop {
            let ty = self.parse_type();
            let name = self.expect_ident();
            self.define_symbol(&name, &ty, SymbolKind::Argument);
            if self.failed() || !self.eat(&Lexeme::Comma) {
                break;
            }
        }
    }

    fn parse_var_dec(&mut self) {
        self.expect(&Lexeme::Var);
        let ty = self.parse_type();
        loop {
            let name = self.expect_ident();
            self.define_symbol(&name, &ty, SymbolKind::Local);
            if self.failed() || !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        self.expect(&Lexeme::Semicolon);
    }

    fn parse_type(&mut self) -> String {
        match self.peek().clone() {
            Lexeme::Int => {
                self.advance();
                "int".to_string()
            }
            Lexeme::Char => {
                self.advance();
                "char".to_string()
            }
            Lexeme::Boolean => {
                self.advance();
                "boolean".to_string()
            }
            Lexeme::Ident(name) => {
                self.advance();
                name
            }
            other => {
                self.error_at_current(&format!(
                    "expected a type, found {}",
                    other.description()
                ));
                String::new()
            }
        }
    }

    // ── Statements ────────────────────────────────────────────────

    fn parse_statements(&mut self) {
        loop {
            if self.failed() {
                return;
            }
            match self.peek() {
                Lexeme::Let => self.parse_let(),
                Lexeme::If => self.parse_if(),
                Lexeme::While => self.parse_while(),
                Lexeme::Do => self.parse_do(),
                Lexeme::Return => self.parse_return(),
                _ => return,
            }
        }
    }

    fn parse_let(&mut self) {
        self.advance(); // let
        let name = self.expect_ident();
        let Some(symbol) = self.resolve_variable(&name) else {
            return;
        };

        if self.eat(&Lexeme::LBracket) {
            // Target address first, then the value. The value is parked in
            // temp 0 while `pointer 1` is re-aimed, so the right-hand side
            // may itself read an array through that/pointer 1.
            self.emitter.push_symbol(&symbol);
            self.parse_expression();
            self.expect(&Lexeme::RBracket);
            self.emitter.emit(VmOp::Add);

            self.expect(&Lexeme::Eq);
            self.parse_expression();
            self.expect(&Lexeme::Semicolon);

            self.emitter.pop(Segment::Temp, 0);
            self.emitter.pop(Segment::Pointer, 1);
            self.emitter.push(Segment::Temp, 0);
            self.emitter.pop(Segment::That, 0);
        } else {
            self.expect(&Lexeme::Eq);
            self.parse_expression();
            self.expect(&Lexeme::Semicolon);
            self.emitter.pop_symbol(&symbol);
        }
    }

    fn parse_if(&mut self) {
        self.advance(); // if
        self.expect(&Lexeme::LParen);
        self.parse_expression();
        self.expect(&Lexeme::RParen);

        let (else_label, end_label) = self.fresh_label_pair();
        self.emitter.emit(VmOp::Not);
        self.emitter.if_goto(else_label.clone());

        self.expect(&Lexeme::LBrace);
        self.parse_statements();
        self.expect(&Lexeme::RBrace);

        self.emitter.goto(end_label.clone());
        self.emitter.label(else_label);

        if self.eat(&Lexeme::Else) {
            self.expect(&Lexeme::LBrace);
            self.parse_statements();
            self.expect(&Lexeme::RBrace);
        }

        self.emitter.label(end_label);
    }

    fn parse_while(&mut self) {
        self.advance(); // while
        let (top_label, end_label) = self.fresh_label_pair();
        self.emitter.label(top_label.clone());

        self.expect(&Lexeme::LParen);
        self.parse_expression();
        self.expect(&Lexeme::RParen);

        self.emitter.emit(VmOp::Not);
        self.emitter.if_goto(end_label.clone());

        self.expect(&Lexeme::LBrace);
        self.parse_statements();
        self.expect(&Lexeme::RBrace);

        self.emitter.goto(top_label);
        self.emitter.label(end_label);
    }

    fn parse_do(&mut self) {
        self.advance(); // do
        let head = self.expect_ident();
        self.parse_subroutine_call(head);
        self.expect(&Lexeme::Semicolon);
        // Every call leaves a return value; a do statement discards it.
        self.emitter.pop(Segment::Temp, 0);
    }

    fn parse_return(&mut self) {
        self.advance(); // return
        if self.at(&Lexeme::Semicolon) {
            // Void stub: the caller still expects one value on the stack.
            self.emitter.push_int(0);
        } else {
            self.parse_expression();
        }
        self.expect(&Lexeme::Semicolon);
        self.emitter.ret();
    }

    // ── Expressions ───────────────────────────────────────────────

    /// `expression := term (op term)*`. Jack has no operator precedence:
    /// operators apply strictly left to right, so `a + b * c` evaluates as
    /// `(a + b) * c`.
    fn parse_expression(&mut self) {
        if !self.enter_nesting() {
            return;
        }
        self.parse_term();
        while !self.failed() && self.peek().is_binary_op() {
            let op = self.advance().node.clone();
            self.parse_term();
            self.emitter.binary_op(&op);
        }
        self.exit_nesting();
    }

    fn parse_term(&mut self) {
        match self.peek().clone() {
            Lexeme::IntConst(n) => {
                self.advance();
                self.emitter.push_int(n);
            }
            Lexeme::StrConst(text) => {
                self.advance();
                self.emitter.push_string(&text);
            }
            keyword @ (Lexeme::True | Lexeme::False | Lexeme::Null | Lexeme::This) => {
                self.advance();
                self.emitter.push_keyword_constant(&keyword);
            }
            Lexeme::LParen => {
                self.advance();
                self.parse_expression();
                self.expect(&Lexeme::RParen);
            }
            Lexeme::Minus => {
                self.advance();
                self.parse_term();
                self.emitter.emit(VmOp::Neg);
            }
            Lexeme::Tilde => {
                self.advance();
                self.parse_term();
                self.emitter.emit(VmOp::Not);
            }
            Lexeme::Ident(_) => {
                let name = self.expect_ident();
                if self.at(&Lexeme::LParen) || self.at(&Lexeme::Dot) {
                    self.parse_subroutine_call(name);
                } else if self.eat(&Lexeme::LBracket) {
                    let Some(symbol) = self.resolve_variable(&name) else {
                        return;
                    };
                    self.emitter.push_symbol(&symbol);
                    self.parse_expression();
                    self.expect(&Lexeme::RBracket);
                    self.emitter.emit(VmOp::Add);
                    self.emitter.pop(Segment::Pointer, 1);
                    self.emitter.push(Segment::That, 0);
                } else {
                    let Some(symbol) = self.resolve_variable(&name) else {
                        return;
                    };
                    self.emitter.push_symbol(&symbol);
                }
            }
            other => {
                self.error_with_help(
                    &format!("expected an expression term, found {}", other.description()),
                    "terms are constants, variables, array reads, subroutine calls, \
                     parenthesized expressions, or unary '-'/'~'",
                );
            }
        }
    }

    /// Compile one of the four call forms, given the already-consumed head
    /// identifier. The receiver, if any, is pushed before the arguments.
    fn parse_subroutine_call(&mut self, head: Spanned<String>) {
        if self.eat(&Lexeme::Dot) {
            let method = self.expect_ident();
            // A head naming a declared variable is a method receiver; any
            // other head is taken to be a class name (the JackOS classes
            // are never declared in user code).
            let receiver = self.symbols.lookup(&head.node).cloned();
            let qualifier = match &receiver {
                Some(symbol) => symbol.ty.clone(),
                None => head.node.clone(),
            };

            self.expect(&Lexeme::LParen);
            if let Some(symbol) = &receiver {
                self.emitter.push_symbol(symbol);
            }
            let mut args = self.parse_expression_list();
            self.expect(&Lexeme::RParen);
            if receiver.is_some() {
                args += 1;
            }
            self.emitter.call(format!("{}.{}", qualifier, method.node), args);
        } else {
            // Bare `f(...)`: a method call on the current object.
            self.expect(&Lexeme::LParen);
            self.emitter.push(Segment::Pointer, 0);
            let args = self.parse_expression_list();
            self.expect(&Lexeme::RParen);
            self.emitter
                .call(format!("{}.{}", self.class_name, head.node), args + 1);
        }
    }

    fn parse_expression_list(&mut self) -> u16 {
        if self.at(&Lexeme::RParen) {
            return 0;
        }
        self.parse_expression();
        let mut count = 1;
        while !self.failed() && self.eat(&Lexeme::Comma) {
            self.parse_expression();
            count += 1;
        }
        count
    }

    // ── Symbol and label helpers ──────────────────────────────────

    fn define_symbol(&mut self, name: &Spanned<String>, ty: &str, kind: SymbolKind) {
        if self.symbols.define(&name.node, ty, kind).is_none() {
            self.report(Diagnostic::error(
                format!("'{}' is declared twice in the same scope", name.node),
                name.span,
            ));
        }
    }

    fn resolve_variable(&mut self, name: &Spanned<String>) -> Option<Symbol> {
        match self.symbols.lookup(&name.node) {
            Some(symbol) => Some(symbol.clone()),
            None => {
                self.report(
                    Diagnostic::error(
                        format!("undeclared variable '{}'", name.node),
                        name.span,
                    )
                    .with_help(
                        "declare it with 'var', as a parameter, or as a class 'static'/'field'"
                            .to_string(),
                    ),
                );
                None
            }
        }
    }

    /// Claim a fresh contiguous label pair from the per-class counter.
    fn fresh_label_pair(&mut self) -> (String, String) {
        let first = self.label_counter;
        self.label_counter += 2;
        (format!("L{}", first), format!("L{}", first + 1))
    }

    fn enter_nesting(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.error_with_help(
                "nesting depth exceeded (maximum 256 levels)",
                "split deeply nested expressions across several statements",
            );
            return false;
        }
        true
    }

    fn exit_nesting(&mut self) {
        self.depth -= 1;
    }

    // ── Cursor helpers ────────────────────────────────────────────

    fn peek(&self) -> &Lexeme {
        &self.tokens[self.pos].node
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn advance(&mut self) -> &Spanned<Lexeme> {
        let tok = &self.tokens[self.pos];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, token: &Lexeme) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn eat(&mut self, token: &Lexeme) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Lexeme) {
        if self.at(token) {
            self.advance();
        } else {
            self.error_at_current(&format!(
                "expected {}, found {}",
                token.description(),
                self.peek().description()
            ));
        }
    }

    fn expect_ident(&mut self) -> Spanned<String> {
        if let Lexeme::Ident(name) = self.peek().clone() {
            let span = self.current_span();
            self.advance();
            Spanned::new(name, span)
        } else {
            self.error_at_current(&format!(
                "expected identifier, found {}",
                self.peek().description()
            ));
            Spanned::new("_error_".to_string(), self.current_span())
        }
    }

    fn failed(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Record a diagnostic. Only the first survives: the unit is abandoned
    /// at the first error, and anything the unwinding productions would
    /// report after it is cascade noise.
    fn report(&mut self, diag: Diagnostic) {
        if self.diagnostics.is_empty() {
            self.diagnostics.push(diag);
        }
    }

    fn error_at_current(&mut self, msg: &str) {
        let span = self.current_span();
        self.report(Diagnostic::error(msg.to_string(), span));
    }

    fn error_with_help(&mut self, msg: &str, help: &str) {
        let span = self.current_span();
        self.report(Diagnostic::error(msg.to_string(), span).with_help(help.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::vm::render;

    fn compile(source: &str) -> String {
        let (tokens, lex_errors) = Lexer::new(source).tokenize();
        assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);
        let ops = Parser::new(tokens)
            .compile_class()
            .expect("compilation failed");
        render(&ops)
    }

    fn compile_err(source: &str) -> Vec<Diagnostic> {
        let (tokens, lex_errors) = Lexer::new(source).tokenize();
        assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);
        Parser::new(tokens)
            .compile_class()
            .expect_err("compilation should have failed")
    }

    #[test]
    fn test_scalar_let() {
        let vm = compile("class C { function void f() { var int x; let x = 1 + 2; return; } }");
        assert_eq!(
            vm,
            "function C.f 1\n\
             push constant 1\n\
             push constant 2\n\
             add\n\
             pop local 0\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn test_bare_call_dispatches_on_this() {
        let vm = compile("class C { method void m() { do g(); return; } }");
        assert_eq!(
            vm,
            "function C.m 0\n\
             push argument 0\n\
             pop pointer 0\n\
             push pointer 0\n\
             call C.g 1\n\
             pop temp 0\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn test_array_assignment_two_phase() {
        let vm = compile(
            "class C { function void f() { var Array a; var int i; var int v; \
             let a[i] = v; return; } }",
        );
        assert_eq!(
            vm,
            "function C.f 3\n\
             push local 0\n\
             push local 1\n\
             add\n\
             push local 2\n\
             pop temp 0\n\
             pop pointer 1\n\
             push temp 0\n\
             pop that 0\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn test_while_loop_labels() {
        let vm = compile(
            "class C { function void f() { var int x; \
             while (x < 10) { let x = x + 1; } return; } }",
        );
        assert_eq!(
            vm,
            "function C.f 1\n\
             label L0\n\
             push local 0\n\
             push constant 10\n\
             lt\n\
             not\n\
             if-goto L1\n\
             push local 0\n\
             push constant 1\n\
             add\n\
             pop local 0\n\
             goto L0\n\
             label L1\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn test_constructor_allocates_fields() {
        let vm = compile("class C { field int x, y; constructor C new() { return this; } }");
        assert_eq!(
            vm,
            "function C.new 0\n\
             push constant 2\n\
             call Memory.alloc 1\n\
             pop pointer 0\n\
             push pointer 0\n\
             return\n"
        );
    }

    #[test]
    fn test_operators_apply_left_to_right() {
        // No precedence: 1 + 2 * 3 is (1 + 2) * 3.
        let vm = compile("class C { function void f() { var int x; let x = 1 + 2 * 3; return; } }");
        assert_eq!(
            vm,
            "function C.f 1\n\
             push constant 1\n\
             push constant 2\n\
             add\n\
             push constant 3\n\
             call Math.multiply 2\n\
             pop local 0\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn test_method_receiver_is_argument_zero() {
        let vm = compile(
            "class Point { field int x; method int shifted(int dx) { return x + dx; } }",
        );
        assert_eq!(
            vm,
            "function Point.shifted 0\n\
             push argument 0\n\
             pop pointer 0\n\
             push this 0\n\
             push argument 1\n\
             add\n\
             return\n"
        );
    }

    #[test]
    fn test_call_on_declared_variable() {
        let vm = compile(
            "class C { function void f() { var Point p; do p.draw(1); return; } }",
        );
        assert_eq!(
            vm,
            "function C.f 1\n\
             push local 0\n\
             push constant 1\n\
             call Point.draw 2\n\
             pop temp 0\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn test_call_on_unknown_head_is_class_call() {
        let vm = compile("class C { function void f() { do Output.printInt(7); return; } }");
        assert_eq!(
            vm,
            "function C.f 0\n\
             push constant 7\n\
             call Output.printInt 1\n\
             pop temp 0\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn test_if_else_labels() {
        let vm = compile(
            "class C { function void f(boolean b) { var int x; \
             if (b) { let x = 1; } else { let x = 2; } return; } }",
        );
        assert_eq!(
            vm,
            "function C.f 1\n\
             push argument 0\n\
             not\n\
             if-goto L0\n\
             push constant 1\n\
             pop local 0\n\
             goto L1\n\
             label L0\n\
             push constant 2\n\
             pop local 0\n\
             label L1\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn test_nested_control_flow_claims_contiguous_pairs() {
        let vm = compile(
            "class C { function void f() { \
             while (true) { if (false) { return; } } return; } }",
        );
        assert_eq!(
            vm,
            "function C.f 0\n\
             label L0\n\
             push constant 0\n\
             not\n\
             not\n\
             if-goto L1\n\
             push constant 0\n\
             not\n\
             if-goto L2\n\
             push constant 0\n\
             return\n\
             goto L3\n\
             label L2\n\
             label L3\n\
             goto L0\n\
             label L1\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn test_array_read() {
        let vm = compile(
            "class C { function int f() { var Array a; return a[2]; } }",
        );
        assert_eq!(
            vm,
            "function C.f 1\n\
             push local 0\n\
             push constant 2\n\
             add\n\
             pop pointer 1\n\
             push that 0\n\
             return\n"
        );
    }

    #[test]
    fn test_string_constant() {
        let vm = compile("class C { function void f() { do Output.printString(\"Ok\"); return; } }");
        assert_eq!(
            vm,
            "function C.f 0\n\
             push constant 2\n\
             call String.new 1\n\
             push constant 79\n\
             call String.appendChar 2\n\
             push constant 107\n\
             call String.appendChar 2\n\
             call Output.printString 1\n\
             pop temp 0\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn test_unary_operators() {
        let vm = compile(
            "class C { function void f(int y, boolean b) { var int x; \
             let x = -y; let b = ~b; return; } }",
        );
        assert_eq!(
            vm,
            "function C.f 1\n\
             push argument 0\n\
             neg\n\
             pop local 0\n\
             push argument 1\n\
             not\n\
             pop argument 1\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn test_static_variables() {
        let vm = compile(
            "class Counter { static int total; \
             function void bump() { let total = total + 1; return; } }",
        );
        assert_eq!(
            vm,
            "function Counter.bump 0\n\
             push static 0\n\
             push constant 1\n\
             add\n\
             pop static 0\n\
             push constant 0\n\
             return\n"
        );
    }

    #[test]
    fn test_comments_and_whitespace_do_not_change_output() {
        let plain = compile("class C { function void f() { return; } }");
        let noisy = compile(
            "/** Doc. */\nclass C {\n  // comment\n  function void f() {\n    \
             /* block\n       comment */ return;\n  }\n}\n",
        );
        assert_eq!(plain, noisy);
    }

    #[test]
    fn test_parenthesized_grouping() {
        // Parentheses are the only precedence control.
        let vm = compile("class C { function int f() { return 2 * (3 + 4); } }");
        assert_eq!(
            vm,
            "function C.f 0\n\
             push constant 2\n\
             push constant 3\n\
             push constant 4\n\
             add\n\
             call Math.multiply 2\n\
             return\n"
        );
    }

    // --- Error path tests ---

    #[test]
    fn test_error_missing_semicolon() {
        let diags =
            compile_err("class C { function void f() { var int x; let x = 1 return; } }");
        assert!(
            diags[0].message.contains("expected ';', found 'return'"),
            "got: {}",
            diags[0].message
        );
    }

    #[test]
    fn test_error_bad_expression_term() {
        let diags = compile_err("class C { function void f() { return } }");
        assert!(
            diags[0].message.contains("expected an expression term"),
            "got: {}",
            diags[0].message
        );
    }

    #[test]
    fn test_error_undeclared_variable() {
        let diags = compile_err("class C { function void f() { let x = 1; return; } }");
        assert!(
            diags[0].message.contains("undeclared variable 'x'"),
            "got: {}",
            diags[0].message
        );
        assert!(diags[0].help.is_some());
    }

    #[test]
    fn test_error_duplicate_declaration() {
        let diags =
            compile_err("class C { function void f() { var int x; var int x; return; } }");
        assert!(
            diags[0].message.contains("declared twice"),
            "got: {}",
            diags[0].message
        );
    }

    #[test]
    fn test_error_trailing_tokens_after_class() {
        let diags = compile_err("class C { } class D { }");
        assert!(
            diags[0].message.contains("expected end of file"),
            "got: {}",
            diags[0].message
        );
    }

    #[test]
    fn test_error_stops_at_first() {
        // Both statements are bad; only the first is reported.
        let diags = compile_err(
            "class C { function void f() { let x = 1; let y = 2; return; } }",
        );
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'x'"));
    }
}
