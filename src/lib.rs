pub mod diagnostic;
pub mod emitter;
pub mod lexeme;
pub mod lexer;
pub mod lower;
pub mod parser;
pub mod pipeline;
pub mod span;
pub mod symbols;
pub mod vm;

use diagnostic::Diagnostic;
use lexer::Lexer;
use lower::HackLowering;
use parser::Parser;

/// Compile one Jack class to `.vm` bytecode text.
pub fn compile_source(source: &str) -> Result<String, Vec<Diagnostic>> {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }
    let ops = Parser::new(tokens).compile_class()?;
    Ok(vm::render(&ops))
}

/// Translate one `.vm` compilation unit to Hack assembly text. `basename`
/// prefixes the unit's static symbols; `bootstrap` prepends the multi-file
/// startup prelude.
pub fn translate_source(
    basename: &str,
    source: &str,
    bootstrap: bool,
) -> Result<String, Vec<Diagnostic>> {
    let (ops, errors) = vm::parse_source(source);
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut lowering = HackLowering::new();
    let mut lines = Vec::new();
    if bootstrap {
        lowering.emit_bootstrap(&mut lines);
    }
    lowering.lower_file(basename, &ops, &mut lines);

    let mut text = lines.join("\n");
    text.push('\n');
    Ok(text)
}
