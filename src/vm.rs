//! The stack-VM instruction set shared by both toolchain stages.
//!
//! The Jack compiler emits `Vec<VmOp>` and renders it to `.vm` text; the VM
//! translator parses `.vm` text back into `Vec<VmOp>` and lowers it to Hack
//! assembly. `Display` renders the canonical one-instruction-per-line form.

use std::fmt;

use crate::diagnostic::Diagnostic;
use crate::span::{Span, Spanned};

/// Number of 16-bit slots in the temp segment (RAM[5..=12]).
pub const TEMP_SLOTS: u16 = 8;

/// The eight VM memory segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Pointer,
    Temp,
    Static,
}

impl Segment {
    pub fn name(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
            Segment::Static => "static",
        }
    }

    pub fn from_name(s: &str) -> Option<Segment> {
        match s {
            "constant" => Some(Segment::Constant),
            "local" => Some(Segment::Local),
            "argument" => Some(Segment::Argument),
            "this" => Some(Segment::This),
            "that" => Some(Segment::That),
            "pointer" => Some(Segment::Pointer),
            "temp" => Some(Segment::Temp),
            "static" => Some(Segment::Static),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One VM instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum VmOp {
    // ── Memory access ──
    Push(Segment, u16),
    Pop(Segment, u16),

    // ── Arithmetic / logical ──
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,

    // ── Branching ──
    Label(String),
    Goto(String),
    IfGoto(String),

    // ── Functions ──
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

impl fmt::Display for VmOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmOp::Push(seg, i) => write!(f, "push {} {}", seg, i),
            VmOp::Pop(seg, i) => write!(f, "pop {} {}", seg, i),
            VmOp::Add => write!(f, "add"),
            VmOp::Sub => write!(f, "sub"),
            VmOp::Neg => write!(f, "neg"),
            VmOp::Eq => write!(f, "eq"),
            VmOp::Gt => write!(f, "gt"),
            VmOp::Lt => write!(f, "lt"),
            VmOp::And => write!(f, "and"),
            VmOp::Or => write!(f, "or"),
            VmOp::Not => write!(f, "not"),
            VmOp::Label(l) => write!(f, "label {}", l),
            VmOp::Goto(l) => write!(f, "goto {}", l),
            VmOp::IfGoto(l) => write!(f, "if-goto {}", l),
            VmOp::Function { name, locals } => write!(f, "function {} {}", name, locals),
            VmOp::Call { name, args } => write!(f, "call {} {}", name, args),
            VmOp::Return => write!(f, "return"),
        }
    }
}

/// Render a program as `.vm` text, one instruction per line.
pub fn render(ops: &[VmOp]) -> String {
    let mut out = String::new();
    for op in ops {
        out.push_str(&op.to_string());
        out.push('\n');
    }
    out
}

// ─── .vm parsing ──────────────────────────────────────────────────

/// Parse `.vm` source text. Lines hold one instruction each; `//` begins an
/// end-of-line comment; tokens are whitespace-separated and case-sensitive.
pub fn parse_source(source: &str) -> (Vec<Spanned<VmOp>>, Vec<Diagnostic>) {
    let mut ops = Vec::new();
    let mut diagnostics = Vec::new();
    let mut offset = 0u32;

    for line in source.split('\n') {
        let line_len = line.len() as u32 + 1;
        let code = match line.find("//") {
            Some(i) => &line[..i],
            None => line,
        };
        let trimmed = code.trim();
        if !trimmed.is_empty() {
            let lead = (code.len() - code.trim_start().len()) as u32;
            let span = Span::new(offset + lead, offset + lead + trimmed.len() as u32);
            match parse_line(trimmed, span) {
                Ok(op) => ops.push(Spanned::new(op, span)),
                Err(diag) => diagnostics.push(diag),
            }
        }
        offset += line_len;
    }

    (ops, diagnostics)
}

fn parse_line(line: &str, span: Span) -> Result<VmOp, Diagnostic> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap();
    let operands: Vec<&str> = parts.collect();

    let arity = |n: usize| -> Result<(), Diagnostic> {
        if operands.len() == n {
            Ok(())
        } else if n == 0 {
            Err(Diagnostic::error(
                format!("'{}' takes no operands", cmd),
                span,
            ))
        } else {
            Err(Diagnostic::error(
                format!(
                    "'{}' takes {} operand(s), found {}",
                    cmd,
                    n,
                    operands.len()
                ),
                span,
            ))
        }
    };

    let op = match cmd {
        "add" | "sub" | "neg" | "eq" | "gt" | "lt" | "and" | "or" | "not" | "return" => {
            arity(0)?;
            match cmd {
                "add" => VmOp::Add,
                "sub" => VmOp::Sub,
                "neg" => VmOp::Neg,
                "eq" => VmOp::Eq,
                "gt" => VmOp::Gt,
                "lt" => VmOp::Lt,
                "and" => VmOp::And,
                "or" => VmOp::Or,
                "not" => VmOp::Not,
                _ => VmOp::Return,
            }
        }
        "push" | "pop" => {
            arity(2)?;
            let (seg, index) = parse_segment_pair(operands[0], operands[1], span)?;
            if cmd == "push" {
                VmOp::Push(seg, index)
            } else {
                if seg == Segment::Constant {
                    return Err(Diagnostic::error(
                        "cannot pop to the constant segment".to_string(),
                        span,
                    )
                    .with_help("constant is a virtual segment with no storage".to_string()));
                }
                VmOp::Pop(seg, index)
            }
        }
        "label" | "goto" | "if-goto" => {
            arity(1)?;
            let label = parse_label(operands[0], span)?;
            match cmd {
                "label" => VmOp::Label(label),
                "goto" => VmOp::Goto(label),
                _ => VmOp::IfGoto(label),
            }
        }
        "function" | "call" => {
            arity(2)?;
            let name = parse_label(operands[0], span)?;
            let count = parse_index(operands[1], span)?;
            if cmd == "function" {
                VmOp::Function {
                    name,
                    locals: count,
                }
            } else {
                VmOp::Call { name, args: count }
            }
        }
        other => {
            return Err(
                Diagnostic::error(format!("'{}' is not a VM command", other), span).with_help(
                    "expected an arithmetic, push/pop, branching, or function command".to_string(),
                ),
            )
        }
    };

    Ok(op)
}

fn parse_segment_pair(
    seg_name: &str,
    index_text: &str,
    span: Span,
) -> Result<(Segment, u16), Diagnostic> {
    let seg = Segment::from_name(seg_name).ok_or_else(|| {
        Diagnostic::error(format!("'{}' is not a memory segment", seg_name), span).with_help(
            "segments are constant, local, argument, this, that, pointer, temp, static"
                .to_string(),
        )
    })?;
    let index = parse_index(index_text, span)?;

    match seg {
        Segment::Pointer if index > 1 => Err(Diagnostic::error(
            format!("pointer index must be 0 or 1, got {}", index),
            span,
        )
        .with_help("pointer 0 is THIS, pointer 1 is THAT".to_string())),
        Segment::Temp if index >= TEMP_SLOTS => Err(Diagnostic::error(
            format!("temp index must be below {}, got {}", TEMP_SLOTS, index),
            span,
        )
        .with_help("the temp segment occupies RAM[5..=12]".to_string())),
        _ => Ok((seg, index)),
    }
}

fn parse_index(text: &str, span: Span) -> Result<u16, Diagnostic> {
    text.parse::<u16>().map_err(|_| {
        Diagnostic::error(
            format!("'{}' is not a non-negative decimal index", text),
            span,
        )
    })
}

fn parse_label(text: &str, span: Span) -> Result<String, Diagnostic> {
    let mut chars = text.chars();
    let head_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '_' | '.' | ':' | '$'));
    let tail_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '$'));
    if !head_ok || !tail_ok {
        return Err(Diagnostic::error(
            format!("'{}' is not a valid name", text),
            span,
        )
        .with_help(
            "names use letters, digits, '_', '.', ':' and '$', and cannot start with a digit"
                .to_string(),
        ));
    }
    Ok(text.to_string())
}
