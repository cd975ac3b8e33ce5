use std::collections::HashMap;

use crate::span::Spanned;
use crate::vm::{Segment, VmOp};

/// Stack base address at power-up; `SP = 256` is the whole bootstrap memory
/// setup, the segment pointers are then established by the first `call`.
const STACK_BASE: u16 = 256;

/// Base RAM address of the temp segment.
const TEMP_BASE: u16 = 5;

/// Lowers VM instructions to Hack assembly.
///
/// Hack has a single flat label namespace, so `label`/`goto`/`if-goto` names
/// are scoped as `currentFunction$name`, and each `call` site claims a
/// return-address symbol `callerFn$ret.N` with N counting per caller.
/// Comparison sites claim `SET_TRUEk`/`ENDk` pairs from a counter that is
/// never reset, keeping the labels unique across every file of a
/// translation.
pub struct HackLowering {
    /// Comparison-site counter (`eq`/`gt`/`lt`).
    cmp_counter: u32,
    /// Enclosing function context for label scoping and return addresses.
    current_function: String,
    /// Return-address ordinals claimed so far, per calling function.
    return_counts: HashMap<String, u32>,
    /// Basename of the file being lowered; prefixes static symbols.
    static_prefix: String,
}

impl Default for HackLowering {
    fn default() -> Self {
        Self::new()
    }
}

impl HackLowering {
    pub fn new() -> Self {
        Self {
            cmp_counter: 0,
            current_function: "Bootstrap".to_string(),
            return_counts: HashMap::new(),
            static_prefix: String::new(),
        }
    }

    /// Emit the multi-file prelude: point SP at the stack base and transfer
    /// control to `Sys.init`. Runs under the `Bootstrap` function context,
    /// whose return-address label is emitted but never reached.
    pub fn emit_bootstrap(&mut self, out: &mut Vec<String>) {
        out.push(format!("@{}", STACK_BASE));
        out.push("D=A".to_string());
        out.push("@SP".to_string());
        out.push("M=D".to_string());
        self.lower_op(
            &VmOp::Call {
                name: "Sys.init".to_string(),
                args: 0,
            },
            out,
        );
    }

    /// Lower one input file. Statics are named `<basename>.<i>`, so files
    /// in the same translation share no static storage.
    pub fn lower_file(&mut self, basename: &str, ops: &[Spanned<VmOp>], out: &mut Vec<String>) {
        self.static_prefix = basename.to_string();
        for op in ops {
            self.lower_op(&op.node, out);
        }
    }

    pub fn lower_op(&mut self, op: &VmOp, out: &mut Vec<String>) {
        match op {
            VmOp::Push(segment, index) => self.lower_push(*segment, *index, out),
            VmOp::Pop(segment, index) => self.lower_pop(*segment, *index, out),

            // ── Unary arithmetic ──
            VmOp::Neg => self.lower_unary("D=-D", out),
            VmOp::Not => self.lower_unary("D=!D", out),

            // ── Binary arithmetic ──
            VmOp::Add => self.lower_binary("D=D+M", out),
            VmOp::Sub => self.lower_binary("D=M-D", out),
            VmOp::And => self.lower_binary("D=D&M", out),
            VmOp::Or => self.lower_binary("D=D|M", out),

            // ── Comparisons ──
            VmOp::Eq => self.lower_comparison("JEQ", out),
            VmOp::Gt => self.lower_comparison("JGT", out),
            VmOp::Lt => self.lower_comparison("JLT", out),

            // ── Branching ──
            VmOp::Label(name) => out.push(format!("({})", self.scoped(name))),
            VmOp::Goto(name) => {
                out.push(format!("@{}", self.scoped(name)));
                out.push("0;JMP".to_string());
            }
            VmOp::IfGoto(name) => {
                self.pop_into_d(out);
                out.push(format!("@{}", self.scoped(name)));
                out.push("D;JNE".to_string());
            }

            // ── Functions ──
            VmOp::Function { name, locals } => self.lower_function(name, *locals, out),
            VmOp::Call { name, args } => self.lower_call(name, *args, out),
            VmOp::Return => self.lower_return(out),
        }
    }

    // ── Memory access ─────────────────────────────────────────────

    fn lower_push(&mut self, segment: Segment, index: u16, out: &mut Vec<String>) {
        match segment {
            Segment::Constant => {
                out.push(format!("@{}", index));
                out.push("D=A".to_string());
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                out.push(format!("@{}", index));
                out.push("D=A".to_string());
                out.push(format!("@{}", base_pointer(segment)));
                out.push("A=D+M".to_string());
                out.push("D=M".to_string());
            }
            Segment::Temp => {
                out.push(format!("@{}", index));
                out.push("D=A".to_string());
                out.push(format!("@{}", TEMP_BASE));
                out.push("A=D+A".to_string());
                out.push("D=M".to_string());
            }
            Segment::Pointer => {
                out.push(format!("@{}", pointer_register(index)));
                out.push("D=M".to_string());
            }
            Segment::Static => {
                out.push(format!("@{}.{}", self.static_prefix, index));
                out.push("D=M".to_string());
            }
        }
        self.push_d(out);
    }

    fn lower_pop(&mut self, segment: Segment, index: u16, out: &mut Vec<String>) {
        match segment {
            Segment::Pointer => {
                self.pop_into_d(out);
                out.push(format!("@{}", pointer_register(index)));
                out.push("M=D".to_string());
            }
            Segment::Static => {
                self.pop_into_d(out);
                out.push(format!("@{}.{}", self.static_prefix, index));
                out.push("M=D".to_string());
            }
            _ => {
                // Destination address into R13, value into D, then store.
                out.push(format!("@{}", index));
                out.push("D=A".to_string());
                if segment == Segment::Temp {
                    out.push(format!("@{}", TEMP_BASE));
                    out.push("D=D+A".to_string());
                } else {
                    out.push(format!("@{}", base_pointer(segment)));
                    out.push("D=D+M".to_string());
                }
                out.push("@R13".to_string());
                out.push("M=D".to_string());
                self.pop_into_d(out);
                out.push("@R13".to_string());
                out.push("A=M".to_string());
                out.push("M=D".to_string());
            }
        }
    }

    // ── Arithmetic ────────────────────────────────────────────────

    fn lower_unary(&mut self, apply: &str, out: &mut Vec<String>) {
        self.pop_into_d(out);
        out.push(apply.to_string());
        self.push_d(out);
    }

    /// `compute` sees the right operand in D and the left operand in M.
    fn lower_binary(&mut self, compute: &str, out: &mut Vec<String>) {
        self.pop_into_d(out);
        out.push("@SP".to_string());
        out.push("AM=M-1".to_string());
        out.push(compute.to_string());
        self.push_d(out);
    }

    /// Comparisons branch on `left - right` to a claimed `SET_TRUEk` label;
    /// the false path pushes 0, the true path -1, converging at `ENDk`.
    fn lower_comparison(&mut self, jump: &str, out: &mut Vec<String>) {
        let k = self.cmp_counter;
        self.cmp_counter += 1;

        self.pop_into_d(out);
        out.push("@SP".to_string());
        out.push("AM=M-1".to_string());
        out.push("D=M-D".to_string());
        out.push(format!("@SET_TRUE{}", k));
        out.push(format!("D;{}", jump));
        out.push("D=0".to_string());
        out.push(format!("@END{}", k));
        out.push("0;JMP".to_string());
        out.push(format!("(SET_TRUE{})", k));
        out.push("D=-1".to_string());
        out.push(format!("(END{})", k));
        self.push_d(out);
    }

    // ── Calling convention ────────────────────────────────────────

    fn lower_function(&mut self, name: &str, locals: u16, out: &mut Vec<String>) {
        out.push(format!("({})", name));
        self.current_function = name.to_string();
        for _ in 0..locals {
            out.push("@SP".to_string());
            out.push("A=M".to_string());
            out.push("M=0".to_string());
            out.push("@SP".to_string());
            out.push("M=M+1".to_string());
        }
    }

    fn lower_call(&mut self, name: &str, args: u16, out: &mut Vec<String>) {
        let return_label = self.fresh_return_address();

        // Push the return address, then the caller's frame pointers.
        out.push(format!("@{}", return_label));
        out.push("D=A".to_string());
        self.push_d(out);
        for pointer in ["LCL", "ARG", "THIS", "THAT"] {
            out.push(format!("@{}", pointer));
            out.push("D=M".to_string());
            self.push_d(out);
        }

        // ARG = SP - 5 - args
        out.push("@SP".to_string());
        out.push("D=M".to_string());
        out.push("@5".to_string());
        out.push("D=D-A".to_string());
        out.push(format!("@{}", args));
        out.push("D=D-A".to_string());
        out.push("@ARG".to_string());
        out.push("M=D".to_string());

        // LCL = SP
        out.push("@SP".to_string());
        out.push("D=M".to_string());
        out.push("@LCL".to_string());
        out.push("M=D".to_string());

        out.push(format!("@{}", name));
        out.push("0;JMP".to_string());
        out.push(format!("({})", return_label));
    }

    fn lower_return(&mut self, out: &mut Vec<String>) {
        // frame = LCL
        out.push("@LCL".to_string());
        out.push("D=M".to_string());
        out.push("@R13".to_string());
        out.push("M=D".to_string());

        // retAddr = *(frame - 5); saved before *ARG is overwritten, because
        // a zero-argument callee's return address sits exactly at *ARG.
        out.push("@5".to_string());
        out.push("A=D-A".to_string());
        out.push("D=M".to_string());
        out.push("@R14".to_string());
        out.push("M=D".to_string());

        // *ARG = pop()
        self.pop_into_d(out);
        out.push("@ARG".to_string());
        out.push("A=M".to_string());
        out.push("M=D".to_string());

        // SP = ARG + 1
        out.push("@ARG".to_string());
        out.push("D=M+1".to_string());
        out.push("@SP".to_string());
        out.push("M=D".to_string());

        // Walk the frame back: THAT, THIS, ARG, LCL.
        for pointer in ["THAT", "THIS", "ARG", "LCL"] {
            out.push("@R13".to_string());
            out.push("AM=M-1".to_string());
            out.push("D=M".to_string());
            out.push(format!("@{}", pointer));
            out.push("M=D".to_string());
        }

        out.push("@R14".to_string());
        out.push("A=M".to_string());
        out.push("0;JMP".to_string());
    }

    // ── Shared fragments ──────────────────────────────────────────

    fn push_d(&mut self, out: &mut Vec<String>) {
        out.push("@SP".to_string());
        out.push("A=M".to_string());
        out.push("M=D".to_string());
        out.push("@SP".to_string());
        out.push("M=M+1".to_string());
    }

    fn pop_into_d(&mut self, out: &mut Vec<String>) {
        out.push("@SP".to_string());
        out.push("AM=M-1".to_string());
        out.push("D=M".to_string());
    }

    fn scoped(&self, label: &str) -> String {
        format!("{}${}", self.current_function, label)
    }

    fn fresh_return_address(&mut self) -> String {
        let count = self
            .return_counts
            .entry(self.current_function.clone())
            .or_insert(0);
        *count += 1;
        format!("{}$ret.{}", self.current_function, count)
    }
}

fn base_pointer(segment: Segment) -> &'static str {
    match segment {
        Segment::Local => "LCL",
        Segment::Argument => "ARG",
        Segment::This => "THIS",
        Segment::That => "THAT",
        _ => unreachable!("segment {} has no base pointer", segment),
    }
}

fn pointer_register(index: u16) -> &'static str {
    if index == 0 {
        "THIS"
    } else {
        "THAT"
    }
}
