//! Pretty-printer for the C# syntax tree
//!
//! Four-space indentation, braces on their own lines, one statement per
//! line. Blank lines are collapsed and never open or close a block.

use std::fmt::{self, Write as _};

use super::syntax::{Expr, Interpolation, Stmt};

const INDENT: &str = "    ";

/// Render statements as C# source text (no trailing newline)
pub fn print(statements: &[Stmt]) -> String {
    let mut out = String::new();
    print_block(&mut out, statements, 0);
    out.truncate(out.trim_end().len());
    out
}

fn print_block(out: &mut String, statements: &[Stmt], depth: usize) {
    let mut pending_blank = false;
    let mut wrote_any = false;

    for statement in statements {
        if matches!(statement, Stmt::Blank) {
            pending_blank = wrote_any;
            continue;
        }
        if pending_blank {
            out.push('\n');
            pending_blank = false;
        }
        print_statement(out, statement, depth);
        wrote_any = true;
    }
}

fn print_statement(out: &mut String, statement: &Stmt, depth: usize) {
    let indent = INDENT.repeat(depth);
    // Writing into a String cannot fail
    let _ = match statement {
        Stmt::Var(name, value) => writeln!(out, "{}var {} = {};", indent, name, value),
        Stmt::Assign(target, value) => writeln!(out, "{}{} = {};", indent, target, value),
        Stmt::Expr(expr) => writeln!(out, "{}{};", indent, expr),
        Stmt::Comment(text) => writeln!(out, "{}// {}", indent, text),
        Stmt::Blank => Ok(()),
        Stmt::Using { name, value, body } => {
            let _ = writeln!(out, "{}using (var {} = {})", indent, name, value);
            let _ = writeln!(out, "{}{{", indent);
            print_block(out, body, depth + 1);
            writeln!(out, "{}}}", indent)
        }
    };
}

/// Escape a value for a regular C# string literal
pub fn escape_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        push_escaped(&mut escaped, c);
    }
    escaped
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '\\' => out.push_str("\\\\"),
        '"' => out.push_str("\\\""),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\0' => out.push_str("\\0"),
        c if c.is_control() => {
            let _ = write!(out, "\\u{:04X}", c as u32);
        }
        c => out.push(c),
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expr]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => f.write_str(name),
            Expr::Str(value) => write!(f, "\"{}\"", escape_string(value)),
            Expr::Number(value) => f.write_str(value),
            Expr::Bool(value) => write!(f, "{}", value),
            Expr::Interpolated(parts) => {
                f.write_str("$\"")?;
                for part in parts {
                    match part {
                        Interpolation::Text(text) => {
                            let mut escaped = String::with_capacity(text.len());
                            for c in text.chars() {
                                match c {
                                    '{' => escaped.push_str("{{"),
                                    '}' => escaped.push_str("}}"),
                                    c => push_escaped(&mut escaped, c),
                                }
                            }
                            f.write_str(&escaped)?;
                        }
                        Interpolation::Hole(expr) => write!(f, "{{{}}}", expr)?,
                    }
                }
                f.write_str("\"")
            }
            Expr::Member(target, name) => write!(f, "{}.{}", target, name),
            Expr::Call(target, args) => {
                write!(f, "{}(", target)?;
                write_args(f, args)?;
                f.write_str(")")
            }
            Expr::New {
                ty,
                args,
                initializer,
            } => {
                write!(f, "new {}(", ty)?;
                write_args(f, args)?;
                f.write_str(")")?;
                if !initializer.is_empty() {
                    f.write_str(" { ")?;
                    for (i, (name, value)) in initializer.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{} = {}", name, value)?;
                    }
                    f.write_str(" }")?;
                }
                Ok(())
            }
            Expr::Await(expr) => write!(f, "await {}", expr),
            Expr::BitwiseNot(expr) => write!(f, "~{}", expr),
            Expr::Lambda(params, body) => write!(f, "({}) => {}", params.join(", "), body),
        }
    }
}
