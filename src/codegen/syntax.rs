//! Minimal C# syntax tree
//!
//! Covers exactly the shapes the generator emits. Building a tree and
//! printing it are separate steps so generated code can be inspected
//! without re-parsing text.

/// C# expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    /// Regular string literal; escaped when printed
    Str(String),
    /// Numeric literal, printed verbatim
    Number(String),
    Bool(bool),
    /// `$"..."` with text and `{expr}` holes
    Interpolated(Vec<Interpolation>),
    Member(Box<Expr>, String),
    Call(Box<Expr>, Vec<Expr>),
    /// `new Type(args) { Name = value }`
    New {
        ty: String,
        args: Vec<Expr>,
        initializer: Vec<(String, Expr)>,
    },
    Await(Box<Expr>),
    BitwiseNot(Box<Expr>),
    /// `(a, b) => body`
    Lambda(Vec<String>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Interpolation {
    Text(String),
    Hole(Expr),
}

/// C# statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `var name = value;`
    Var(String, Expr),
    /// `target = value;`
    Assign(Expr, Expr),
    /// `expr;`
    Expr(Expr),
    /// `using (var name = value) { body }`
    Using {
        name: String,
        value: Expr,
        body: Vec<Stmt>,
    },
    /// `// text`
    Comment(String),
    /// Empty line separating statement groups
    Blank,
}

// =============================================================================
// BUILDERS
// =============================================================================

pub fn ident(name: &str) -> Expr {
    Expr::Ident(name.to_string())
}

pub fn string(value: impl Into<String>) -> Expr {
    Expr::Str(value.into())
}

pub fn number(value: impl ToString) -> Expr {
    Expr::Number(value.to_string())
}

/// `new Type(args)`
pub fn new_object(ty: &str, args: Vec<Expr>) -> Expr {
    Expr::New {
        ty: ty.to_string(),
        args,
        initializer: Vec::new(),
    }
}

/// `Type.Member` or `variable.Member` chain from a dotted path
pub fn path(dotted: &str) -> Expr {
    let mut parts = dotted.split('.');
    let first = ident(parts.next().unwrap_or_default());
    parts.fold(first, |expr, part| expr.member(part))
}

/// `path(args)`
pub fn invoke(dotted: &str, args: Vec<Expr>) -> Expr {
    path(dotted).call(args)
}

pub fn interpolated(parts: Vec<Interpolation>) -> Expr {
    Expr::Interpolated(parts)
}

impl Expr {
    pub fn member(self, name: &str) -> Expr {
        Expr::Member(Box::new(self), name.to_string())
    }

    pub fn call(self, args: Vec<Expr>) -> Expr {
        Expr::Call(Box::new(self), args)
    }

    pub fn await_(self) -> Expr {
        Expr::Await(Box::new(self))
    }

    /// Add an object initializer entry to a `new` expression
    pub fn with_initializer(self, name: &str, value: Expr) -> Expr {
        match self {
            Expr::New {
                ty,
                args,
                mut initializer,
            } => {
                initializer.push((name.to_string(), value));
                Expr::New {
                    ty,
                    args,
                    initializer,
                }
            }
            other => other,
        }
    }
}

impl Stmt {
    pub fn var(name: &str, value: Expr) -> Stmt {
        Stmt::Var(name.to_string(), value)
    }

    pub fn assign(target: Expr, value: Expr) -> Stmt {
        Stmt::Assign(target, value)
    }

    pub fn comment(text: &str) -> Stmt {
        Stmt::Comment(text.to_string())
    }

    pub fn using(name: &str, value: Expr, body: Vec<Stmt>) -> Stmt {
        Stmt::Using {
            name: name.to_string(),
            value,
            body,
        }
    }
}
