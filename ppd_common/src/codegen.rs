//! C++ code emission.
//!
//! Platforms do not write text directly. They push [`Statement`]s built
//! from [`Expression`]s into a [`CodeGen`] buffer; the buffer renders the
//! complete `setup()`/`loop()` program once the whole build has succeeded.

use std::fmt;

use crate::id::ComponentId;

/// Global application object every component registers with.
pub const APP: &str = "App";

/// A C++ expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Reference to a declared variable.
    Id(ComponentId),
    /// `true` / `false`.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal, rendered with an `f` suffix.
    Float(f64),
    /// String literal, escaped on render.
    Str(String),
    /// Verbatim text (enum constants, macros).
    Raw(String),
    /// `target->method(args)`.
    MethodCall {
        /// Pointer the method is called on.
        target: Box<Expression>,
        /// Method name.
        method: String,
        /// Arguments.
        args: Vec<Expression>,
    },
    /// `function(args)`, e.g. `App.register_component(x)`.
    Call {
        /// Fully qualified callee.
        function: String,
        /// Arguments.
        args: Vec<Expression>,
    },
}

impl Expression {
    /// Reference to `id`.
    pub fn id(id: &ComponentId) -> Self {
        Self::Id(id.clone())
    }

    /// Verbatim text.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    /// Free function call.
    pub fn call(function: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::Call {
            function: function.into(),
            args,
        }
    }

    /// Method call on this expression.
    pub fn method(&self, method: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::MethodCall {
            target: Box::new(self.clone()),
            method: method.into(),
            args,
        }
    }
}

impl From<bool> for Expression {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Expression {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<&ComponentId> for Expression {
    fn from(value: &ComponentId) -> Self {
        Self::Id(value.clone())
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expression]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{arg}")?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{}", cpp_float(*value)),
            Self::Str(value) => write!(f, "{}", cpp_string_escape(value)),
            Self::Raw(text) => write!(f, "{text}"),
            Self::MethodCall {
                target,
                method,
                args,
            } => {
                write!(f, "{target}->{method}(")?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Self::Call { function, args } => {
                write!(f, "{function}(")?;
                write_args(f, args)?;
                write!(f, ")")
            }
        }
    }
}

/// A C++ statement inside `setup()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `auto *id = new class(args);`
    Declare {
        /// Variable name.
        id: ComponentId,
        /// Fully qualified class.
        class: String,
        /// Constructor arguments.
        args: Vec<Expression>,
    },
    /// `expr;`
    Expr(Expression),
    /// `// text`
    Comment(String),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declare { id, class, args } => {
                write!(f, "auto *{id} = new {class}(")?;
                write_args(f, args)?;
                write!(f, ");")
            }
            Self::Expr(expr) => write!(f, "{expr};"),
            Self::Comment(text) => write!(f, "// {text}"),
        }
    }
}

/// Escape `value` as a C++ string literal, quotes included.
///
/// Printable ASCII is kept, `"` and `\` are backslash-escaped and every
/// other byte of the UTF-8 encoding becomes a three-digit octal escape.
pub fn cpp_string_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for byte in value.bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\{byte:03o}")),
        }
    }
    out.push('"');
    out
}

fn cpp_float(value: f64) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INFINITY" } else { "-INFINITY" }.to_string();
    }
    let mut text = format!("{value}");
    if !text.contains('.') && !text.contains('e') {
        text.push_str(".0");
    }
    text.push('f');
    text
}

/// Buffer of includes and `setup()` statements for one build.
#[derive(Debug, Default)]
pub struct CodeGen {
    includes: Vec<String>,
    statements: Vec<Statement>,
}

impl CodeGen {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an `#include "header"` line (deduplicated, insertion order).
    pub fn add_include(&mut self, header: &str) {
        if !self.includes.iter().any(|h| h == header) {
            self.includes.push(header.to_string());
        }
    }

    /// Declare a heap-allocated object and return an expression for it.
    pub fn new_pvariable(&mut self, id: &ComponentId, class: &str) -> Expression {
        self.statements.push(Statement::Declare {
            id: id.clone(),
            class: class.to_string(),
            args: Vec::new(),
        });
        Expression::id(id)
    }

    /// Append an expression statement.
    pub fn add(&mut self, expr: Expression) {
        self.statements.push(Statement::Expr(expr));
    }

    /// Append a comment line.
    pub fn add_comment(&mut self, text: impl Into<String>) {
        self.statements.push(Statement::Comment(text.into()));
    }

    /// Statements emitted so far.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Includes collected so far.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Render the complete program for node `name`.
    pub fn render(&self, name: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "// Auto generated code by ppd_codegen {}\n",
            env!("CARGO_PKG_VERSION")
        ));
        out.push_str("#include \"esphome/core/application.h\"\n");
        for header in &self.includes {
            out.push_str(&format!("#include \"{header}\"\n"));
        }
        out.push_str("using namespace esphome;\n\n");

        out.push_str("void setup() {\n");
        out.push_str(&format!(
            "  {APP}.pre_setup({}, __DATE__ \", \" __TIME__, false);\n",
            cpp_string_escape(name)
        ));
        for statement in &self.statements {
            out.push_str(&format!("  {statement}\n"));
        }
        out.push_str(&format!("  {APP}.setup();\n}}\n\n"));
        out.push_str(&format!("void loop() {{\n  {APP}.loop();\n}}\n"));
        out
    }
}
