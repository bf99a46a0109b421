//! Abstract syntax tree with per-function symbol tables.
//!
//! Identifier nodes carry a copy of their resolved [`Symbol`] rather than
//! a reference into the owning function, so the code generator can borrow
//! the whole tree freely without cyclic ownership. Slot indices are dense
//! and zero-based; parameters occupy the first slots.

use core::fmt;
use std::collections::HashMap;

use crate::types::ValueType;

/// A function-local variable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub index: usize,
    pub ty: ValueType,
    pub constant: bool,
}

/// A declared function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: ValueType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Neg,
    Not,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrefixOp::Neg => "-",
            PrefixOp::Not => "!",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,
}

impl InfixOp {
    /// Comparisons always produce an `int` (0 or 1).
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            InfixOp::Lt | InfixOp::Gt | InfixOp::LtEq | InfixOp::GtEq | InfixOp::Eq | InfixOp::NotEq
        )
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::LtEq => "<=",
            InfixOp::GtEq => ">=",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl AssignOp {
    /// The arithmetic counterpart of a compound assignment.
    pub fn infix_op(self) -> Option<InfixOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(InfixOp::Add),
            AssignOp::SubAssign => Some(InfixOp::Sub),
            AssignOp::MulAssign => Some(InfixOp::Mul),
            AssignOp::DivAssign => Some(InfixOp::Div),
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    IntegerLiteral(i64),
    FloatLiteral(f64),
    CharLiteral(u8),
    Identifier {
        name: String,
        symbol: Symbol,
    },
    Prefix {
        op: PrefixOp,
        right: Box<Expression>,
    },
    Infix {
        left: Box<Expression>,
        op: InfixOp,
        right: Box<Expression>,
    },
    Call {
        name: String,
        args: Vec<Expression>,
        /// Import index for external callees, resolved at parse time.
        /// Local callees stay `None` and are resolved at code generation.
        external_index: Option<usize>,
        return_type: ValueType,
    },
}

impl Expression {
    /// Static type of the expression. Comparisons and `!` are `int`;
    /// arithmetic takes the left operand's type.
    pub fn value_type(&self) -> ValueType {
        match self {
            Expression::IntegerLiteral(_) => ValueType::Int,
            Expression::FloatLiteral(_) => ValueType::Float,
            Expression::CharLiteral(_) => ValueType::Char,
            Expression::Identifier { symbol, .. } => symbol.ty,
            Expression::Prefix { op: PrefixOp::Not, .. } => ValueType::Int,
            Expression::Prefix { op: PrefixOp::Neg, right } => right.value_type(),
            Expression::Infix { op, left, .. } => {
                if op.is_comparison() {
                    ValueType::Int
                } else {
                    left.value_type()
                }
            }
            Expression::Call { return_type, .. } => *return_type,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::IntegerLiteral(value) => write!(f, "{value}"),
            Expression::FloatLiteral(value) => write!(f, "{value}"),
            Expression::CharLiteral(value) => write!(f, "'{}'", *value as char),
            Expression::Identifier { name, .. } => f.write_str(name),
            Expression::Prefix { op, right } => write!(f, "({op}{right})"),
            Expression::Infix { left, op, right } => write!(f, "({left} {op} {right})"),
            Expression::Call { name, args, .. } => {
                let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{name}({})", rendered.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    VariableDefine {
        ty: ValueType,
        name: String,
        symbol: Symbol,
        value: Option<Expression>,
    },
    VariableUpdate {
        name: String,
        symbol: Symbol,
        op: AssignOp,
        value: Expression,
    },
    Return {
        value: Expression,
    },
    Expression {
        expression: Expression,
    },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::VariableDefine {
                ty,
                name,
                symbol,
                value,
            } => {
                let qualifier = if symbol.constant { "const " } else { "" };
                match value {
                    Some(value) => write!(f, "{qualifier}{ty} {name} = {value};"),
                    None => write!(f, "{qualifier}{ty} {name};"),
                }
            }
            Statement::VariableUpdate { name, op, value, .. } => {
                write!(f, "{name} {op} {value};")
            }
            Statement::Return { value } => write!(f, "return {value};"),
            Statement::Expression { expression } => write!(f, "{expression};"),
        }
    }
}

/// A declared function: local, external or the synthetic global scope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Function {
    pub name: String,
    pub return_type: ValueType,
    pub params: Vec<Param>,
    pub statements: Vec<Statement>,
    pub symbols: Vec<Symbol>,
    pub symbol_index: HashMap<String, usize>,
    /// False for external functions and body-less forward declarations.
    pub has_body: bool,
}

impl Function {
    pub fn new(name: impl Into<String>, return_type: ValueType) -> Self {
        Function {
            name: name.into(),
            return_type,
            ..Function::default()
        }
    }

    /// Allocates the next dense slot for `name`. A redeclaration shadows
    /// the earlier slot in the name index but keeps it in the slot range.
    pub fn define_symbol(&mut self, name: &str, ty: ValueType, constant: bool) -> Symbol {
        let symbol = Symbol {
            index: self.symbols.len(),
            ty,
            constant,
        };
        self.symbols.push(symbol);
        self.symbol_index.insert(name.to_string(), symbol.index);
        symbol
    }

    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.symbol_index.get(name).map(|&slot| self.symbols[slot])
    }

    /// Declares a parameter, claiming the next slot.
    pub fn define_param(&mut self, name: &str, ty: ValueType) {
        self.define_symbol(name, ty, false);
        self.params.push(Param {
            name: name.to_string(),
            ty,
        });
    }
}

/// Name of the synthetic function that owns global statements.
pub const GLOBAL_SCOPE: &str = "_global";

/// A whole translation unit. External functions precede local functions
/// in the WASM function index space. The `global` function collects
/// top-level statements for symbol resolution and is never emitted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub functions: Vec<Function>,
    pub external_functions: Vec<Function>,
    pub global: Function,
}

impl Program {
    pub fn new() -> Self {
        Program {
            functions: Vec::new(),
            external_functions: Vec::new(),
            global: Function::new(GLOBAL_SCOPE, ValueType::Void),
        }
    }

    pub fn find_function(&self, name: &str) -> Option<(usize, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .find(|(_, f)| f.name == name)
    }

    pub fn find_external(&self, name: &str) -> Option<(usize, &Function)> {
        self.external_functions
            .iter()
            .enumerate()
            .find(|(_, f)| f.name == name)
    }

    pub fn global_statements(&self) -> &[Statement] {
        &self.global.statements
    }
}
