//! Abstract syntax tree for Hi programs, plus the two visitor traits that
//! every consumer of the tree (resolver, interpreter, printer) implements.
//!
//! Nodes are immutable once the parser has built them.  Nodes whose meaning
//! depends on *where* a name is bound (variables, assignments, `self`,
//! `super`) carry an [`ExprId`] so the resolver can key its distance table by
//! node identity rather than by structure: two textually identical `x`
//! references can live in different scopes.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

/// Stable identity of a resolvable expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

impl ExprId {
    /// Allocate an id never handed out before in this process.  Ids stay
    /// unique across REPL lines, which share one interpreter and therefore
    /// one distance table.
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// `yerr`
    True,

    /// `nahh`
    False,

    /// `nada`
    Nil,
}

/// Every kind of *expression* in Hi.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant: number, string, `yerr`, `nahh`, or `nada`.
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Prefix unary operator expression, `!ready` or `-42`.
    Unary { operator: Token, right: Box<Expr> },

    /// Infix arithmetic, comparison or equality operator.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Variable access.
    Variable { id: ExprId, name: Token },

    /// `identifier "=" expression`
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Function‑, method‑ or constructor‑call.
    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// `object.name`
    Get { object: Box<Expr>, name: Token },

    /// `object.name = value`
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The `self` keyword inside a method.
    SelfRef { id: ExprId, keyword: Token },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },

    /// `[a, b, c]`
    ArrayLiteral {
        /// The opening `[`, for error reporting.
        bracket: Token,
        elements: Vec<Expr>,
    },
}

/// A named function or method: parameter list plus body.  Shared by every
/// closure value created from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<Token>,

    pub body: Vec<Stmt>,
}

/// Every kind of *statement*.  A program is a sequence of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    Print(Expr),

    /// `"var" IDENT ("=" initializer)? ";"`
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While { condition: Expr, body: Box<Stmt> },

    Function(Rc<FunctionDecl>),

    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Absent ⇒ `nada` is returned.
        value: Option<Expr>,
    },

    Class {
        name: Token,

        /// Always an [`Expr::Variable`] when present.
        superclass: Option<Expr>,

        methods: Vec<Rc<FunctionDecl>>,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Visitor dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Handler set for expressions.  [`Expr::accept`] calls exactly one method,
/// chosen by the node's variant.
pub trait ExprVisitor<R> {
    fn visit_literal(&mut self, value: &LiteralValue) -> R;

    fn visit_grouping(&mut self, inner: &Expr) -> R;

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> R;

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> R;

    fn visit_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> R;

    fn visit_variable(&mut self, id: ExprId, name: &Token) -> R;

    fn visit_assign(&mut self, id: ExprId, name: &Token, value: &Expr) -> R;

    fn visit_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> R;

    fn visit_get(&mut self, object: &Expr, name: &Token) -> R;

    fn visit_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> R;

    fn visit_self(&mut self, id: ExprId, keyword: &Token) -> R;

    fn visit_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> R;

    fn visit_array(&mut self, bracket: &Token, elements: &[Expr]) -> R;
}

/// Handler set for statements.
pub trait StmtVisitor<R> {
    fn visit_expression_stmt(&mut self, expr: &Expr) -> R;

    fn visit_print_stmt(&mut self, expr: &Expr) -> R;

    fn visit_var_stmt(&mut self, name: &Token, initializer: Option<&Expr>) -> R;

    fn visit_block_stmt(&mut self, statements: &[Stmt]) -> R;

    fn visit_if_stmt(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> R;

    fn visit_while_stmt(&mut self, condition: &Expr, body: &Stmt) -> R;

    fn visit_function_stmt(&mut self, declaration: &Rc<FunctionDecl>) -> R;

    fn visit_return_stmt(&mut self, keyword: &Token, value: Option<&Expr>) -> R;

    fn visit_class_stmt(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> R;
}

impl Expr {
    pub fn accept<R, V: ExprVisitor<R> + ?Sized>(&self, visitor: &mut V) -> R {
        match self {
            Expr::Literal(value) => visitor.visit_literal(value),
            Expr::Grouping(inner) => visitor.visit_grouping(inner),
            Expr::Unary { operator, right } => visitor.visit_unary(operator, right),
            Expr::Binary {
                left,
                operator,
                right,
            } => visitor.visit_binary(left, operator, right),
            Expr::Logical {
                left,
                operator,
                right,
            } => visitor.visit_logical(left, operator, right),
            Expr::Variable { id, name } => visitor.visit_variable(*id, name),
            Expr::Assign { id, name, value } => visitor.visit_assign(*id, name, value),
            Expr::Call {
                callee,
                paren,
                arguments,
            } => visitor.visit_call(callee, paren, arguments),
            Expr::Get { object, name } => visitor.visit_get(object, name),
            Expr::Set {
                object,
                name,
                value,
            } => visitor.visit_set(object, name, value),
            Expr::SelfRef { id, keyword } => visitor.visit_self(*id, keyword),
            Expr::Super {
                id,
                keyword,
                method,
            } => visitor.visit_super(*id, keyword, method),
            Expr::ArrayLiteral { bracket, elements } => visitor.visit_array(bracket, elements),
        }
    }
}

impl Stmt {
    pub fn accept<R, V: StmtVisitor<R> + ?Sized>(&self, visitor: &mut V) -> R {
        match self {
            Stmt::Expression(expr) => visitor.visit_expression_stmt(expr),
            Stmt::Print(expr) => visitor.visit_print_stmt(expr),
            Stmt::Var { name, initializer } => visitor.visit_var_stmt(name, initializer.as_ref()),
            Stmt::Block(statements) => visitor.visit_block_stmt(statements),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => visitor.visit_if_stmt(condition, then_branch, else_branch.as_deref()),
            Stmt::While { condition, body } => visitor.visit_while_stmt(condition, body),
            Stmt::Function(declaration) => visitor.visit_function_stmt(declaration),
            Stmt::Return { keyword, value } => visitor.visit_return_stmt(keyword, value.as_ref()),
            Stmt::Class {
                name,
                superclass,
                methods,
            } => visitor.visit_class_stmt(name, superclass.as_ref(), methods),
        }
    }
}
