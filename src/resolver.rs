//! Static resolver pass for the **Hi** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of `HashMap<String,bool>` tracking declared/defined).
//! 2. Report static errors (redeclaration, self-referencing initializer, invalid
//!    `return`, misplaced `self`/`super`, self-inheritance).
//! 3. Record, for *each* variable occurrence, whether it is a local (and at what
//!    distance) or a global, so the interpreter never falls back to a dynamic
//!    lookup that would see a later shadowing local.
//!
//! Errors do not stop the walk; every one found is returned together.

use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, ExprVisitor, FunctionDecl, LiteralValue, Stmt, StmtVisitor};
use crate::class::INITIALIZER;
use crate::error::HiError;
use crate::stack::ensure_sufficient_stack;
use crate::token::Token;

/// Binding distance of every resolved local, keyed by node.  A node with no
/// entry is a global.
pub type Locals = HashMap<ExprId, usize>;

/// What kind of function body are we in?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// What kind of class body are we in?  Used to validate `self` and `super`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

pub struct Resolver {
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    globals: HashMap<String, bool>,
    locals: Locals,
    errors: Vec<HiError>,
    current_function: FunctionType,
    current_class: ClassType,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        info!("Resolver instantiated");

        Resolver {
            scopes: Vec::new(),
            globals: HashMap::new(),
            locals: HashMap::new(),
            errors: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    /// A resolver that treats `names` as globals already bound by earlier
    /// runs of the same interpreter.
    pub fn with_globals<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut resolver = Self::new();

        resolver
            .globals
            .extend(names.into_iter().map(|name| (name, true)));

        resolver
    }

    /// Walk all top‑level statements.
    pub fn resolve(mut self, statements: &[Stmt]) -> Result<Locals, Vec<HiError>> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            self.resolve_stmt(stmt);
        }

        self.finish()
    }

    /// Resolve a lone expression (the `evaluate` entry point).
    pub fn resolve_expression(mut self, expr: &Expr) -> Result<Locals, Vec<HiError>> {
        self.resolve_expr(expr);

        self.finish()
    }

    fn finish(self) -> Result<Locals, Vec<HiError>> {
        if self.errors.is_empty() {
            info!("Resolved {} local binding(s)", self.locals.len());
            Ok(self.locals)
        } else {
            info!("Resolve pass found {} error(s)", self.errors.len());
            Err(self.errors)
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        ensure_sufficient_stack(|| stmt.accept(self))
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        ensure_sufficient_stack(|| expr.accept(self))
    }

    fn error(&mut self, token: &Token, message: &str) {
        self.errors.push(HiError::resolve(token.line, message));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function’s parameters + body.
    fn resolve_function(&mut self, declaration: &FunctionDecl, kind: FunctionType) {
        let enclosing = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }
        for stmt in &declaration.body {
            self.resolve_stmt(stmt);
        }
        self.end_scope();

        self.current_function = enclosing;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        match self.scopes.last_mut() {
            Some(scope) => {
                if scope.contains_key(&name.lexeme) {
                    self.error(name, "Already a variable with this name in this scope.");
                    return;
                }
                scope.insert(name.lexeme.clone(), false);
            }
            // Globals may be redefined, and a redefinition may read the
            // binding it replaces.
            None => {
                self.globals.entry(name.lexeme.clone()).or_insert(false);
            }
        }
    }

    fn define(&mut self, name: &Token) {
        let scope = match self.scopes.last_mut() {
            Some(scope) => scope,
            None => &mut self.globals,
        };

        scope.insert(name.lexeme.clone(), true);
    }

    /// Declare and define a synthetic name (`self`, `super`) in the innermost scope.
    fn bind_keyword(&mut self, keyword: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(keyword.to_string(), true);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this occurrence as a local at distance `d`, or leave it
    /// unrecorded (global) if no scope declares it.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.locals.insert(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Statement resolution
// ─────────────────────────────────────────────────────────────────────────────

impl StmtVisitor<()> for Resolver {
    fn visit_expression_stmt(&mut self, expr: &Expr) {
        self.resolve_expr(expr);
    }

    fn visit_print_stmt(&mut self, expr: &Expr) {
        self.resolve_expr(expr);
    }

    fn visit_var_stmt(&mut self, name: &Token, initializer: Option<&Expr>) {
        // declare → resolve initializer → define
        self.declare(name);
        if let Some(expr) = initializer {
            self.resolve_expr(expr);
        }
        self.define(name);
    }

    fn visit_block_stmt(&mut self, statements: &[Stmt]) {
        self.begin_scope();
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
        self.end_scope();
    }

    fn visit_if_stmt(&mut self, condition: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) {
        self.resolve_expr(condition);
        self.resolve_stmt(then_branch);
        if let Some(else_branch) = else_branch {
            self.resolve_stmt(else_branch);
        }
    }

    fn visit_while_stmt(&mut self, condition: &Expr, body: &Stmt) {
        self.resolve_expr(condition);
        self.resolve_stmt(body);
    }

    fn visit_function_stmt(&mut self, declaration: &Rc<FunctionDecl>) {
        // name is visible *inside* its own body, for recursion
        self.declare(&declaration.name);
        self.define(&declaration.name);
        self.resolve_function(declaration, FunctionType::Function);
    }

    fn visit_return_stmt(&mut self, keyword: &Token, value: Option<&Expr>) {
        if self.current_function == FunctionType::None {
            self.error(keyword, "Can't return from top-level code.");
        }

        if let Some(expr) = value {
            if self.current_function == FunctionType::Initializer {
                self.error(keyword, "Can't return a value from an initializer.");
            }
            self.resolve_expr(expr);
        }
    }

    fn visit_class_stmt(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) {
        let enclosing = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name);
        self.define(name);

        if let Some(superclass) = superclass {
            if let Expr::Variable {
                name: superclass_name,
                ..
            } = superclass
            {
                if superclass_name.lexeme == name.lexeme {
                    self.error(superclass_name, "A class can't inherit from itself.");
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            self.begin_scope();
            self.bind_keyword("super");
        }

        self.begin_scope();
        self.bind_keyword("self");

        for method in methods {
            let kind = if method.name.lexeme == INITIALIZER {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Expression resolution
// ─────────────────────────────────────────────────────────────────────────────

impl ExprVisitor<()> for Resolver {
    fn visit_literal(&mut self, _value: &LiteralValue) {}

    fn visit_grouping(&mut self, inner: &Expr) {
        self.resolve_expr(inner);
    }

    fn visit_unary(&mut self, _operator: &Token, right: &Expr) {
        self.resolve_expr(right);
    }

    fn visit_binary(&mut self, left: &Expr, _operator: &Token, right: &Expr) {
        self.resolve_expr(left);
        self.resolve_expr(right);
    }

    fn visit_logical(&mut self, left: &Expr, _operator: &Token, right: &Expr) {
        self.resolve_expr(left);
        self.resolve_expr(right);
    }

    fn visit_variable(&mut self, id: ExprId, name: &Token) {
        // Cannot read in own initializer
        let innermost = self.scopes.last().unwrap_or(&self.globals);

        if innermost.get(&name.lexeme) == Some(&false) {
            self.error(name, "Can't read local variable in its own initializer.");
        }

        self.resolve_local(id, name);
    }

    fn visit_assign(&mut self, id: ExprId, name: &Token, value: &Expr) {
        // First resolve RHS, then bind LHS
        self.resolve_expr(value);
        self.resolve_local(id, name);
    }

    fn visit_call(&mut self, callee: &Expr, _paren: &Token, arguments: &[Expr]) {
        self.resolve_expr(callee);
        for argument in arguments {
            self.resolve_expr(argument);
        }
    }

    fn visit_get(&mut self, object: &Expr, _name: &Token) {
        self.resolve_expr(object);
    }

    fn visit_set(&mut self, object: &Expr, _name: &Token, value: &Expr) {
        self.resolve_expr(object);
        self.resolve_expr(value);
    }

    fn visit_self(&mut self, id: ExprId, keyword: &Token) {
        if self.current_class == ClassType::None {
            self.error(keyword, "Can't use 'self' outside of a class.");
            return;
        }

        self.resolve_local(id, keyword);
    }

    fn visit_super(&mut self, id: ExprId, keyword: &Token, _method: &Token) {
        match self.current_class {
            ClassType::None => self.error(keyword, "Can't use 'super' outside of a class."),
            ClassType::Class => {
                self.error(keyword, "Can't use 'super' in a class with no superclass.")
            }
            ClassType::Subclass => self.resolve_local(id, keyword),
        }
    }

    fn visit_array(&mut self, _bracket: &Token, elements: &[Expr]) {
        for element in elements {
            self.resolve_expr(element);
        }
    }
}
