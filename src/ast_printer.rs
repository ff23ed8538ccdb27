use std::rc::Rc;

use crate::ast::{Expr, ExprId, ExprVisitor, FunctionDecl, LiteralValue, Stmt, StmtVisitor};
use crate::stack::ensure_sufficient_stack;
use crate::token::Token;

/// Converts a tree to a parenthesised prefix form, e.g. `(* (- 1.0) 2.0)`
/// for `-1 * 2` or `(var x = (+ 1.0 2.0))` for `var x = 1 + 2;`.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        expr.accept(&mut AstPrinter)
    }

    pub fn print_stmt(stmt: &Stmt) -> String {
        stmt.accept(&mut AstPrinter)
    }

    fn expr(&mut self, expr: &Expr) -> String {
        ensure_sufficient_stack(|| expr.accept(self))
    }

    fn stmt(&mut self, stmt: &Stmt) -> String {
        ensure_sufficient_stack(|| stmt.accept(self))
    }

    fn parenthesize<'e>(&mut self, head: &str, exprs: impl IntoIterator<Item = &'e Expr>) -> String {
        let mut s = format!("({}", head);
        for expr in exprs {
            s.push(' ');
            s.push_str(&self.expr(expr));
        }
        s.push(')');
        s
    }

    fn statements(&mut self, head: &str, stmts: &[Stmt]) -> String {
        let mut s = format!("({}", head);
        for stmt in stmts {
            s.push(' ');
            s.push_str(&self.stmt(stmt));
        }
        s.push(')');
        s
    }

    fn function(&mut self, head: &str, declaration: &FunctionDecl) -> String {
        let params: Vec<&str> = declaration
            .params
            .iter()
            .map(|param| param.lexeme.as_str())
            .collect();

        let head = format!("{} {}({})", head, declaration.name.lexeme, params.join(" "));

        self.statements(&head, &declaration.body)
    }
}

impl ExprVisitor<String> for AstPrinter {
    // ── literals ────────────────────────────────────────────────
    fn visit_literal(&mut self, value: &LiteralValue) -> String {
        match value {
            LiteralValue::True => "yerr".into(),

            LiteralValue::False => "nahh".into(),

            LiteralValue::Nil => "nada".into(),

            LiteralValue::Str(s) => s.clone(),

            LiteralValue::Number(n) => {
                if n.fract() == 0.0 {
                    // 3 → 3.0
                    format!("{:.1}", n)
                } else {
                    n.to_string()
                }
            }
        }
    }

    // ── grouping ────────────────────────────────────────────────
    fn visit_grouping(&mut self, inner: &Expr) -> String {
        self.parenthesize("group", [inner])
    }

    // ── operators ───────────────────────────────────────────────
    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> String {
        self.parenthesize(&operator.lexeme, [right])
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> String {
        self.parenthesize(&operator.lexeme, [left, right])
    }

    fn visit_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> String {
        self.parenthesize(&operator.lexeme, [left, right])
    }

    // ── names ───────────────────────────────────────────────────
    fn visit_variable(&mut self, _id: ExprId, name: &Token) -> String {
        name.lexeme.clone()
    }

    fn visit_assign(&mut self, _id: ExprId, name: &Token, value: &Expr) -> String {
        format!("(= {} {})", name.lexeme, self.expr(value))
    }

    fn visit_call(&mut self, callee: &Expr, _paren: &Token, arguments: &[Expr]) -> String {
        let callee = self.expr(callee);

        self.parenthesize(&format!("call {}", callee), arguments)
    }

    // ── objects ─────────────────────────────────────────────────
    fn visit_get(&mut self, object: &Expr, name: &Token) -> String {
        format!("(. {} {})", self.expr(object), name.lexeme)
    }

    fn visit_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> String {
        format!(
            "(= (. {} {}) {})",
            self.expr(object),
            name.lexeme,
            self.expr(value)
        )
    }

    fn visit_self(&mut self, _id: ExprId, _keyword: &Token) -> String {
        "self".into()
    }

    fn visit_super(&mut self, _id: ExprId, _keyword: &Token, method: &Token) -> String {
        format!("(super {})", method.lexeme)
    }

    fn visit_array(&mut self, _bracket: &Token, elements: &[Expr]) -> String {
        self.parenthesize("array", elements)
    }
}

impl StmtVisitor<String> for AstPrinter {
    fn visit_expression_stmt(&mut self, expr: &Expr) -> String {
        self.parenthesize(";", [expr])
    }

    fn visit_print_stmt(&mut self, expr: &Expr) -> String {
        self.parenthesize("print", [expr])
    }

    fn visit_var_stmt(&mut self, name: &Token, initializer: Option<&Expr>) -> String {
        match initializer {
            Some(expr) => format!("(var {} = {})", name.lexeme, self.expr(expr)),
            None => format!("(var {})", name.lexeme),
        }
    }

    fn visit_block_stmt(&mut self, statements: &[Stmt]) -> String {
        self.statements("block", statements)
    }

    fn visit_if_stmt(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> String {
        let condition = self.expr(condition);
        let then_branch = self.stmt(then_branch);

        match else_branch {
            Some(else_branch) => format!(
                "(if {} {} {})",
                condition,
                then_branch,
                self.stmt(else_branch)
            ),
            None => format!("(if {} {})", condition, then_branch),
        }
    }

    fn visit_while_stmt(&mut self, condition: &Expr, body: &Stmt) -> String {
        format!("(while {} {})", self.expr(condition), self.stmt(body))
    }

    fn visit_function_stmt(&mut self, declaration: &Rc<FunctionDecl>) -> String {
        self.function("fun", declaration)
    }

    fn visit_return_stmt(&mut self, _keyword: &Token, value: Option<&Expr>) -> String {
        self.parenthesize("return", value)
    }

    fn visit_class_stmt(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> String {
        let mut s = format!("(class {}", name.lexeme);

        if let Some(superclass) = superclass {
            s.push_str(" < ");
            s.push_str(&self.expr(superclass));
        }

        for method in methods {
            s.push(' ');
            s.push_str(&self.function("method", method));
        }

        s.push(')');
        s
    }
}
