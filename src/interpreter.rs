use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use log::{debug, info};

use crate::array::HiArray;
use crate::ast::{Expr, ExprId, ExprVisitor, FunctionDecl, LiteralValue, Stmt, StmtVisitor};
use crate::callable::{Callable, HiFunction};
use crate::class::{HiClass, HiInstance, INITIALIZER};
use crate::environment::{EnvRef, Environment};
use crate::error::RuntimeError;
use crate::natives;
use crate::resolver::Locals;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How a statement finished: fell off the end, or hit `return`.  A `Return`
/// travels up through enclosing blocks and loops until the nearest call.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Calls nested deeper than this raise a stack-overflow error.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Convenient alias for interpreter results.
pub type IResult<T> = Result<T, RuntimeError>;

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    locals: Locals,
    output: Box<dyn Write>,
    depth: usize,
    max_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates a new Interpreter printing to stdout, with the native globals
    /// (`clock`, `sin`, `Array`, `PI`, ...) already defined.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Same as [`Interpreter::new`], but `print` writes to `output`.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let mut globals = Environment::new();

        natives::install(&mut globals);

        let globals: EnvRef = Rc::new(RefCell::new(globals));

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
            depth: 0,
            max_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_max_call_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    /// Merge the binding distances of a freshly resolved program.
    pub fn resolve(&mut self, locals: Locals) {
        debug!("Merging {} resolved bindings", locals.len());

        self.locals.extend(locals);
    }

    /// Interprets a list of statements (a "program").
    ///
    /// On a runtime error the current scope is reset to the globals, so a
    /// REPL can keep going with everything defined so far.
    pub fn interpret(&mut self, statements: &[Stmt]) -> IResult<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            if let Err(error) = self.execute(stmt) {
                info!("Runtime error: {}", error);

                self.environment = Rc::clone(&self.globals);
                self.depth = 0;

                return Err(error);
            }
        }

        self.output.flush()?;

        info!("Interpretation completed successfully");

        Ok(())
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> IResult<Flow> {
        ensure_sufficient_stack(|| stmt.accept(self))
    }

    /// Run `statements` with `environment` as the current scope, restoring the
    /// previous scope afterwards whether or not they succeed.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> IResult<Flow> {
        let previous: EnvRef = mem::replace(&mut self.environment, environment);

        let result = self.execute_all(statements);

        self.environment = previous;

        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> IResult<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        ensure_sufficient_stack(|| expr.accept(self))
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> IResult<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn invoke(&mut self, callee: &Value, paren: &Token, arguments: Vec<Value>) -> IResult<Value> {
        let callable: &dyn Callable = callee
            .as_callable()
            .ok_or(RuntimeError::NotCallable { line: paren.line })?;

        if arguments.len() != callable.arity() {
            return Err(RuntimeError::ArityMismatch {
                expected: callable.arity(),
                actual: arguments.len(),
                line: paren.line,
            });
        }

        if self.depth >= self.max_depth {
            return Err(RuntimeError::StackOverflow { line: paren.line });
        }

        self.depth += 1;

        let result = ensure_sufficient_stack(|| callable.call(self, arguments, paren));

        self.depth -= 1;

        result
    }

    fn write_line(&mut self, value: &Value) -> IResult<()> {
        writeln!(self.output, "{}", value)?;
        Ok(())
    }
}

impl ExprVisitor<IResult<Value>> for Interpreter {
    fn visit_literal(&mut self, value: &LiteralValue) -> IResult<Value> {
        Ok(Value::from(value))
    }

    fn visit_grouping(&mut self, inner: &Expr) -> IResult<Value> {
        self.evaluate(inner)
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> IResult<Value> {
        debug!("Evaluating unary operation: {}", operator.lexeme);

        let right: Value = self.evaluate(right)?;

        match (&operator.token_type, right) {
            (TokenType::MINUS, Value::Number(n)) => Ok(Value::Number(-n)),
            (TokenType::MINUS, _) => Err(RuntimeError::type_error(
                operator.line,
                "Operand must be a number.",
            )),
            (_, value) => Ok(Value::Bool(!value.is_truthy())),
        }
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> IResult<Value> {
        debug!("Evaluating binary operation: {}", operator.lexeme);

        let left: Value = self.evaluate(left)?;
        let right: Value = self.evaluate(right)?;

        let numbers = || match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
            _ => Err(RuntimeError::type_error(
                operator.line,
                "Operands must be numbers.",
            )),
        };

        let value: Value = match operator.token_type {
            TokenType::PLUS => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
                (Value::String(a), Value::String(b)) => {
                    Value::String(Rc::from(format!("{}{}", a, b)))
                }
                _ => {
                    return Err(RuntimeError::type_error(
                        operator.line,
                        "Operands must be two numbers or two strings.",
                    ))
                }
            },

            TokenType::MINUS => numbers().map(|(a, b)| Value::Number(a - b))?,

            TokenType::STAR => numbers().map(|(a, b)| Value::Number(a * b))?,

            TokenType::SLASH => numbers().map(|(a, b)| Value::Number(a / b))?,

            TokenType::GREATER => numbers().map(|(a, b)| Value::Bool(a > b))?,

            TokenType::GREATER_EQUAL => numbers().map(|(a, b)| Value::Bool(a >= b))?,

            TokenType::LESS => numbers().map(|(a, b)| Value::Bool(a < b))?,

            TokenType::LESS_EQUAL => numbers().map(|(a, b)| Value::Bool(a <= b))?,

            TokenType::EQUAL_EQUAL => Value::Bool(left.is_equal(&right)),

            TokenType::BANG_EQUAL => Value::Bool(!left.is_equal(&right)),

            _ => {
                return Err(RuntimeError::type_error(
                    operator.line,
                    format!("Invalid binary operator '{}'.", operator.lexeme),
                ))
            }
        };

        Ok(value)
    }

    fn visit_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> IResult<Value> {
        let left: Value = self.evaluate(left)?;

        let short_circuit: bool = match operator.token_type {
            TokenType::OR => left.is_truthy(),
            _ => !left.is_truthy(),
        };

        if short_circuit {
            return Ok(left);
        }

        self.evaluate(right)
    }

    fn visit_variable(&mut self, id: ExprId, name: &Token) -> IResult<Value> {
        debug!("Looking up variable '{}'", name.lexeme);

        self.look_up_variable(id, name)
    }

    fn visit_assign(&mut self, id: ExprId, name: &Token, value: &Expr) -> IResult<Value> {
        let value: Value = self.evaluate(value)?;

        debug!("Assigning {} to '{}'", value, name.lexeme);

        match self.locals.get(&id) {
            Some(&distance) => {
                Environment::assign_at(&self.environment, distance, name, value.clone())?
            }
            None => self.globals.borrow_mut().assign(name, value.clone())?,
        }

        Ok(value)
    }

    fn visit_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> IResult<Value> {
        debug!("Evaluating function call");

        let callee: Value = self.evaluate(callee)?;

        let mut values: Vec<Value> = Vec::with_capacity(arguments.len());

        for argument in arguments {
            values.push(self.evaluate(argument)?);
        }

        self.invoke(&callee, paren, values)
    }

    fn visit_get(&mut self, object: &Expr, name: &Token) -> IResult<Value> {
        match self.evaluate(object)? {
            Value::Instance(instance) => HiInstance::get(&instance, name),
            Value::Array(array) => HiArray::get_property(&array, name),
            _ => Err(RuntimeError::type_error(
                name.line,
                "Only instances have properties.",
            )),
        }
    }

    fn visit_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> IResult<Value> {
        let Value::Instance(instance) = self.evaluate(object)? else {
            return Err(RuntimeError::type_error(name.line, "Only instances have fields."));
        };

        let value: Value = self.evaluate(value)?;

        instance.borrow_mut().set(name, value.clone());

        Ok(value)
    }

    fn visit_self(&mut self, id: ExprId, keyword: &Token) -> IResult<Value> {
        self.look_up_variable(id, keyword)
    }

    fn visit_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> IResult<Value> {
        let distance: usize =
            self.locals
                .get(&id)
                .copied()
                .ok_or_else(|| RuntimeError::UndefinedVariable {
                    name: keyword.lexeme.clone(),
                    line: keyword.line,
                })?;

        let Value::Class(superclass) = Environment::get_at(&self.environment, distance, keyword)?
        else {
            return Err(RuntimeError::type_error(keyword.line, "Superclass must be a class."));
        };

        // `self` lives in the scope just inside the one binding `super`.
        let self_token = Token::new(TokenType::SELF, "self", keyword.line);

        let Value::Instance(instance) =
            Environment::get_at(&self.environment, distance - 1, &self_token)?
        else {
            return Err(RuntimeError::type_error(
                keyword.line,
                "Can't use 'super' outside of a method.",
            ));
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(instance)))),
            None => Err(RuntimeError::UndefinedProperty {
                name: method.lexeme.clone(),
                line: method.line,
            }),
        }
    }

    fn visit_array(&mut self, _bracket: &Token, elements: &[Expr]) -> IResult<Value> {
        let mut values: Vec<Value> = Vec::with_capacity(elements.len());

        for element in elements {
            values.push(self.evaluate(element)?);
        }

        Ok(Value::Array(Rc::new(RefCell::new(HiArray::from_elements(
            values,
        )))))
    }
}

impl StmtVisitor<IResult<Flow>> for Interpreter {
    fn visit_expression_stmt(&mut self, expr: &Expr) -> IResult<Flow> {
        self.evaluate(expr)?;

        Ok(Flow::Normal)
    }

    fn visit_print_stmt(&mut self, expr: &Expr) -> IResult<Flow> {
        let value: Value = self.evaluate(expr)?;

        self.write_line(&value)?;

        debug!("Printed value: {}", value);

        Ok(Flow::Normal)
    }

    fn visit_var_stmt(&mut self, name: &Token, initializer: Option<&Expr>) -> IResult<Flow> {
        let value: Value = match initializer {
            Some(expr) => self.evaluate(expr)?,
            None => Value::Nil,
        };

        debug!("Variable '{}' defined with value: {}", name.lexeme, value);

        self.environment.borrow_mut().define(&name.lexeme, value);

        Ok(Flow::Normal)
    }

    fn visit_block_stmt(&mut self, statements: &[Stmt]) -> IResult<Flow> {
        let environment: EnvRef = Environment::child_of(&self.environment);

        self.execute_block(statements, environment)
    }

    fn visit_if_stmt(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> IResult<Flow> {
        if self.evaluate(condition)?.is_truthy() {
            self.execute(then_branch)
        } else if let Some(else_branch) = else_branch {
            self.execute(else_branch)
        } else {
            Ok(Flow::Normal)
        }
    }

    fn visit_while_stmt(&mut self, condition: &Expr, body: &Stmt) -> IResult<Flow> {
        while self.evaluate(condition)?.is_truthy() {
            if let Flow::Return(value) = self.execute(body)? {
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    fn visit_function_stmt(&mut self, declaration: &Rc<FunctionDecl>) -> IResult<Flow> {
        let function = HiFunction::new(
            Rc::clone(declaration),
            Rc::clone(&self.environment),
            false,
        );

        info!(
            "Function '{}' defined with {} parameters",
            declaration.name.lexeme,
            declaration.params.len()
        );

        self.environment
            .borrow_mut()
            .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

        Ok(Flow::Normal)
    }

    fn visit_return_stmt(&mut self, _keyword: &Token, value: Option<&Expr>) -> IResult<Flow> {
        let value: Value = match value {
            Some(expr) => self.evaluate(expr)?,
            None => Value::Nil,
        };

        Ok(Flow::Return(value))
    }

    fn visit_class_stmt(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> IResult<Flow> {
        let superclass: Option<Rc<HiClass>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    let line: usize = match expr {
                        Expr::Variable { name, .. } => name.line,
                        _ => name.line,
                    };

                    return Err(RuntimeError::type_error(line, "Superclass must be a class."));
                }
            },
            None => None,
        };

        self.environment.borrow_mut().define(&name.lexeme, Value::Nil);

        let enclosing: EnvRef = Rc::clone(&self.environment);

        if let Some(superclass) = &superclass {
            self.environment = Environment::child_of(&enclosing);

            self.environment
                .borrow_mut()
                .define("super", Value::Class(Rc::clone(superclass)));
        }

        let methods: HashMap<String, Rc<HiFunction>> = methods
            .iter()
            .map(|method| {
                let function = HiFunction::new(
                    Rc::clone(method),
                    Rc::clone(&self.environment),
                    method.name.lexeme == INITIALIZER,
                );

                (method.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let class = HiClass::new(&name.lexeme, superclass, methods);

        self.environment = enclosing;

        info!("Class '{}' defined", name.lexeme);

        self.environment
            .borrow_mut()
            .assign(name, Value::Class(Rc::new(class)))?;

        Ok(Flow::Normal)
    }
}
