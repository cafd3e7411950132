use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info, trace};

use crate::ast::{Expr, ExprId, FunctionStmt, LiteralValue, Stmt};
use crate::callable::{Callable, Class, Function, Instance};
use crate::environment::{assign_at, get_at, EnvRef, Environment};
use crate::error::{Result, ZeError};
use crate::natives;
use crate::token::{Token, TokenType};
use crate::value::{format_number, Value};

/// How a statement finished. Runtime errors travel on the `Err` side of
/// [`Result`]; these are the non‑local jumps that loops and calls consume.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

/// Tree‑walking evaluator.
pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    /// Resolver side table: lexical distance per name‑bearing node. A missing
    /// entry means the name is global.
    locals: HashMap<ExprId, usize>,
    /// Entries of `locals` from outside any function body. Top-level code
    /// runs once, so these are dropped when the run finishes.
    transient: Vec<ExprId>,
    out: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter printing to stdout, with the native functions
    /// already defined.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Same as [`Interpreter::new`] but `print` writes to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let mut globals = Environment::new();
        natives::register(&mut globals);
        let globals: EnvRef = globals.into_ref();

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            transient: Vec::new(),
            out,
        }
    }

    /// Record the lexical distance of a resolved name.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        trace!("Noting local {:?} at depth {}", id, depth);
        self.locals.insert(id, depth);
    }

    /// Like [`Interpreter::resolve`], for a node outside every function body.
    pub fn resolve_transient(&mut self, id: ExprId, depth: usize) {
        self.resolve(id, depth);
        self.transient.push(id);
    }

    /// Drop side-table entries for a tree that will never be interpreted.
    pub fn forget(&mut self, ids: &[ExprId]) {
        debug!("Forgetting {} resolved node(s)", ids.len());

        for id in ids {
            self.locals.remove(id);
        }
        self.transient.clear();
    }

    /// Names currently bound in the global scope.
    pub fn global_names(&self) -> Vec<String> {
        self.globals.borrow().names()
    }

    /// Interprets a list of statements (a "program"). The first runtime error
    /// aborts the rest.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        let result = self.run_program(statements);

        for id in self.transient.drain(..) {
            self.locals.remove(&id);
        }

        if result.is_ok() {
            info!("Interpretation completed successfully");
        }
        result
    }

    fn run_program(&mut self, statements: &[Stmt]) -> Result<()> {
        for stmt in statements {
            self.execute(stmt)?;
        }

        self.out.flush()?;
        Ok(())
    }

    /// Run `statements` with `environment` as the current scope, restoring
    /// the previous scope on every exit path.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> Result<Flow> {
        let previous: EnvRef = std::mem::replace(&mut self.environment, environment);

        let result = self.execute_all(statements);

        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}
                jump => return Ok(jump),
            }
        }

        Ok(Flow::Normal)
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                debug!("Printed value: {}", value);
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}'", name.lexeme);
                self.environment.borrow_mut().define(&name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let scope = Environment::with_enclosing(Rc::clone(&self.environment));
                return self.execute_block(statements, scope.into_ref());
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_stmt) = else_branch {
                    return self.execute(else_stmt);
                }
            }

            Stmt::While {
                condition,
                body,
                increment,
            } => {
                debug!("Entering while loop");

                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }

                    if let Some(increment) = increment {
                        self.evaluate(increment)?;
                    }
                }

                debug!("Exited while loop");
            }

            Stmt::Break(_) => return Ok(Flow::Break),

            Stmt::Continue(_) => return Ok(Flow::Continue),

            Stmt::Function(FunctionStmt { name, function }) => {
                debug!("Defining function '{}'", name.lexeme);

                let value = Function::new(
                    Some(name.lexeme.clone()),
                    Rc::clone(function),
                    Rc::clone(&self.environment),
                    false,
                );

                self.environment.borrow_mut().define(
                    &name.lexeme,
                    Value::Callable(Callable::Function(Rc::new(value))),
                );
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                return Ok(Flow::Return(value));
            }

            Stmt::Class { name, methods } => {
                debug!("Defining class '{}'", name.lexeme);

                let methods: HashMap<String, Rc<Function>> = methods
                    .iter()
                    .map(|method| {
                        let function = Function::new(
                            Some(method.name.lexeme.clone()),
                            Rc::clone(&method.function),
                            Rc::clone(&self.environment),
                            method.name.lexeme == "init",
                        );

                        (method.name.lexeme.clone(), Rc::new(function))
                    })
                    .collect();

                let class = Class::new(name.lexeme.clone(), methods);

                self.environment.borrow_mut().define(
                    &name.lexeme,
                    Value::Callable(Callable::Class(Rc::new(class))),
                );
            }
        }

        Ok(Flow::Normal)
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right: Value = self.evaluate(right)?;

                match operator.token_type {
                    TokenType::MINUS => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(ZeError::runtime(operator, "Operand must be a number.")),
                    },
                    TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
                    _ => Err(ZeError::runtime(operator, "Invalid unary operator.")),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;
                let right: Value = self.evaluate(right)?;

                binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;

                let short_circuit = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }

            Expr::Comma(expressions) => {
                let mut result: Value = Value::Nil;

                for expr in expressions {
                    result = self.evaluate(expr)?;
                }

                Ok(result)
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value = self.evaluate(callee)?;

                let mut values: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                let Value::Callable(callable) = callee else {
                    return Err(ZeError::runtime(
                        paren,
                        "Can only call functions and classes.",
                    ));
                };

                if values.len() != callable.arity() {
                    return Err(ZeError::runtime(
                        paren,
                        format!(
                            "Expected {} arguments but got {}.",
                            callable.arity(),
                            values.len()
                        ),
                    ));
                }

                callable.call(self, values, paren)
            }

            Expr::Function(declaration) => {
                let function = Function::new(
                    None,
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                Ok(Value::Callable(Callable::Function(Rc::new(function))))
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => Instance::get(&instance, name),
                _ => Err(ZeError::runtime(name, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(ZeError::runtime(name, "Only instances have fields."));
                };

                let value: Value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());

                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(ZeError::runtime(operator, "Operands must be numbers.")),
    }
}

/// Arithmetic, comparison and equality on already evaluated operands.
fn binary(operator: &Token, left: Value, right: Value) -> Result<Value> {
    trace!(
        "Binary '{}' on {} and {}",
        operator.lexeme,
        left.type_name(),
        right.type_name()
    );

    match operator.token_type {
        TokenType::PLUS => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (Value::String(a), Value::Number(b)) => {
                Ok(Value::String(a + &format_number(b)))
            }
            (Value::Number(a), Value::String(b)) => {
                Ok(Value::String(format_number(a) + &b))
            }
            _ => Err(ZeError::runtime(
                operator,
                "Operands must be two numbers or two strings.",
            )),
        },

        TokenType::MINUS => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Number(a - b))
        }

        TokenType::STAR => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Number(a * b))
        }

        TokenType::SLASH => {
            let (a, b) = number_operands(operator, &left, &right)?;

            if b == 0.0 {
                return Err(ZeError::runtime(operator, "Divide by zero."));
            }

            Ok(Value::Number(a / b))
        }

        TokenType::GREATER => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a > b))
        }

        TokenType::GREATER_EQUAL => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a >= b))
        }

        TokenType::LESS => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a < b))
        }

        TokenType::LESS_EQUAL => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a <= b))
        }

        TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

        TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

        _ => Err(ZeError::runtime(operator, "Invalid binary operator.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ze;

    fn session() -> Ze {
        Ze::with_output(Box::new(io::sink()))
    }

    #[test]
    fn top_level_resolutions_are_released_after_a_run() {
        let mut ze = session();

        ze.run("{ var a = 1; print a; }").unwrap();

        assert!(ze.interpreter.locals.is_empty());
        assert!(ze.interpreter.transient.is_empty());
    }

    #[test]
    fn function_bodies_keep_their_resolutions() {
        let mut ze = session();

        ze.run("fun f(x) { return x; }").unwrap();
        assert_eq!(ze.interpreter.locals.len(), 1);

        for _ in 0..10 {
            ze.run("{ var y = f(1); print y; }").unwrap();
        }

        assert_eq!(ze.interpreter.locals.len(), 1);
    }

    #[test]
    fn runtime_error_still_releases_resolutions() {
        let mut ze = session();

        assert!(ze.run("{ var a = 1; print a / 0; }").is_err());

        assert!(ze.interpreter.locals.is_empty());
    }

    #[test]
    fn static_error_leaves_no_resolutions() {
        let mut ze = session();

        assert!(ze.run("fun g(a) { return a; }\n{ var unused; }").is_err());

        assert!(ze.interpreter.locals.is_empty());
        assert!(ze.interpreter.transient.is_empty());
    }

    #[test]
    fn uncaptured_call_environments_are_released() {
        let mut ze = session();

        ze.run("fun f(n) { return n; }").unwrap();
        let before = Rc::strong_count(&ze.interpreter.globals);

        ze.run("for (var i = 0; i < 100; i = i + 1) f(i);").unwrap();

        assert_eq!(Rc::strong_count(&ze.interpreter.globals), before);
    }
}
