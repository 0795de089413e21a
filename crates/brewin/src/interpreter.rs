//! The evaluator: mutually recursive `run_statements`/`run_statement`,
//! call dispatch, and expression evaluation, grounded on the shape of
//! `interpreterv4.py`'s `Interpreter` class but built around `Result`
//! propagation instead of a non-returning `host.error()` callback.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use crate::ast::{Call, DottedName, Expr, FuncDef, PassingScheme, Program, Stmt};
use crate::builtins;
use crate::environment::Environment;
use crate::error::EvalError;
use crate::io_host::HostIo;
use crate::object::Object;
use crate::operators::{coerce_condition, eval_binary, eval_unary};
use crate::resource::MAX_CALL_DEPTH;
use crate::value::{Cell, Closure, Value, deep_copy, new_cell};

/// One argument's resolved binding, decided up front (before any callee
/// frame exists) so that evaluating later arguments still sees the
/// caller's bindings rather than ones the callee has already pushed.
enum ArgBinding {
    /// `refarg` bound directly to a bare-name argument: shares the
    /// caller's cell.
    Shared(Cell),
    /// Everything else: a value with its own fresh cell.
    Owned(Value),
}

pub struct Interpreter<'h> {
    env: Environment,
    host: &'h mut dyn HostIo,
    call_depth: usize,
}

impl<'h> Interpreter<'h> {
    #[must_use]
    pub fn new(host: &'h mut dyn HostIo) -> Self {
        Self {
            env: Environment::new(),
            host,
            call_depth: 0,
        }
    }

    /// Installs every top-level function, then calls `main()` with no
    /// arguments. Returns `main`'s return value (`Nil` if it falls off the
    /// end without a `return`).
    pub fn run(&mut self, program: &Program) -> Result<Value, EvalError> {
        self.install_functions(program);
        if !self.env.is_defined("main") {
            return Err(EvalError::name("no main() function was found"));
        }
        let main = self.env.read("main").expect("checked is_defined above");
        self.invoke(main, &[], "main", None)
    }

    fn install_functions(&mut self, program: &Program) {
        for func in &program.functions {
            let name = func.name.clone().expect("top-level function defs always carry a name");
            if self.env.is_defined(&name) {
                let existing = self.env.read(&name).expect("checked is_defined above");
                let mut arities: BTreeMap<usize, Rc<FuncDef>> = match existing {
                    Value::OverloadedFunc(map) => (*map).clone(),
                    Value::Func(closure) => {
                        let mut map = BTreeMap::new();
                        map.insert(closure.definition.params.len(), closure.definition);
                        map
                    }
                    _ => unreachable!("top-level bindings are only ever Func/OverloadedFunc at install time"),
                };
                arities.insert(func.params.len(), Rc::clone(func));
                self.env.assign(&name, Value::OverloadedFunc(Rc::new(arities)));
            } else {
                self.env.push_new_binding(
                    &name,
                    Value::Func(Closure {
                        definition: Rc::clone(func),
                        free_vars: HashMap::new(),
                    }),
                );
            }
        }
    }

    fn in_new_frame<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, EvalError>) -> Result<T, EvalError> {
        self.env.push_frame();
        let result = f(self);
        self.env.pop_frame();
        result
    }

    fn run_statements(&mut self, stmts: &[Stmt]) -> Result<Option<Value>, EvalError> {
        for stmt in stmts {
            if let Some(value) = self.run_statement(stmt)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn run_statement(&mut self, stmt: &Stmt) -> Result<Option<Value>, EvalError> {
        match stmt {
            Stmt::Assign { target, value } => {
                let value = self.evaluate_expression(value)?;
                self.do_assignment(target, value)?;
                Ok(None)
            }
            Stmt::Call(call) => {
                self.evaluate_call(call)?;
                Ok(None)
            }
            Stmt::If {
                condition,
                then_body,
                else_body,
            } => self.run_if(condition, then_body, else_body.as_deref()),
            Stmt::While { condition, body } => self.run_while(condition, body),
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => deep_copy(&self.evaluate_expression(expr)?),
                    None => Value::Nil,
                };
                Ok(Some(value))
            }
        }
    }

    fn run_if(&mut self, condition: &Expr, then_body: &[Stmt], else_body: Option<&[Stmt]>) -> Result<Option<Value>, EvalError> {
        let condition = self.evaluate_expression(condition)?;
        let truthy = coerce_condition(&condition)?;
        let body = if truthy {
            Some(then_body)
        } else {
            else_body
        };
        match body {
            Some(body) => self.in_new_frame(|me| me.run_statements(body)),
            None => Ok(None),
        }
    }

    /// Pushes exactly one scope for the entire loop, not one per iteration —
    /// a variable declared inside the loop body keeps its value across
    /// iterations (it is only re-bound if the body itself reassigns it).
    fn run_while(&mut self, condition: &Expr, body: &[Stmt]) -> Result<Option<Value>, EvalError> {
        self.in_new_frame(|me| loop {
            let condition_value = me.evaluate_expression(condition)?;
            if !coerce_condition(&condition_value)? {
                return Ok(None);
            }
            if let Some(value) = me.run_statements(body)? {
                return Ok(Some(value));
            }
        })
    }

    fn do_assignment(&mut self, target: &DottedName, value: Value) -> Result<(), EvalError> {
        match &target.member {
            None => {
                self.env.assign(&target.base, value);
                Ok(())
            }
            Some(member) => {
                if !self.env.is_defined(&target.base) {
                    return Err(EvalError::name(format!("variable '{}' has not been defined", target.base)));
                }
                let base = self.env.read(&target.base).expect("checked is_defined above");
                match base {
                    Value::Object(obj) => {
                        obj.set(member.clone(), value);
                        Ok(())
                    }
                    other => Err(EvalError::type_error(format!(
                        "attempting to assign member '{member}' on {} '{}'",
                        other.type_name(),
                        target.base
                    ))),
                }
            }
        }
    }

    pub(crate) fn evaluate_expression(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Nil => Ok(Value::Nil),
            Expr::ObjectLiteral => Ok(Value::Object(Object::new())),
            Expr::Var(dotted) => self.read_dotted(dotted),
            Expr::Call(call) => self.evaluate_call(call),
            Expr::Lambda(def) => Ok(self.evaluate_lambda(def)),
            // Both operands are always evaluated, even for `&&`/`||` — the
            // language has no short-circuit evaluation.
            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.evaluate_expression(lhs)?;
                let rhs = self.evaluate_expression(rhs)?;
                eval_binary(*op, &lhs, &rhs)
            }
            Expr::Unary(op, operand) => {
                let operand = self.evaluate_expression(operand)?;
                eval_unary(*op, &operand)
            }
        }
    }

    fn read_dotted(&mut self, dotted: &DottedName) -> Result<Value, EvalError> {
        if !self.env.is_defined(&dotted.base) {
            return Err(EvalError::name(format!("variable '{}' has not been defined", dotted.base)));
        }
        let base = self.env.read(&dotted.base).expect("checked is_defined above");
        match &dotted.member {
            None => {
                if matches!(base, Value::OverloadedFunc(_)) {
                    return Err(EvalError::name(format!(
                        "function '{}' has multiple overloaded versions and cannot be used as a value",
                        dotted.base
                    )));
                }
                Ok(base)
            }
            Some(member) => match base {
                Value::Object(obj) => obj
                    .get(member)
                    .ok_or_else(|| EvalError::name(format!("member '{member}' does not exist on object '{}'", dotted.base))),
                other => Err(EvalError::type_error(format!(
                    "attempting to look up member '{member}' on {} '{}'",
                    other.type_name(),
                    dotted.base
                ))),
            },
        }
    }

    /// Snapshots *every* currently-bound name (not just those referenced in
    /// the lambda body), deep-copying each value — matching
    /// `interpreterv4.py`'s unconditional `copy.deepcopy` of the whole
    /// variable environment at lambda-creation time.
    fn evaluate_lambda(&self, def: &Rc<FuncDef>) -> Value {
        let free_vars = self
            .env
            .current_bindings()
            .map(|(name, cell)| (name.to_owned(), new_cell(deep_copy(&cell.borrow()))))
            .collect();
        Value::Func(Closure {
            definition: Rc::clone(def),
            free_vars,
        })
    }

    fn evaluate_call(&mut self, call: &Call) -> Result<Value, EvalError> {
        match call {
            Call::Func { name, args } => self.do_func_call(name, args),
            Call::Method { objref, name, args } => self.do_method_call(objref, name, args),
        }
    }

    fn do_func_call(&mut self, name: &str, args: &[Expr]) -> Result<Value, EvalError> {
        if self.env.is_defined(name) {
            let callee = self.env.read(name).expect("checked is_defined above");
            return self.invoke(callee, args, name, None);
        }
        match name {
            "print" => builtins::print(self, args),
            "inputi" => builtins::inputi(self, args),
            "inputs" => builtins::inputs(self, args),
            _ => Err(EvalError::name(format!(
                "function {name} that takes {} parameters has not been defined",
                args.len()
            ))),
        }
    }

    fn do_method_call(&mut self, objref: &str, name: &str, args: &[Expr]) -> Result<Value, EvalError> {
        if !self.env.is_defined(objref) {
            return Err(EvalError::name(format!("variable '{objref}' has not been defined")));
        }
        let receiver = self.env.read(objref).expect("checked is_defined above");
        let Value::Object(obj) = &receiver else {
            return Err(EvalError::type_error(format!(
                "attempting to look up member '{name}' on {} '{objref}'",
                receiver.type_name()
            )));
        };
        let callee = obj
            .get(name)
            .ok_or_else(|| EvalError::name(format!("member '{name}' does not exist on object '{objref}'")))?;
        let this_cell = self.env.cell(objref);
        self.invoke(callee, args, &format!("{objref}.{name}"), this_cell)
    }

    fn invoke(&mut self, callee: Value, arg_exprs: &[Expr], debug_name: &str, this_cell: Option<Cell>) -> Result<Value, EvalError> {
        self.call_depth += 1;
        if self.call_depth > MAX_CALL_DEPTH {
            self.call_depth -= 1;
            return Err(EvalError::RecursionLimit { limit: MAX_CALL_DEPTH });
        }
        let result = self.invoke_inner(callee, arg_exprs, debug_name, this_cell);
        self.call_depth -= 1;
        result
    }

    fn invoke_inner(&mut self, callee: Value, arg_exprs: &[Expr], debug_name: &str, this_cell: Option<Cell>) -> Result<Value, EvalError> {
        let (func_def, free_vars) = self.resolve_callee(&callee, arg_exprs.len(), debug_name)?;
        let bindings = self.evaluate_args(&func_def.params, arg_exprs)?;
        let param_names: HashSet<&str> = func_def.params.iter().map(|p| p.name.as_str()).collect();

        self.in_new_frame(|me| {
            for (param, binding) in func_def.params.iter().zip(bindings) {
                match binding {
                    ArgBinding::Shared(cell) => me.env.push_cell(&param.name, cell),
                    ArgBinding::Owned(value) => me.env.push_new_binding(&param.name, value),
                }
            }
            for (name, cell) in &free_vars {
                if !param_names.contains(name.as_str()) {
                    me.env.push_cell(name, Rc::clone(cell));
                }
            }
            if let Some(this_cell) = this_cell {
                if !param_names.contains("this") {
                    me.env.push_cell("this", this_cell);
                }
            }
            let result = me.run_statements(&func_def.body)?;
            Ok(result.unwrap_or(Value::Nil))
        })
    }

    /// Resolves `callee` to the `FuncDef` matching the call's argument
    /// count, and the closure's captured free variables (empty for a
    /// top-level/overloaded function). Arity mismatches are `NameError` for
    /// an overloaded name (no version with that arity exists) and
    /// `TypeError` for a single non-overloaded function (it exists, but
    /// this call doesn't match its signature) — mirroring the spec's
    /// distinction between "no such overload" and "wrong arity".
    fn resolve_callee(&self, callee: &Value, arg_count: usize, debug_name: &str) -> Result<(Rc<FuncDef>, HashMap<String, Cell>), EvalError> {
        match callee {
            Value::OverloadedFunc(map) => {
                let def = map.get(&arg_count).cloned().ok_or_else(|| {
                    EvalError::name(format!("function {debug_name} that takes {arg_count} parameters has not been defined"))
                })?;
                Ok((def, HashMap::new()))
            }
            Value::Func(closure) => {
                if closure.definition.params.len() != arg_count {
                    return Err(EvalError::type_error(format!(
                        "function {debug_name} takes {} parameter(s) but {arg_count} were given",
                        closure.definition.params.len()
                    )));
                }
                Ok((Rc::clone(&closure.definition), closure.free_vars.clone()))
            }
            other => Err(EvalError::type_error(format!(
                "attempting to call {debug_name} but it is of type {}",
                other.type_name()
            ))),
        }
    }

    /// Evaluates every argument *before* any callee binding is pushed, so
    /// that a later argument expression referencing a name the callee is
    /// about to shadow still sees the caller's binding.
    fn evaluate_args(&mut self, params: &[crate::ast::ParamDecl], arg_exprs: &[Expr]) -> Result<Vec<ArgBinding>, EvalError> {
        let mut bindings = Vec::with_capacity(arg_exprs.len());
        for (param, arg_expr) in params.iter().zip(arg_exprs) {
            match param.scheme {
                PassingScheme::RefArg => {
                    if let Expr::Var(DottedName { base, member: None }) = arg_expr {
                        if let Some(cell) = self.env.cell(base) {
                            bindings.push(ArgBinding::Shared(cell));
                            continue;
                        }
                    }
                    // Not a bare variable (or the variable is undefined, which
                    // `evaluate_expression` below will report as NameError):
                    // there is no caller-side cell to share, so it behaves
                    // like a fresh binding. This also covers a member-path
                    // argument (`refarg obj.field`), which `original_source`
                    // does alias on; see SPEC_FULL.md's Open Questions.
                    let value = self.evaluate_expression(arg_expr)?;
                    bindings.push(ArgBinding::Owned(value));
                }
                PassingScheme::ByVal => {
                    let value = self.evaluate_expression(arg_expr)?;
                    bindings.push(ArgBinding::Owned(deep_copy(&value)));
                }
            }
        }
        Ok(bindings)
    }

    pub(crate) fn host_mut(&mut self) -> &mut dyn HostIo {
        self.host
    }
}
