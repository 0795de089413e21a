//! `print`, `inputi`, `inputs` — the language's only built-in functions,
//! backed by the host's [`crate::io_host::HostIo`] rather than real stdio
//! directly, matching `interpreterv4.py`'s `self.output(...)`/`self.get_input()`.

use crate::ast::Expr;
use crate::error::EvalError;
use crate::interpreter::Interpreter;
use crate::value::Value;

pub(crate) fn print(interp: &mut Interpreter, args: &[Expr]) -> Result<Value, EvalError> {
    let mut line = String::new();
    for arg in args {
        let value = interp.evaluate_expression(arg)?;
        line.push_str(&value.display_form());
    }
    interp.host_mut().output(&line);
    Ok(Value::Nil)
}

pub(crate) fn inputi(interp: &mut Interpreter, args: &[Expr]) -> Result<Value, EvalError> {
    if args.len() > 1 {
        return Err(EvalError::name("no inputi() function found that takes > 1 parameter"));
    }
    if let Some(prompt) = args.first() {
        let prompt = interp.evaluate_expression(prompt)?;
        interp.host_mut().output(&prompt.display_form());
    }
    let line = interp.host_mut().get_input();
    line.trim()
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|_| EvalError::type_error(format!("invalid integer input '{line}'")))
}

pub(crate) fn inputs(interp: &mut Interpreter, args: &[Expr]) -> Result<Value, EvalError> {
    if args.len() > 1 {
        return Err(EvalError::name("no inputs() function found that takes > 1 parameter"));
    }
    if let Some(prompt) = args.first() {
        let prompt = interp.evaluate_expression(prompt)?;
        interp.host_mut().output(&prompt.display_form());
    }
    Ok(Value::Str(interp.host_mut().get_input()))
}
