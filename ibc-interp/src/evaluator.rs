//! The tree-walking evaluator. Ties the scope model, value model,
//! operator engine, lvalue-place resolver and built-ins together into
//! `eval`/`exec_stmt`/`exec_block`, plus the call protocol and the
//! `run` entry point used by the driver.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::rc::Rc;

use ibc_par::{BinaryOp, Expr, ExprKind, Literal, PostfixOp, Program, Stmt, UnaryOp};
use ibc_util::{Error, Position, Result};

use crate::builtins;
use crate::operators as ops;
use crate::place::{self, Place};
use crate::scope::Scope;
use crate::value::{BuiltinId, Data, FunctionValue, Value};

/// Drives execution of a parsed program against a pair of I/O streams.
/// Borrowed rather than owned so a driver can wire stdin/stdout or,
/// in tests, an in-memory buffer.
pub struct Evaluator<'io> {
    out: &'io mut dyn Write,
    inp: &'io mut dyn BufRead,
    in_function_depth: u32,
}

impl<'io> Evaluator<'io> {
    pub fn new(out: &'io mut dyn Write, inp: &'io mut dyn BufRead) -> Self {
        Evaluator {
            out,
            inp,
            in_function_depth: 0,
        }
    }

    /// Runs a whole program in a fresh global scope with the built-ins
    /// installed.
    pub fn run(&mut self, program: &Program) -> Result<()> {
        let mut scope = Scope::new();
        builtins::install_globals(&mut scope);
        self.exec_block(&mut scope, program)?;
        Ok(())
    }

    // -- statements ----------------------------------------------------

    /// Executes a block in its own scope level. Returns `Some(value)`
    /// if a `return` propagated out of it.
    fn exec_block(&mut self, scope: &mut Scope, stmts: &[Stmt]) -> Result<Option<Value>> {
        scope.enter_block();
        for stmt in stmts {
            if let Some(v) = self.exec_stmt(scope, stmt)? {
                scope.exit_block();
                return Ok(Some(v));
            }
        }
        scope.exit_block();
        Ok(None)
    }

    fn exec_stmt(&mut self, scope: &mut Scope, stmt: &Stmt) -> Result<Option<Value>> {
        match stmt {
            Stmt::Expr(e) => {
                self.eval(scope, e)?;
                Ok(None)
            }
            Stmt::If { cases, .. } => {
                for (cond, body) in cases {
                    if self.eval(scope, cond)?.is_true() {
                        return self.exec_block(scope, body);
                    }
                }
                Ok(None)
            }
            Stmt::While { cond, body, .. } => {
                while self.eval(scope, cond)?.is_true() {
                    if let Some(v) = self.exec_block(scope, body)? {
                        return Ok(Some(v));
                    }
                }
                Ok(None)
            }
            Stmt::ForRange {
                counter,
                lower,
                upper,
                body,
                offset,
            } => self.exec_for_range(scope, counter, lower, upper, body, *offset),
            Stmt::Return { expr, offset } => {
                if self.in_function_depth == 0 {
                    return Err(Error::custom("return outside of a function")
                        .set_pos_if_unset(Position::new(*offset)));
                }
                let v = self.eval(scope, expr)?;
                Ok(Some(v.as_rvalue()))
            }
            Stmt::FunctionDef {
                name,
                params,
                body,
                ..
            } => {
                self.define_function(scope, name, params, body);
                Ok(None)
            }
        }
    }

    /// Bounds are evaluated once up front to validate `lower <= upper`,
    /// then re-evaluated each iteration since the body may mutate the
    /// identifiers the bound expressions read from. The range is
    /// inclusive of the upper bound.
    fn exec_for_range(
        &mut self,
        scope: &mut Scope,
        counter: &str,
        lower: &Expr,
        upper: &Expr,
        body: &[Stmt],
        offset: usize,
    ) -> Result<Option<Value>> {
        let lo0 = self.eval(scope, lower)?;
        let hi0 = self.eval(scope, upper)?;
        let lo0_i = ops::numeric_to_i64(&lo0, offset)?;
        let hi0_i = ops::numeric_to_i64(&hi0, offset)?;
        if lo0_i > hi0_i {
            return Err(Error::value("for-range lower bound exceeds upper bound")
                .set_pos_if_unset(Position::new(offset)));
        }

        scope.enter_block();
        let counter_key = scope.declare(counter.to_string(), Value::int(lo0_i));
        let result = loop {
            let cur = ops::numeric_to_i64(scope.get(&counter_key).expect("counter binding"), offset)?;
            let hi_v = self.eval(scope, upper)?;
            let hi_i = ops::numeric_to_i64(&hi_v, offset)?;
            if cur > hi_i {
                break Ok(None);
            }
            if let Some(v) = self.exec_block(scope, body)? {
                break Ok(Some(v));
            }
            let next = ops::numeric_to_i64(scope.get(&counter_key).expect("counter binding"), offset)? + 1;
            scope.insert_at(counter_key.clone(), Value::int(next));
        };
        scope.exit_block();
        result
    }

    /// `method` statements capture a restricted snapshot of the
    /// enclosing scope at definition time, not at call time — this is
    /// what lets a closure returned from its defining function still
    /// see the bindings it captured once that function has exited. The
    /// snapshot cell is wired into the value before being populated so
    /// a function can see its own name for recursion.
    fn define_function(&mut self, scope: &mut Scope, name: &str, params: &[String], body: &[Stmt]) {
        let captured = Rc::new(RefCell::new(BTreeMap::new()));
        let func = FunctionValue {
            params: Rc::new(params.to_vec()),
            body: Rc::new(body.to_vec()),
            defined_block_level: scope.block_level(),
            defined_function_level: scope.function_level(),
            captured: Rc::clone(&captured),
        };
        scope.declare(name.to_string(), Value::function(func));
        let snapshot = scope.restricted_snapshot(scope.function_level());
        *captured.borrow_mut() = snapshot;
    }

    // -- expressions -----------------------------------------------------

    /// Evaluates an expression, then clears the lvalue flag if it was
    /// parsed inside parentheses — `(x) = 1` must be rejected even
    /// though `x = 1` is accepted.
    pub fn eval(&mut self, scope: &mut Scope, expr: &Expr) -> Result<Value> {
        let v = self.eval_inner(scope, expr)?;
        Ok(if expr.force_rvalue { v.as_rvalue() } else { v })
    }

    fn eval_inner(&mut self, scope: &mut Scope, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(literal_to_value(lit)),
            ExprKind::Identifier(name) => match scope.resolve(name) {
                Some(key) => Ok(scope.get(&key).expect("resolved key exists").clone().as_lvalue()),
                None => Err(Error::name(format!("undefined identifier '{name}'"))
                    .set_pos_if_unset(Position::new(expr.offset))),
            },
            ExprKind::Unary(op, operand) => self.eval_unary(scope, *op, operand, expr.offset),
            ExprKind::Postfix(op, operand) => self.eval_postfix(scope, *op, operand, expr.offset),
            ExprKind::Binary(op, l, r) => self.eval_binary(scope, *op, l, r, expr.offset),
            ExprKind::Call(callee, args) => self.eval_call(scope, callee, args, expr.offset),
            ExprKind::Subscript(head, indices) => self.eval_subscript_read(scope, head, indices, expr.offset),
            ExprKind::Member(..) => Err(Error::ty("member access is only valid as a method call")
                .set_pos_if_unset(Position::new(expr.offset))),
        }
    }

    fn eval_unary(&mut self, scope: &mut Scope, op: UnaryOp, operand: &Expr, offset: usize) -> Result<Value> {
        match op {
            UnaryOp::Neg => ops::unary_neg(&self.eval(scope, operand)?, offset),
            UnaryOp::Pos => ops::unary_pos(&self.eval(scope, operand)?, offset),
            UnaryOp::Not => Ok(ops::logical_not(&self.eval(scope, operand)?)),
            UnaryOp::PreInc | UnaryOp::PreDec => {
                let place = self.assign_target(scope, operand)?;
                let cur = place::resolve_ref(scope, &place, offset)?.clone();
                let delta = if op == UnaryOp::PreInc { 1 } else { -1 };
                let updated = ops::step(&cur, delta, offset)?;
                self.perform_assign(scope, &place, updated, offset)
            }
        }
    }

    /// Postfix `++`/`--` yields the pre-update value as an rvalue.
    fn eval_postfix(&mut self, scope: &mut Scope, op: PostfixOp, operand: &Expr, offset: usize) -> Result<Value> {
        let place = self.assign_target(scope, operand)?;
        let cur = place::resolve_ref(scope, &place, offset)?.clone();
        let delta = if op == PostfixOp::PostInc { 1 } else { -1 };
        let updated = ops::step(&cur, delta, offset)?;
        self.perform_assign(scope, &place, updated, offset)?;
        Ok(cur.as_rvalue())
    }

    fn eval_binary(
        &mut self,
        scope: &mut Scope,
        op: BinaryOp,
        l: &Expr,
        r: &Expr,
        offset: usize,
    ) -> Result<Value> {
        use BinaryOp::*;
        match op {
            Comma => {
                self.eval(scope, l)?;
                self.eval(scope, r)
            }
            Assign => {
                let place = self.assign_target(scope, l)?;
                let rhs = self.eval(scope, r)?;
                self.perform_assign(scope, &place, rhs, offset)
            }
            AddAssign | SubAssign | MulAssign | DivAssign | ModAssign => {
                let place = self.assign_target(scope, l)?;
                let cur = place::resolve_ref(scope, &place, offset)?.clone();
                let rhs = self.eval(scope, r)?;
                let computed = match op {
                    AddAssign => ops::add(&cur, &rhs, offset)?,
                    SubAssign => ops::sub(&cur, &rhs, offset)?,
                    MulAssign => ops::mul(&cur, &rhs, offset)?,
                    DivAssign => ops::div(&cur, &rhs, offset)?,
                    ModAssign => ops::modulo(&cur, &rhs, offset)?,
                    _ => unreachable!(),
                };
                self.perform_assign(scope, &place, computed, offset)
            }
            // `and`/`or` evaluate both operands eagerly; there is no
            // short-circuit.
            Or => {
                let a = self.eval(scope, l)?;
                let b = self.eval(scope, r)?;
                Ok(ops::logical_or(&a, &b))
            }
            And => {
                let a = self.eval(scope, l)?;
                let b = self.eval(scope, r)?;
                Ok(ops::logical_and(&a, &b))
            }
            Eq | NotEq | Lt | Gt | LtEq | GtEq => {
                let a = self.eval(scope, l)?;
                let b = self.eval(scope, r)?;
                match op {
                    Eq => ops::eq(&a, &b, offset),
                    NotEq => ops::ne(&a, &b, offset),
                    Lt => ops::lt(&a, &b, offset),
                    Gt => ops::gt(&a, &b, offset),
                    LtEq => ops::le(&a, &b, offset),
                    GtEq => ops::ge(&a, &b, offset),
                    _ => unreachable!(),
                }
            }
            Add | Sub | Mul | Div | Mod | IDiv => {
                let a = self.eval(scope, l)?;
                let b = self.eval(scope, r)?;
                match op {
                    Add => ops::add(&a, &b, offset),
                    Sub => ops::sub(&a, &b, offset),
                    Mul => ops::mul(&a, &b, offset),
                    Div => ops::div(&a, &b, offset),
                    Mod => ops::modulo(&a, &b, offset),
                    IDiv => ops::int_div(&a, &b, offset),
                    _ => unreachable!(),
                }
            }
        }
    }

    /// Reads through zero or more subscript levels. The result carries
    /// `lvalue = true` only when the chain is rooted in a scope binding,
    /// so e.g. `Array(3)[0]` (indexing a freshly-constructed temporary)
    /// reads fine but cannot be assigned through.
    fn eval_subscript_read(
        &mut self,
        scope: &mut Scope,
        head: &Expr,
        indices: &[Expr],
        offset: usize,
    ) -> Result<Value> {
        let mut cur = self.eval(scope, head)?;
        let was_lvalue = cur.lvalue;
        for idx_expr in indices {
            let idx_val = self.eval(scope, idx_expr)?;
            let idx = ops::require_index(&idx_val, idx_expr.offset)?;
            cur = index_value_read(&cur, idx, offset)?;
        }
        Ok(if was_lvalue { cur.as_lvalue() } else { cur.as_rvalue() })
    }

    fn eval_call(&mut self, scope: &mut Scope, callee: &Expr, arg_exprs: &[Expr], offset: usize) -> Result<Value> {
        if let ExprKind::Member(inner, method) = &callee.kind {
            return self.call_container_method(scope, inner, method, arg_exprs, offset);
        }
        let callee_val = self.eval(scope, callee)?;
        match &callee_val.data {
            Data::Builtin(BuiltinId::Output) => {
                let args = self.eval_args(scope, arg_exprs)?;
                builtins::output(&args, self.out)
            }
            Data::Builtin(BuiltinId::Input) => self.call_input(scope, arg_exprs, offset),
            Data::Builtin(id) => {
                let id = *id;
                let args = self.eval_args(scope, arg_exprs)?;
                builtins::call_ctor(id, &args, offset)
            }
            Data::Function(f) => {
                let f = f.clone();
                self.call_user_function(&f, scope, arg_exprs, offset)
            }
            other => Err(Error::ty(format!("'{}' is not callable", other.type_name()))
                .set_pos_if_unset(Position::new(offset))),
        }
    }

    /// `input()` writes back into its single optional argument, which
    /// must be an lvalue — the one built-in that takes an argument by
    /// reference rather than by value.
    fn call_input(&mut self, scope: &mut Scope, arg_exprs: &[Expr], offset: usize) -> Result<Value> {
        if arg_exprs.len() > 1 {
            return Err(Error::argument("input() accepts at most one argument")
                .set_pos_if_unset(Position::new(offset)));
        }
        let place = match arg_exprs.first() {
            Some(e) => Some(self.assign_target(scope, e)?),
            None => None,
        };
        let value = builtins::read_input(self.inp)?;
        if let Some(place) = &place {
            self.perform_assign(scope, place, value.clone(), offset)?;
        }
        Ok(value)
    }

    fn eval_args(&mut self, scope: &mut Scope, exprs: &[Expr]) -> Result<Vec<Value>> {
        exprs.iter().map(|e| self.eval(scope, e)).collect()
    }

    /// Container method calls try to resolve a mutable place in the
    /// receiver first (so `stack.push(x)` mutates it in scope); a
    /// receiver that isn't an lvalue (e.g. a freshly constructed
    /// temporary) falls back to an owned value, which is fine for
    /// read-only methods like `size`/`length`. Unlike `assign_target`,
    /// an unresolved bare identifier here is a name error rather than a
    /// fresh declaration — `s.push(1)` on an undefined `s` must not
    /// silently conjure an empty binding to fail a method lookup on.
    fn call_container_method(
        &mut self,
        scope: &mut Scope,
        inner: &Expr,
        method: &str,
        arg_exprs: &[Expr],
        offset: usize,
    ) -> Result<Value> {
        let args = self.eval_args(scope, arg_exprs)?;
        match self.resolve_receiver_place(scope, inner)? {
            Some(place) => {
                let v = place::resolve_mut(scope, &place, inner.offset)?;
                builtins::dispatch_method(v, method, args, offset)
            }
            None => {
                let mut v = self.eval(scope, inner)?;
                builtins::dispatch_method(&mut v, method, args, offset)
            }
        }
    }

    /// Like `assign_target`, but an unresolved identifier is a name
    /// error instead of an implicit declaration, and a non-lvalue
    /// expression returns `Ok(None)` instead of erroring, so the caller
    /// can fall back to reading it as an owned value.
    fn resolve_receiver_place(&mut self, scope: &mut Scope, expr: &Expr) -> Result<Option<Place>> {
        if expr.force_rvalue {
            return Ok(None);
        }
        match &expr.kind {
            ExprKind::Identifier(name) => match scope.resolve(name) {
                Some(key) => Ok(Some(Place::Var(key))),
                None => Err(Error::name(format!("undefined identifier '{name}'"))
                    .set_pos_if_unset(Position::new(expr.offset))),
            },
            ExprKind::Subscript(head, indices) => {
                let Some(mut place) = self.resolve_receiver_place(scope, head)? else {
                    return Ok(None);
                };
                for idx_expr in indices {
                    let idx_val = self.eval(scope, idx_expr)?;
                    let idx = ops::require_index(&idx_val, idx_expr.offset)?;
                    place = Place::Index(Box::new(place), idx);
                }
                Ok(Some(place))
            }
            _ => Ok(None),
        }
    }

    /// §4.6's call protocol: check arity, evaluate arguments in the
    /// caller's scope, rebuild a scope from the captured snapshot at the
    /// function's own defined levels, deep-copy container arguments into
    /// fresh parameter bindings, run the body, discard the scope.
    fn call_user_function(
        &mut self,
        f: &FunctionValue,
        caller_scope: &mut Scope,
        arg_exprs: &[Expr],
        offset: usize,
    ) -> Result<Value> {
        if arg_exprs.len() != f.params.len() {
            return Err(Error::argument(format!(
                "expected {} argument(s), found {}",
                f.params.len(),
                arg_exprs.len()
            ))
            .set_pos_if_unset(Position::new(offset)));
        }
        let args = self.eval_args(caller_scope, arg_exprs)?;

        let snapshot = f.captured.borrow().clone();
        let mut call_scope = Scope::from_bindings(snapshot, f.defined_block_level, f.defined_function_level);
        call_scope.enter_function();
        for (param, val) in f.params.iter().zip(args.into_iter()) {
            let bound = if val.data.is_container() {
                val.deep_copy()
            } else {
                val.as_rvalue()
            };
            call_scope.declare(param.clone(), bound);
        }

        self.in_function_depth += 1;
        let result = self.exec_block(&mut call_scope, &f.body);
        self.in_function_depth -= 1;
        Ok(result?.unwrap_or_else(Value::empty))
    }

    // -- assignment targets ----------------------------------------------

    /// Resolves an expression to a `Place` it can be assigned through.
    /// A bare, unresolved identifier used as an assignment target
    /// declares a fresh binding rather than raising a name error — this
    /// is the one context where an unresolved identifier is not an
    /// error.
    fn assign_target(&mut self, scope: &mut Scope, expr: &Expr) -> Result<Place> {
        if expr.force_rvalue {
            return Err(Error::custom("assignment target is not an lvalue")
                .set_pos_if_unset(Position::new(expr.offset)));
        }
        match &expr.kind {
            ExprKind::Identifier(name) => match scope.resolve(name) {
                Some(key) => Ok(Place::Var(key)),
                None => Ok(Place::Var(scope.declare(name.clone(), Value::empty()))),
            },
            ExprKind::Subscript(head, indices) => {
                let mut place = self.assign_target(scope, head)?;
                for idx_expr in indices {
                    let idx_val = self.eval(scope, idx_expr)?;
                    let idx = ops::require_index(&idx_val, idx_expr.offset)?;
                    place = Place::Index(Box::new(place), idx);
                }
                Ok(place)
            }
            _ => Err(Error::custom("assignment target is not an lvalue")
                .set_pos_if_unset(Position::new(expr.offset))),
        }
    }

    /// Performs an assignment through an already-resolved place: const
    /// bindings reject outright, persistent-typed bindings keep their
    /// discriminant and numerically cast the right-hand side, everything
    /// else takes the right-hand side outright (deep-copying it if it is
    /// a container, so aliasing never survives an assignment).
    fn perform_assign(&mut self, scope: &mut Scope, place: &Place, rhs: Value, offset: usize) -> Result<Value> {
        let target = place::resolve_mut(scope, place, offset)?;
        if target.is_const {
            return Err(Error::ty("cannot assign to a const value").set_pos_if_unset(Position::new(offset)));
        }
        if target.persistent_type {
            target.data = cast_preserving_discriminant(&target.data, &rhs, offset)?;
        } else if rhs.data.is_container() {
            target.data = rhs.deep_copy().data;
        } else {
            target.data = rhs.data;
        }
        Ok(target.clone().as_lvalue())
    }
}

fn index_value_read(v: &Value, idx: usize, offset: usize) -> Result<Value> {
    let elements = match &v.data {
        Data::Array(a) => &a.elements,
        Data::Str(s) => &s.elements,
        _ => {
            return Err(Error::ty(format!("'{}' is not subscriptable", v.data.type_name()))
                .set_pos_if_unset(Position::new(offset)))
        }
    };
    elements
        .get(idx)
        .cloned()
        .ok_or_else(|| Error::range(format!("index {idx} out of bounds")).set_pos_if_unset(Position::new(offset)))
}

fn cast_preserving_discriminant(target: &Data, rhs: &Value, offset: usize) -> Result<Data> {
    match target {
        Data::Char(_) => Ok(Data::Char(ops::numeric_to_char(rhs, offset)?)),
        Data::Int(_) => Ok(Data::Int(ops::numeric_to_i64(rhs, offset)?)),
        Data::Float(_) => Ok(Data::Float(ops::numeric_to_f64(rhs, offset)?)),
        other => {
            if std::mem::discriminant(other) == std::mem::discriminant(&rhs.data) {
                Ok(rhs.data.clone())
            } else {
                Err(Error::ty("a persistent-typed binding cannot change kind")
                    .set_pos_if_unset(Position::new(offset)))
            }
        }
    }
}

fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Bool(b) => Value::bool(*b),
        Literal::Int(i) => Value::int(*i),
        Literal::Float(f) => Value::float(*f),
        Literal::Char(c) => Value::char(*c),
        Literal::Str(s) => Value::string(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_capturing(src: &str) -> String {
        let tokens = ibc_lex::tokenize(src).expect("lex");
        let program = ibc_par::parse(tokens).expect("parse");
        let mut out = Vec::new();
        let mut inp = Cursor::new(Vec::new());
        {
            let mut eval = Evaluator::new(&mut out, &mut inp);
            eval.run(&program).expect("run");
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn arithmetic_and_output() {
        let out = run_capturing("output(1 + 2 * 3)\n");
        assert_eq!(out, "7\n");
    }

    #[test]
    fn string_coercion_on_plus() {
        let out = run_capturing("output(\"x=\" + 5)\n");
        assert_eq!(out, "x=5\n");
    }

    #[test]
    fn if_elseif_else_picks_first_true_branch() {
        let src = "N = 2\nif N == 1 then\n\toutput(\"one\")\nelse if N == 2 then\n\toutput(\"two\")\nelse\n\toutput(\"other\")\n";
        assert_eq!(run_capturing(src), "two\n");
    }

    #[test]
    fn for_range_is_inclusive_both_ends() {
        let out = run_capturing("for i from 1 to 3\n\toutput(i)\n");
        assert_eq!(out, "1\n2\n3\n");
    }

    #[test]
    fn while_loop_mutates_counter() {
        let out = run_capturing("i = 0\nwhile i < 3\n\toutput(i)\n\ti = i + 1\n");
        assert_eq!(out, "0\n1\n2\n");
    }

    #[test]
    fn function_call_and_return() {
        let src = "method square(x)\n\treturn x * x\noutput(square(4))\n";
        assert_eq!(run_capturing(src), "16\n");
    }

    #[test]
    fn recursive_function_via_self_captured_binding() {
        let src = "method fact(n)\n\tif n <= 1 then\n\t\treturn 1\n\treturn n * fact(n - 1)\noutput(fact(5))\n";
        assert_eq!(run_capturing(src), "120\n");
    }

    #[test]
    fn closure_captures_definition_time_binding_after_defining_function_returns() {
        let src = concat!(
            "method makeCounter()\n",
            "\tk = 10\n",
            "\tmethod bump()\n",
            "\t\treturn k\n",
            "\treturn bump\n",
            "f = makeCounter()\n",
            "output(f())\n",
        );
        assert_eq!(run_capturing(src), "10\n");
    }

    #[test]
    fn array_assignment_deep_copies() {
        let src = "a = Array(3)\na[0] = 1\nb = a\nb[0] = 99\noutput(a[0])\noutput(b[0])\n";
        assert_eq!(run_capturing(src), "1\n99\n");
    }

    #[test]
    fn stack_push_pop_is_lifo() {
        let src = "s = Stack()\ns.push(1)\ns.push(2)\noutput(s.pop())\noutput(s.pop())\n";
        assert_eq!(run_capturing(src), "2\n1\n");
    }

    #[test]
    fn and_or_do_not_short_circuit_side_effects() {
        let src = concat!(
            "hits = 0\n",
            "method bump()\n",
            "\thits = hits + 1\n",
            "\treturn true\n",
            "x = false and bump()\n",
            "output(hits)\n",
        );
        // `bump` mutates a function-local `hits`, not the outer one, but
        // the call itself must still happen despite the left operand
        // being false.
        assert_eq!(run_capturing(src), "0\n");
    }

    #[test]
    fn assignment_to_unresolved_identifier_declares_it() {
        let out = run_capturing("x = 41\nx = x + 1\noutput(x)\n");
        assert_eq!(out, "42\n");
    }

    #[test]
    fn reading_unresolved_identifier_is_a_name_error() {
        let tokens = ibc_lex::tokenize("output(nope)\n").unwrap();
        let program = ibc_par::parse(tokens).unwrap();
        let mut out = Vec::new();
        let mut inp = Cursor::new(Vec::new());
        let mut eval = Evaluator::new(&mut out, &mut inp);
        let err = eval.run(&program).unwrap_err();
        assert!(matches!(err.kind(), ibc_util::ErrorKind::Name(_)));
    }

    #[test]
    fn method_call_on_undefined_receiver_is_a_name_error_not_argument_error() {
        let tokens = ibc_lex::tokenize("s.push(1)\n").unwrap();
        let program = ibc_par::parse(tokens).unwrap();
        let mut out = Vec::new();
        let mut inp = Cursor::new(Vec::new());
        let mut eval = Evaluator::new(&mut out, &mut inp);
        let err = eval.run(&program).unwrap_err();
        assert!(matches!(err.kind(), ibc_util::ErrorKind::Name(_)));
    }

    #[test]
    fn for_range_rejects_lower_greater_than_upper() {
        let tokens = ibc_lex::tokenize("for i from 5 to 1\n\toutput(i)\n").unwrap();
        let program = ibc_par::parse(tokens).unwrap();
        let mut out = Vec::new();
        let mut inp = Cursor::new(Vec::new());
        let mut eval = Evaluator::new(&mut out, &mut inp);
        assert!(eval.run(&program).is_err());
    }
}
