//! The dense part of the design: numeric promotion, string coercion on
//! `+`, comparisons, logical projection, and the lvalue-discipline
//! helper every assignment-family operator goes through.

use ibc_util::{Error, Position, Result};

use ibc_par::{BinaryOp, UnaryOp};

use crate::value::{Data, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Promoted {
    Char(char),
    Int(i64),
    Float(f64),
}

fn rank(v: &Value, offset: usize) -> Result<u8> {
    match &v.data {
        Data::Char(_) => Ok(0),
        Data::Int(_) => Ok(1),
        Data::Float(_) => Ok(2),
        _ => Err(Error::ty(format!(
            "operator requires a numeric operand, found '{}'",
            v.data.type_name()
        ))
        .set_pos_if_unset(Position::new(offset))),
    }
}

fn as_f64(v: &Value) -> f64 {
    match v.data {
        Data::Char(c) => c as u32 as f64,
        Data::Int(i) => i as f64,
        Data::Float(f) => f,
        _ => unreachable!("as_f64 called on non-numeric value"),
    }
}

fn as_i64(v: &Value) -> i64 {
    match v.data {
        Data::Char(c) => c as i64,
        Data::Int(i) => i,
        Data::Float(f) => f as i64,
        _ => unreachable!("as_i64 called on non-numeric value"),
    }
}

fn as_char(v: &Value) -> char {
    match v.data {
        Data::Char(c) => c,
        _ => unreachable!("as_char called on non-char value"),
    }
}

/// Promote both operands to the narrowest common type in the order
/// `char < int < float`.
fn promote(a: &Value, b: &Value, offset: usize) -> Result<(Promoted, Promoted)> {
    let ra = rank(a, offset)?;
    let rb = rank(b, offset)?;
    let top = ra.max(rb);
    Ok(match top {
        2 => (Promoted::Float(as_f64(a)), Promoted::Float(as_f64(b))),
        1 => (Promoted::Int(as_i64(a)), Promoted::Int(as_i64(b))),
        _ => (Promoted::Char(as_char(a)), Promoted::Char(as_char(b))),
    })
}

fn is_string(v: &Value) -> bool {
    matches!(v.data, Data::Str(_))
}

pub fn add(a: &Value, b: &Value, offset: usize) -> Result<Value> {
    if is_string(a) || is_string(b) {
        let mut s = a.display_string();
        s.push_str(&b.display_string());
        return Ok(Value::string(s));
    }
    let (pa, pb) = promote(a, b, offset)?;
    Ok(match (pa, pb) {
        (Promoted::Float(x), Promoted::Float(y)) => Value::float(x + y),
        (Promoted::Int(x), Promoted::Int(y)) => Value::int(x + y),
        (Promoted::Char(x), Promoted::Char(y)) => {
            char_result(x as u32 as i64 + y as u32 as i64, offset)?
        }
        _ => unreachable!("promote always returns a matched pair"),
    })
}

fn char_result(code: i64, offset: usize) -> Result<Value> {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(Value::char)
        .ok_or_else(|| {
            Error::value("character arithmetic produced an out-of-range code point")
                .set_pos_if_unset(Position::new(offset))
        })
}

fn numeric_binop(
    a: &Value,
    b: &Value,
    offset: usize,
    on_float: impl Fn(f64, f64) -> f64,
    on_int: impl Fn(i64, i64) -> i64,
    on_char: impl Fn(i64, i64) -> i64,
) -> Result<Value> {
    let (pa, pb) = promote(a, b, offset)?;
    Ok(match (pa, pb) {
        (Promoted::Float(x), Promoted::Float(y)) => Value::float(on_float(x, y)),
        (Promoted::Int(x), Promoted::Int(y)) => Value::int(on_int(x, y)),
        (Promoted::Char(x), Promoted::Char(y)) => {
            return char_result(on_char(x as u32 as i64, y as u32 as i64), offset)
        }
        _ => unreachable!("promote always returns a matched pair"),
    })
}

pub fn sub(a: &Value, b: &Value, offset: usize) -> Result<Value> {
    numeric_binop(a, b, offset, |x, y| x - y, |x, y| x - y, |x, y| x - y)
}

pub fn mul(a: &Value, b: &Value, offset: usize) -> Result<Value> {
    numeric_binop(a, b, offset, |x, y| x * y, |x, y| x * y, |x, y| x * y)
}

pub fn div(a: &Value, b: &Value, offset: usize) -> Result<Value> {
    numeric_binop(a, b, offset, |x, y| x / y, |x, y| x / y, |x, y| x / y)
}

fn reject_float(a: &Value, b: &Value, offset: usize) -> Result<()> {
    if matches!(a.data, Data::Float(_)) || matches!(b.data, Data::Float(_)) {
        return Err(Error::ty("'%'/'div'/'mod' do not accept a float operand")
            .set_pos_if_unset(Position::new(offset)));
    }
    Ok(())
}

pub fn modulo(a: &Value, b: &Value, offset: usize) -> Result<Value> {
    reject_float(a, b, offset)?;
    numeric_binop(a, b, offset, |x, y| x % y, |x, y| x % y, |x, y| x % y)
}

/// `div`: integer division computed as `(x - x%y)/y`.
pub fn int_div(a: &Value, b: &Value, offset: usize) -> Result<Value> {
    reject_float(a, b, offset)?;
    numeric_binop(
        a,
        b,
        offset,
        |x, y| (x - x % y) / y,
        |x, y| (x - x % y) / y,
        |x, y| (x - x % y) / y,
    )
}

fn cmp_values(a: &Value, b: &Value, offset: usize) -> Result<std::cmp::Ordering> {
    if is_string(a) && is_string(b) {
        let (Data::Str(sa), Data::Str(sb)) = (&a.data, &b.data) else {
            unreachable!()
        };
        return Ok(sa.to_rust_string().cmp(&sb.to_rust_string()));
    }
    let (pa, pb) = promote(a, b, offset)?;
    Ok(match (pa, pb) {
        (Promoted::Float(x), Promoted::Float(y)) => {
            x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal)
        }
        (Promoted::Int(x), Promoted::Int(y)) => x.cmp(&y),
        (Promoted::Char(x), Promoted::Char(y)) => x.cmp(&y),
        _ => unreachable!("promote always returns a matched pair"),
    })
}

pub fn lt(a: &Value, b: &Value, offset: usize) -> Result<Value> {
    Ok(Value::bool(cmp_values(a, b, offset)? == std::cmp::Ordering::Less))
}

pub fn gt(a: &Value, b: &Value, offset: usize) -> Result<Value> {
    Ok(Value::bool(cmp_values(a, b, offset)? == std::cmp::Ordering::Greater))
}

pub fn le(a: &Value, b: &Value, offset: usize) -> Result<Value> {
    Ok(Value::bool(cmp_values(a, b, offset)? != std::cmp::Ordering::Greater))
}

pub fn ge(a: &Value, b: &Value, offset: usize) -> Result<Value> {
    Ok(Value::bool(cmp_values(a, b, offset)? != std::cmp::Ordering::Less))
}

pub fn eq(a: &Value, b: &Value, offset: usize) -> Result<Value> {
    Ok(Value::bool(cmp_values(a, b, offset)? == std::cmp::Ordering::Equal))
}

pub fn ne(a: &Value, b: &Value, offset: usize) -> Result<Value> {
    Ok(Value::bool(cmp_values(a, b, offset)? != std::cmp::Ordering::Equal))
}

pub fn logical_and(a: &Value, b: &Value) -> Value {
    Value::bool(a.is_true() && b.is_true())
}

pub fn logical_or(a: &Value, b: &Value) -> Value {
    Value::bool(a.is_true() || b.is_true())
}

pub fn logical_not(a: &Value) -> Value {
    Value::bool(!a.is_true())
}

pub fn unary_neg(a: &Value, offset: usize) -> Result<Value> {
    rank(a, offset)?;
    Ok(match a.data {
        Data::Float(f) => Value::float(-f),
        Data::Int(i) => Value::int(-i),
        Data::Char(c) => return char_result(-(c as i64), offset),
        _ => unreachable!(),
    })
}

pub fn unary_pos(a: &Value, offset: usize) -> Result<Value> {
    rank(a, offset)?;
    Ok(a.clone().as_rvalue())
}

/// Every assignment-family and prefix-increment/decrement result must
/// pass through here: a non-lvalue fails with a custom error.
pub fn require_lvalue(v: Value, offset: usize) -> Result<Value> {
    if v.lvalue {
        Ok(v)
    } else {
        Err(Error::custom("assignment target is not an lvalue").set_pos_if_unset(Position::new(offset)))
    }
}

pub fn binary_op_name(op: BinaryOp) -> &'static str {
    use BinaryOp::*;
    match op {
        Comma => ",",
        Assign => "=",
        AddAssign => "+=",
        SubAssign => "-=",
        MulAssign => "*=",
        DivAssign => "/=",
        ModAssign => "%=",
        Or => "||",
        And => "&&",
        Eq => "==",
        NotEq => "!=",
        Lt => "<",
        Gt => ">",
        LtEq => "<=",
        GtEq => ">=",
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Mod => "%",
        IDiv => "div",
    }
}

/// Numeric single-operand coercions used by assignment into a
/// persistent-typed slot and by for-range bound evaluation. Float to
/// int/char narrowing truncates toward zero.
pub fn numeric_to_i64(v: &Value, offset: usize) -> Result<i64> {
    match v.data {
        Data::Char(c) => Ok(c as i64),
        Data::Int(i) => Ok(i),
        Data::Float(f) => Ok(f.trunc() as i64),
        _ => Err(Error::ty(format!("expected a numeric value, found '{}'", v.data.type_name()))
            .set_pos_if_unset(Position::new(offset))),
    }
}

pub fn numeric_to_f64(v: &Value, offset: usize) -> Result<f64> {
    match v.data {
        Data::Char(c) => Ok(c as u32 as f64),
        Data::Int(i) => Ok(i as f64),
        Data::Float(f) => Ok(f),
        _ => Err(Error::ty(format!("expected a numeric value, found '{}'", v.data.type_name()))
            .set_pos_if_unset(Position::new(offset))),
    }
}

pub fn numeric_to_char(v: &Value, offset: usize) -> Result<char> {
    let code = match v.data {
        Data::Char(c) => return Ok(c),
        Data::Int(i) => i as u32,
        Data::Float(f) => f.trunc() as u32,
        _ => {
            return Err(Error::ty(format!("expected a numeric value, found '{}'", v.data.type_name()))
                .set_pos_if_unset(Position::new(offset)))
        }
    };
    char::from_u32(code)
        .ok_or_else(|| Error::value("value is not a valid character code").set_pos_if_unset(Position::new(offset)))
}

/// A non-negative index for subscripting.
pub fn require_index(v: &Value, offset: usize) -> Result<usize> {
    match v.data {
        Data::Int(i) if i >= 0 => Ok(i as usize),
        Data::Int(_) => Err(Error::value("index must be non-negative").set_pos_if_unset(Position::new(offset))),
        _ => Err(Error::ty("index must be an integer").set_pos_if_unset(Position::new(offset))),
    }
}

/// Pure numeric step used by `++`/`--`: unlike `+`/`-` it never
/// triggers string coercion.
pub fn step(v: &Value, delta: i64, offset: usize) -> Result<Value> {
    rank(v, offset)?;
    Ok(match v.data {
        Data::Float(f) => Value::float(f + delta as f64),
        Data::Int(i) => Value::int(i + delta),
        Data::Char(c) => return char_result(c as i64 + delta, offset),
        _ => unreachable!(),
    })
}

pub fn unary_op_name(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "-",
        UnaryOp::Pos => "+",
        UnaryOp::Not => "!",
        UnaryOp::PreInc => "++",
        UnaryOp::PreDec => "--",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_numeric_promotes_to_float() {
        let v = add(&Value::int(1), &Value::float(2.5), 0).unwrap();
        assert!(matches!(v.data, Data::Float(f) if f == 3.5));
    }

    #[test]
    fn add_with_string_coerces_both_sides() {
        let v = add(&Value::string("val="), &Value::int(5), 0).unwrap();
        assert_eq!(v.display_string(), "val=5");
    }

    #[test]
    fn modulo_rejects_float() {
        assert!(modulo(&Value::float(1.0), &Value::int(2), 0).is_err());
    }

    #[test]
    fn int_div_matches_formula() {
        let v = int_div(&Value::int(7), &Value::int(2), 0).unwrap();
        assert!(matches!(v.data, Data::Int(3)));
    }

    #[test]
    fn string_comparison_is_lexicographic() {
        let v = lt(&Value::string("abc"), &Value::string("abd"), 0).unwrap();
        assert!(v.is_true());
    }
}
