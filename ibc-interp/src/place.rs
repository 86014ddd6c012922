use ibc_util::{Error, Position, Result};

use crate::scope::{Scope, ScopeKey};
use crate::value::{Data, Value};

/// A resolved assignment target: either a direct scope binding or an
/// index one or more levels into a container reachable from one. This
/// is the "handle to a binding slot" the lvalue/rvalue distinction
/// needs, built once per assignment rather than threaded through as a
/// borrow.
#[derive(Debug, Clone)]
pub enum Place {
    Var(ScopeKey),
    Index(Box<Place>, usize),
}

fn index_into(v: &mut Value, idx: usize, offset: usize) -> Result<&mut Value> {
    let elements = match &mut v.data {
        Data::Array(a) => &mut a.elements,
        Data::Str(s) => &mut s.elements,
        _ => {
            return Err(Error::ty(format!("'{}' is not subscriptable", v.data.type_name()))
                .set_pos_if_unset(Position::new(offset)))
        }
    };
    elements
        .get_mut(idx)
        .ok_or_else(|| Error::range(format!("index {idx} out of bounds")).set_pos_if_unset(Position::new(offset)))
}

fn index_ref(v: &Value, idx: usize, offset: usize) -> Result<&Value> {
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
        .ok_or_else(|| Error::range(format!("index {idx} out of bounds")).set_pos_if_unset(Position::new(offset)))
}

pub fn resolve_mut<'a>(scope: &'a mut Scope, place: &Place, offset: usize) -> Result<&'a mut Value> {
    match place {
        Place::Var(key) => scope
            .get_mut(key)
            .ok_or_else(|| Error::fatal("scope binding vanished").set_pos_if_unset(Position::new(offset))),
        Place::Index(base, idx) => {
            let base_val = resolve_mut(scope, base, offset)?;
            index_into(base_val, *idx, offset)
        }
    }
}

pub fn resolve_ref<'a>(scope: &'a Scope, place: &Place, offset: usize) -> Result<&'a Value> {
    match place {
        Place::Var(key) => scope
            .get(key)
            .ok_or_else(|| Error::fatal("scope binding vanished").set_pos_if_unset(Position::new(offset))),
        Place::Index(base, idx) => {
            let base_val = resolve_ref(scope, base, offset)?;
            index_ref(base_val, *idx, offset)
        }
    }
}
