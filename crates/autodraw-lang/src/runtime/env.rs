//! Variable table. Bindings are value copies: re-binding a source name never
//! changes a name that was assigned from it.

use std::collections::HashMap;

use crate::error::ValueError;
use crate::types::mat::Matrix;
use crate::Value;

#[derive(Debug, Clone, Default)]
pub struct VarTable {
    vars: HashMap<String, Value>,
}

impl VarTable {
    pub fn new() -> Self { Self::default() }

    /// Bind `name`. A `VariableRef` is resolved first and the resolved value is
    /// copied in.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), ValueError> {
        let resolved = match value {
            Value::VariableRef(src) => self.vars.get(&src).cloned()
                .ok_or(ValueError::UndefinedVariable(src))?,
            v if v.is_bindable() => v,
            other => return Err(ValueError::InvalidValue(other.to_string())),
        };
        self.vars.insert(name.to_string(), resolved);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize { self.vars.len() }

    pub fn is_empty(&self) -> bool { self.vars.is_empty() }

    /// Bindings sorted by name.
    pub fn iter_sorted(&self) -> Vec<(&str, &Value)> {
        let mut all: Vec<_> = self.vars.iter().map(|(k, v)| (k.as_str(), v)).collect();
        all.sort_by(|l, r| l.0.cmp(r.0));
        all
    }

    // ─── Typed resolution ────────────────────────────────────────────────────

    pub fn resolve_number(&self, arg: &Value) -> Result<i16, ValueError> {
        match arg {
            Value::Number(n) => Ok(*n),
            Value::VariableRef(name) => match self.vars.get(name) {
                Some(Value::Number(n)) => Ok(*n),
                Some(_) => Err(ValueError::NotInteger(name.clone())),
                None => Err(ValueError::UndefinedVariable(name.clone())),
            },
            other => Err(ValueError::InvalidValue(other.to_string())),
        }
    }

    /// Every operand must be a number or name a number.
    pub fn resolve_numbers(&self, args: &[Value]) -> Result<Vec<i16>, ValueError> {
        args.iter().map(|a| self.resolve_number(a)).collect()
    }

    pub fn resolve_text(&self, arg: &Value) -> Result<String, ValueError> {
        match arg {
            Value::Text(s) => Ok(s.clone()),
            Value::VariableRef(name) => match self.vars.get(name) {
                Some(Value::Text(s)) => Ok(s.clone()),
                Some(_) => Err(ValueError::NotText(name.clone())),
                None => Err(ValueError::UndefinedVariable(name.clone())),
            },
            other => Err(ValueError::InvalidValue(other.to_string())),
        }
    }

    /// Look up `name`, which must be bound to a transform.
    pub fn transform(&self, name: &str) -> Result<Matrix, ValueError> {
        match self.vars.get(name) {
            Some(Value::Transform(m)) => Ok(*m),
            Some(_) => Err(ValueError::NotTransform(name.to_string())),
            None => Err(ValueError::UndefinedVariable(name.to_string())),
        }
    }
}
