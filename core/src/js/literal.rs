//! Per-run literal pool. String literals are interned so repeated constants
//! share one allocation in the output tree.

use std::collections::HashMap;
use std::rc::Rc;

use super::ast::{JsLiteral, JsNumber};

#[derive(Debug, Default, Clone)]
pub struct LiteralPool {
    strings: HashMap<String, Rc<str>>,
    requests: usize,
}

impl LiteralPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(&mut self, value: &str) -> JsLiteral {
        self.requests += 1;
        if let Some(interned) = self.strings.get(value) {
            return JsLiteral::String(Rc::clone(interned));
        }
        let interned: Rc<str> = Rc::from(value);
        self.strings.insert(value.to_string(), Rc::clone(&interned));
        JsLiteral::String(interned)
    }

    pub fn int(&mut self, value: i32) -> JsLiteral {
        self.requests += 1;
        JsLiteral::Number(JsNumber::Int(value))
    }

    pub fn double(&mut self, value: f64) -> JsLiteral {
        self.requests += 1;
        JsLiteral::Number(JsNumber::Double(value))
    }

    pub fn bool(&mut self, value: bool) -> JsLiteral {
        self.requests += 1;
        JsLiteral::Bool(value)
    }

    pub fn null(&mut self) -> JsLiteral {
        self.requests += 1;
        JsLiteral::Null
    }

    /// Distinct interned strings.
    pub fn unique_strings(&self) -> usize {
        self.strings.len()
    }

    pub fn requests(&self) -> usize {
        self.requests
    }
}
