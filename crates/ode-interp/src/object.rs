// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The object and collection model.
//!
//! Scripts cannot define object types. Objects come from two places: the
//! built-in collections (arrays and dictionaries, created by literals), and
//! host injection. All of them present the same capability surface — named
//! callable methods plus a mandatory `to_string` — and dispatch is always
//! by method name, never by inspecting the host-language type.

use std::cell::RefCell;
use std::fmt;

use indexmap::IndexMap;

use crate::error::RuntimeError;
use crate::native::NativeFunction;
use crate::value::Value;

/// An object with a name and a callable method surface.
pub struct Object {
    name: String,
    kind: ObjectKind,
}

/// Built-in collection kinds are a closed variant; everything else is a
/// host-supplied method table.
enum ObjectKind {
    Array(RefCell<Vec<Value>>),
    Dictionary(RefCell<IndexMap<String, Value>>),
    Host(IndexMap<String, NativeFunction>),
}

impl Object {
    /// A built-in array.
    pub fn array(values: Vec<Value>) -> Self {
        Self {
            name: "array".to_string(),
            kind: ObjectKind::Array(RefCell::new(values)),
        }
    }

    /// A built-in dictionary. Keys are already stringified.
    pub fn dictionary(pairs: Vec<(String, Value)>) -> Self {
        Self {
            name: "dictionary".to_string(),
            kind: ObjectKind::Dictionary(RefCell::new(pairs.into_iter().collect())),
        }
    }

    /// A host object: named methods plus the mandatory stringifier.
    pub fn host(
        name: impl Into<String>,
        functions: Vec<NativeFunction>,
        to_string: impl Fn() -> String + 'static,
    ) -> Self {
        let mut methods: IndexMap<String, NativeFunction> = functions
            .into_iter()
            .map(|f| (f.name().to_string(), f))
            .collect();
        methods.insert(
            "to_string".to_string(),
            NativeFunction::new("to_string", vec![], move |_| Ok(Value::Str(to_string()))),
        );
        Self {
            name: name.into(),
            kind: ObjectKind::Host(methods),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collections support `for` iteration and index sugar.
    pub fn is_collection(&self) -> bool {
        !matches!(self.kind, ObjectKind::Host(_))
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self.kind, ObjectKind::Dictionary(_))
    }

    /// Element count, for collections.
    pub fn length(&self) -> Option<usize> {
        match &self.kind {
            ObjectKind::Array(items) => Some(items.borrow().len()),
            ObjectKind::Dictionary(map) => Some(map.borrow().len()),
            ObjectKind::Host(_) => None,
        }
    }

    /// The iteration element at `index`: array element, or dictionary key.
    pub fn get_at_index(&self, index: usize) -> Option<Value> {
        match &self.kind {
            ObjectKind::Array(items) => items.borrow().get(index).cloned(),
            ObjectKind::Dictionary(map) => map
                .borrow()
                .get_index(index)
                .map(|(key, _)| Value::Str(key.clone())),
            ObjectKind::Host(_) => None,
        }
    }

    /// The mandatory stringifier.
    pub fn render(&self) -> Result<String, RuntimeError> {
        self.call_method("to_string", Vec::new())?.render()
    }

    /// Dispatch a method call by name.
    pub fn call_method(&self, method: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match &self.kind {
            ObjectKind::Array(items) => self.array_method(items, method, args),
            ObjectKind::Dictionary(map) => self.dictionary_method(map, method, args),
            ObjectKind::Host(methods) => match methods.get(method) {
                Some(function) => function.call(args),
                None => Err(self.no_such_method(method)),
            },
        }
    }

    fn array_method(
        &self,
        items: &RefCell<Vec<Value>>,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match method {
            // append is variadic
            "append" => {
                items.borrow_mut().extend(args);
                Ok(Value::Null)
            }
            "get" => {
                self.check_arity(method, 1, &args)?;
                let items = items.borrow();
                let i = array_index(&args[0], items.len(), false)?;
                Ok(items[i].clone())
            }
            "set" => {
                self.check_arity(method, 2, &args)?;
                let mut items = items.borrow_mut();
                let i = array_index(&args[0], items.len(), false)?;
                items[i] = args[1].clone();
                Ok(Value::Null)
            }
            "insert" => {
                self.check_arity(method, 2, &args)?;
                let mut items = items.borrow_mut();
                let i = array_index(&args[0], items.len(), true)?;
                items.insert(i, args[1].clone());
                Ok(Value::Null)
            }
            "remove_at" => {
                self.check_arity(method, 1, &args)?;
                let mut items = items.borrow_mut();
                let i = array_index(&args[0], items.len(), false)?;
                items.remove(i);
                Ok(Value::Null)
            }
            "clear" => {
                self.check_arity(method, 0, &args)?;
                items.borrow_mut().clear();
                Ok(Value::Null)
            }
            "length" => {
                self.check_arity(method, 0, &args)?;
                Ok(Value::Number(items.borrow().len() as f32))
            }
            "to_string" => {
                self.check_arity(method, 0, &args)?;
                let snapshot = items.borrow().clone();
                let parts = snapshot
                    .iter()
                    .map(Value::render)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Str(format!("[{}]", parts.join(","))))
            }
            _ => Err(self.no_such_method(method)),
        }
    }

    fn dictionary_method(
        &self,
        map: &RefCell<IndexMap<String, Value>>,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match method {
            "put" => {
                self.check_arity(method, 2, &args)?;
                let key = args[0].render()?;
                map.borrow_mut().insert(key, args[1].clone());
                Ok(Value::Null)
            }
            "get" => {
                self.check_arity(method, 1, &args)?;
                let key = args[0].render()?;
                Ok(map.borrow().get(&key).cloned().unwrap_or(Value::Null))
            }
            "clear" => {
                self.check_arity(method, 0, &args)?;
                map.borrow_mut().clear();
                Ok(Value::Null)
            }
            "length" => {
                self.check_arity(method, 0, &args)?;
                Ok(Value::Number(map.borrow().len() as f32))
            }
            "to_string" => {
                self.check_arity(method, 0, &args)?;
                let snapshot: Vec<(String, Value)> = map
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                let mut parts = Vec::with_capacity(snapshot.len());
                for (key, value) in &snapshot {
                    parts.push(format!("{}:{}", key, value.render()?));
                }
                Ok(Value::Str(format!("{{{}}}", parts.join(","))))
            }
            _ => Err(self.no_such_method(method)),
        }
    }

    fn check_arity(&self, method: &str, expected: usize, args: &[Value]) -> Result<(), RuntimeError> {
        if args.len() != expected {
            return Err(RuntimeError::ArityMismatch {
                name: method.to_string(),
                expected,
                got: args.len(),
            });
        }
        Ok(())
    }

    fn no_such_method(&self, method: &str) -> RuntimeError {
        RuntimeError::NoSuchMethod {
            object: self.name.clone(),
            method: method.to_string(),
        }
    }
}

/// Coerce a value to an array index and bounds-check it. `allow_end`
/// permits `index == len` (for `insert`).
fn array_index(value: &Value, len: usize, allow_end: bool) -> Result<usize, RuntimeError> {
    let index = value.as_number()? as i64;
    let limit = if allow_end { len as i64 } else { len as i64 - 1 };
    if index < 0 || index > limit {
        return Err(RuntimeError::IndexOutOfBounds { index, len });
    }
    Ok(index as usize)
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<object {}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f32) -> Value {
        Value::Number(n)
    }

    #[test]
    fn array_surface() {
        let arr = Object::array(vec![num(1.0), num(2.0), num(3.0)]);
        arr.call_method("append", vec![num(4.0)]).unwrap();
        assert_eq!(arr.render().unwrap(), "[1,2,3,4]");

        let got = arr.call_method("get", vec![num(1.0)]).unwrap();
        assert!(matches!(got, Value::Number(n) if n == 2.0));

        arr.call_method("set", vec![num(0.0), num(9.0)]).unwrap();
        arr.call_method("insert", vec![num(1.0), num(5.0)]).unwrap();
        arr.call_method("remove_at", vec![num(4.0)]).unwrap();
        assert_eq!(arr.render().unwrap(), "[9,5,2,3]");

        let len = arr.call_method("length", vec![]).unwrap();
        assert!(matches!(len, Value::Number(n) if n == 4.0));

        arr.call_method("clear", vec![]).unwrap();
        assert_eq!(arr.render().unwrap(), "[]");
    }

    #[test]
    fn append_is_variadic() {
        let arr = Object::array(vec![]);
        arr.call_method("append", vec![num(1.0), num(2.0), num(3.0)]).unwrap();
        assert_eq!(arr.render().unwrap(), "[1,2,3]");
    }

    #[test]
    fn array_bounds_are_checked() {
        let arr = Object::array(vec![num(1.0)]);
        let err = arr.call_method("get", vec![num(3.0)]).unwrap_err();
        assert!(matches!(err, RuntimeError::IndexOutOfBounds { index: 3, len: 1 }));
        let err = arr.call_method("get", vec![num(-1.0)]).unwrap_err();
        assert!(matches!(err, RuntimeError::IndexOutOfBounds { index: -1, .. }));
    }

    #[test]
    fn dictionary_surface() {
        let dict = Object::dictionary(vec![("a".into(), num(1.0))]);
        dict.call_method("put", vec![Value::Str("b".into()), num(2.0)]).unwrap();
        assert_eq!(dict.render().unwrap(), "{a:1,b:2}");

        let got = dict.call_method("get", vec![Value::Str("a".into())]).unwrap();
        assert!(matches!(got, Value::Number(n) if n == 1.0));

        // Missing keys yield null, not an error.
        let missing = dict.call_method("get", vec![Value::Str("zzz".into())]).unwrap();
        assert!(matches!(missing, Value::Null));
    }

    #[test]
    fn dictionary_keys_are_stringified() {
        let dict = Object::dictionary(vec![]);
        dict.call_method("put", vec![num(1.0), Value::Str("one".into())]).unwrap();
        let got = dict.call_method("get", vec![Value::Str("1".into())]).unwrap();
        assert!(matches!(got, Value::Str(s) if s == "one"));
    }

    #[test]
    fn dictionary_iterates_keys_in_insertion_order() {
        let dict = Object::dictionary(vec![("b".into(), num(1.0)), ("a".into(), num(2.0))]);
        assert_eq!(dict.length(), Some(2));
        assert!(matches!(dict.get_at_index(0), Some(Value::Str(s)) if s == "b"));
        assert!(matches!(dict.get_at_index(1), Some(Value::Str(s)) if s == "a"));
    }

    #[test]
    fn unknown_method_names_the_object() {
        let arr = Object::array(vec![]);
        let err = arr.call_method("shuffle", vec![]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::NoSuchMethod { object, method } if object == "array" && method == "shuffle"
        ));
    }

    #[test]
    fn host_objects_dispatch_through_their_table() {
        let obj = Object::host(
            "greeter",
            vec![NativeFunction::new("greet", vec![], |_| {
                Ok(Value::Str("hello".into()))
            })],
            || "a greeter".to_string(),
        );
        assert!(!obj.is_collection());
        let got = obj.call_method("greet", vec![]).unwrap();
        assert!(matches!(got, Value::Str(s) if s == "hello"));
        assert_eq!(obj.render().unwrap(), "a greeter");
    }
}
