//! Built-in global functions seeded into every context.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::RuntimeError;
use crate::interp::OutputBuffer;
use crate::native::{NativeFunction, ParamSpec};
use crate::object::Object;
use crate::value::Value;

pub(crate) fn seed(output: &Rc<RefCell<OutputBuffer>>) -> IndexMap<String, NativeFunction> {
    let mut builtins = IndexMap::new();

    let out = Rc::clone(output);
    register(
        &mut builtins,
        NativeFunction::variadic("print", move |args| {
            let text = join_args(&args)?;
            out.borrow_mut().write(&text);
            Ok(Value::Null)
        }),
    );

    let out = Rc::clone(output);
    register(
        &mut builtins,
        NativeFunction::variadic("println", move |args| {
            let mut text = join_args(&args)?;
            text.push('\n');
            out.borrow_mut().write(&text);
            Ok(Value::Null)
        }),
    );

    register(
        &mut builtins,
        NativeFunction::new("range", vec![ParamSpec::number()], |args| {
            let count = args[0].as_number()? as i64;
            let values = (0..count).map(|i| Value::Number(i as f32)).collect();
            Ok(Value::Object(Rc::new(Object::array(values))))
        }),
    );

    builtins
}

fn register(builtins: &mut IndexMap<String, NativeFunction>, function: NativeFunction) {
    builtins.insert(function.name().to_string(), function);
}

/// Arguments joined with a single space.
fn join_args(args: &[Value]) -> Result<String, RuntimeError> {
    let parts = args.iter().map(Value::render).collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(" "))
}
