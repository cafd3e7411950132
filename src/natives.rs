//! Built‑in functions registered into the global scope before any user code
//! runs.

use std::rc::Rc;

use chrono::Utc;
use log::debug;

use crate::callable::{Callable, NativeFunction};
use crate::environment::Environment;
use crate::value::Value;

/// Seconds since the Unix epoch, with sub‑second precision.
fn clock(_args: &[Value]) -> Result<Value, String> {
    let micros: i64 = Utc::now().timestamp_micros();

    Ok(Value::Number(micros as f64 / 1_000_000.0))
}

const NATIVES: &[NativeFunction] = &[NativeFunction {
    name: "clock",
    arity: 0,
    func: clock,
}];

/// Define every native in `globals`.
pub fn register(globals: &mut Environment) {
    for native in NATIVES {
        debug!("Defining native function '{}'", native.name);

        globals.define(
            native.name,
            Value::Callable(Callable::Native(Rc::new(NativeFunction {
                name: native.name,
                arity: native.arity,
                func: native.func,
            }))),
        );
    }
}
