use std::mem;

use crate::value::Value;

/// Receives the value a child converter produced for its parent.
///
/// The typed setters exist so leaf converters can hand over unboxed values;
/// by default they box into [`ContainerUpdater::set`].
pub trait ContainerUpdater {
    fn start(&mut self) {}

    fn end(&mut self) {}

    fn set(&mut self, value: Value);

    fn set_boolean(&mut self, value: bool) {
        self.set(Value::Boolean(value))
    }

    fn set_byte(&mut self, value: i8) {
        self.set(Value::Integer(value as i64))
    }

    fn set_short(&mut self, value: i16) {
        self.set(Value::Integer(value as i64))
    }

    fn set_int(&mut self, value: i32) {
        self.set(Value::Integer(value as i64))
    }

    fn set_long(&mut self, value: i64) {
        self.set(Value::Integer(value))
    }

    fn set_float(&mut self, value: f32) {
        self.set(Value::float(value as f64))
    }

    fn set_double(&mut self, value: f64) {
        self.set(Value::float(value))
    }
}

/// Outbox a converter writes its result into; the parent drains it with [`Updater::take`].
#[derive(Debug, Clone, PartialEq)]
pub enum Updater {
    /// Root of the tree; values are discarded
    Noop,
    /// A single field cell
    Slot(Value),
    /// Accumulates every occurrence of a repeated field
    Array(Vec<Value>),
}

impl Updater {
    pub fn slot() -> Self {
        Updater::Slot(Value::Nil)
    }

    pub fn array() -> Self {
        Updater::Array(Vec::new())
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Updater::Noop)
    }

    /// Move the collected value out, leaving the updater in its started state
    pub fn take(&mut self) -> Value {
        match self {
            Updater::Noop => Value::Nil,
            Updater::Slot(value) => mem::take(value),
            Updater::Array(items) => Value::Array(mem::take(items)),
        }
    }
}

impl ContainerUpdater for Updater {
    fn start(&mut self) {
        match self {
            Updater::Noop => {}
            Updater::Slot(value) => *value = Value::Nil,
            Updater::Array(items) => items.clear(),
        }
    }

    fn set(&mut self, value: Value) {
        match self {
            Updater::Noop => {}
            Updater::Slot(slot) => *slot = value,
            Updater::Array(items) => items.push(value),
        }
    }
}
