//! A single declared argument and its multi-typed value cell.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to one of an argument's value slots.
///
/// Obtain it before parsing; read it afterwards. Every handle returned for
/// the same slot points at the same cell, so values written by the parser
/// are visible through all of them.
pub struct Slot<T>(Rc<RefCell<T>>);

impl<T> Slot<T> {
    fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    /// Run `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow())
    }

    /// Whether two handles refer to the same slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> Slot<T> {
    /// Current value of the slot.
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&*self.0.borrow()).finish()
    }
}

/// Classification of the last raw value applied to an argument.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Nothing applied yet.
    #[default]
    Unset,
    /// Neither an integer nor a boolean literal.
    Str(String),
    /// A base-10 integer (also stored in the string slot).
    Int(i64),
    /// Exactly `true` or `false`.
    Bool(bool),
}

/// A registered argument.
///
/// Created by [`Parser::register`](crate::Parser::register), configured
/// through the chainable setters and read through the slot handles.
#[derive(Debug)]
pub struct Argument {
    long_key: String,
    short_key: char,
    help: String,
    required: bool,
    value: Value,
    string_value: Slot<String>,
    int_value: Slot<i64>,
    bool_value: Slot<bool>,
}

impl Argument {
    pub(crate) fn new(long_key: &str, short_key: char, help: &str) -> Self {
        Self {
            long_key: long_key.to_string(),
            short_key,
            help: help.to_string(),
            required: false,
            value: Value::Unset,
            string_value: Slot::new(String::new()),
            int_value: Slot::new(0),
            bool_value: Slot::new(false),
        }
    }

    /// Handle to the string slot.
    pub fn as_string(&self) -> Slot<String> {
        self.string_value.clone()
    }

    /// Handle to the integer slot.
    pub fn as_int(&self) -> Slot<i64> {
        self.int_value.clone()
    }

    /// Handle to the boolean slot.
    pub fn as_bool(&self) -> Slot<bool> {
        self.bool_value.clone()
    }

    /// Replace the help text.
    pub fn help(&mut self, text: &str) -> &mut Self {
        self.help = text.to_string();
        self
    }

    /// Mark the argument as required.
    pub fn required(&mut self) -> &mut Self {
        self.required = true;
        self
    }

    /// Apply `raw` right away, as if it had been passed on the command line.
    pub fn default_value(&mut self, raw: &str) -> &mut Self {
        self.apply_raw_value(raw);
        self
    }

    pub fn long_key(&self) -> &str {
        &self.long_key
    }

    pub fn short_key(&self) -> char {
        self.short_key
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Typed view of the last applied value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn string_value(&self) -> String {
        self.string_value.get()
    }

    pub fn int_value(&self) -> i64 {
        self.int_value.get()
    }

    pub fn bool_value(&self) -> bool {
        self.bool_value.get()
    }

    /// Display form used in messages: `--long` if present, `-s` otherwise.
    pub fn display_name(&self) -> String {
        if self.long_key.is_empty() {
            format!("-{}", self.short_key)
        } else {
            format!("--{}", self.long_key)
        }
    }

    /// Store `raw` into every slot it fits.
    ///
    /// An integer lands in the integer slot and, because it is not a boolean
    /// literal, in the string slot too. A boolean literal lands only in the
    /// boolean slot. Anything else lands only in the string slot.
    pub(crate) fn apply_raw_value(&mut self, raw: &str) {
        let int = raw.parse::<i64>().ok();
        if let Some(n) = int {
            self.int_value.set(n);
        }

        if let Some(b) = parse_bool(raw) {
            self.bool_value.set(b);
            self.value = Value::Bool(b);
            return;
        }

        self.string_value.set(raw.to_string());
        self.value = match int {
            Some(n) => Value::Int(n),
            None => Value::Str(raw.to_string()),
        };
    }
}

/// Boolean literals: `true` and `false`, case-sensitive.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
