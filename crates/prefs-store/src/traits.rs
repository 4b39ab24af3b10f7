use crate::error::{StoreError, StoreResult};
use crate::value::Value;

/// Synchronous durable key/value medium holding strings and integers.
///
/// All implementations must satisfy these invariants:
/// - `set` replaces the whole value for a name atomically; a concurrent
///   `get` observes either the old or the new value, never a torn one.
/// - Every successful `set` is durable from the caller's perspective; there
///   is no flush step exposed upward.
/// - Independent names may be accessed concurrently.
/// - A `get` followed by a `set` is NOT atomic. Callers that need
///   read-modify-write must serialize it themselves.
/// - All I/O errors are propagated, never silently ignored.
pub trait DurableStore: Send + Sync {
    /// Read the value stored under `name`, or `Ok(None)` if absent.
    fn get(&self, name: &str) -> StoreResult<Option<Value>>;

    /// Store `value` under `name`, replacing any previous value.
    fn set(&self, name: &str, value: Value) -> StoreResult<()>;

    /// Check whether a value is stored under `name`.
    fn contains(&self, name: &str) -> StoreResult<bool> {
        Ok(self.get(name)?.is_some())
    }

    /// Read a string, falling back to `default` when absent.
    fn get_string(&self, name: &str, default: &str) -> StoreResult<String> {
        match self.get(name)? {
            None => Ok(default.to_string()),
            Some(Value::Str(s)) => Ok(s),
            Some(other) => Err(StoreError::TypeMismatch {
                name: name.to_string(),
                expected: "string",
                found: other.kind_name(),
            }),
        }
    }

    /// Store a string under `name`.
    fn set_string(&self, name: &str, value: &str) -> StoreResult<()> {
        self.set(name, Value::from(value))
    }

    /// Read an integer, falling back to `default` when absent.
    fn get_int(&self, name: &str, default: i32) -> StoreResult<i32> {
        match self.get(name)? {
            None => Ok(default),
            Some(Value::Int(v)) => Ok(v),
            Some(other) => Err(StoreError::TypeMismatch {
                name: name.to_string(),
                expected: "int",
                found: other.kind_name(),
            }),
        }
    }

    /// Store an integer under `name`.
    fn set_int(&self, name: &str, value: i32) -> StoreResult<()> {
        self.set(name, Value::Int(value))
    }
}

impl<T: DurableStore + ?Sized> DurableStore for std::sync::Arc<T> {
    fn get(&self, name: &str) -> StoreResult<Option<Value>> {
        (**self).get(name)
    }

    fn set(&self, name: &str, value: Value) -> StoreResult<()> {
        (**self).set(name, value)
    }

    fn contains(&self, name: &str) -> StoreResult<bool> {
        (**self).contains(name)
    }
}
