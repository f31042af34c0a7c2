//! Host object capability interface
//!
//! Anything a script can address through a dotted path implements
//! [`Scriptable`]. The helpers in this module walk the remaining segments
//! of a chain, delegating from object to child object.

use crate::error::HostError;
use crate::lang::ast::IdentChain;
use crate::value::Value;
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared reference to a host object
pub type ObjectHandle = Arc<Mutex<dyn Scriptable + Send>>;

/// Wrap a host object into a handle
pub fn handle<T: Scriptable + Send + 'static>(object: T) -> ObjectHandle {
    Arc::new(Mutex::new(object))
}

/// Lets a command suspend the interpreter on the object it ran on
pub struct Wait<'a> {
    target: &'a ObjectHandle,
    slot: &'a mut Option<ObjectHandle>,
}

impl<'a> Wait<'a> {
    pub(crate) fn new(target: &'a ObjectHandle, slot: &'a mut Option<ObjectHandle>) -> Self {
        Self { target, slot }
    }

    /// Suspend the running script until this object stops being busy
    pub fn until_idle(&mut self) {
        *self.slot = Some(Arc::clone(self.target));
    }
}

/// An object scripts can read, write and command
///
/// Every operation defaults to a lookup failure naming what was asked
/// for, so implementors only cover the names they expose.
pub trait Scriptable {
    /// Short name used in diagnostics
    fn type_name(&self) -> &'static str;

    /// Child object for further chain delegation
    fn get_object(&self, name: &str) -> Result<ObjectHandle, HostError> {
        Err(HostError::lookup(name))
    }

    fn get_var(&self, name: &str) -> Result<Value, HostError> {
        Err(HostError::lookup(name))
    }

    fn set_var(&mut self, name: &str, _value: Value) -> Result<(), HostError> {
        Err(HostError::lookup(name))
    }

    /// Invoke a command exposed by this object
    fn call(&mut self, name: &str, _args: &[Value], _wait: &mut Wait<'_>) -> Result<Value, HostError> {
        Err(HostError::lookup(name))
    }

    /// Whether a blocking action is still in progress
    fn is_busy(&self) -> bool {
        false
    }
}

/// Child of `object` named by the head of `chain`
fn child(object: &ObjectHandle, chain: &IdentChain) -> Result<ObjectHandle, HostError> {
    object.lock().get_object(chain.name())
}

/// Read the variable `chain` names, relative to `object`
pub fn resolve_var(object: &ObjectHandle, chain: &IdentChain) -> Result<Value, HostError> {
    match chain.next() {
        Some(rest) => resolve_var(&child(object, chain)?, rest),
        None => object.lock().get_var(chain.name()),
    }
}

/// Write the variable `chain` names, relative to `object`
pub fn assign_var(object: &ObjectHandle, chain: &IdentChain, value: Value) -> Result<(), HostError> {
    match chain.next() {
        Some(rest) => assign_var(&child(object, chain)?, rest, value),
        None => object.lock().set_var(chain.name(), value),
    }
}

/// Invoke the command `chain` names, relative to `object`
///
/// `slot` receives the object to wait on if the command suspends.
pub fn invoke(
    object: &ObjectHandle,
    chain: &IdentChain,
    args: &[Value],
    slot: &mut Option<ObjectHandle>,
) -> Result<Value, HostError> {
    match chain.next() {
        Some(rest) => invoke(&child(object, chain)?, rest, args, slot),
        None => {
            let mut wait = Wait::new(object, slot);
            object.lock().call(chain.name(), args, &mut wait)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Origin;
    use std::collections::HashMap;

    struct Chest {
        items: HashMap<String, Value>,
        lid: ObjectHandle,
    }

    struct Lid {
        open: bool,
    }

    impl Scriptable for Lid {
        fn type_name(&self) -> &'static str {
            "lid"
        }

        fn get_var(&self, name: &str) -> Result<Value, HostError> {
            match name {
                "open" => Ok(Value::Bool(self.open)),
                _ => Err(HostError::lookup(name)),
            }
        }

        fn call(&mut self, name: &str, _args: &[Value], wait: &mut Wait<'_>) -> Result<Value, HostError> {
            match name {
                "swing" => {
                    self.open = !self.open;
                    wait.until_idle();
                    Ok(Value::None)
                }
                _ => Err(HostError::lookup(name)),
            }
        }
    }

    impl Scriptable for Chest {
        fn type_name(&self) -> &'static str {
            "chest"
        }

        fn get_object(&self, name: &str) -> Result<ObjectHandle, HostError> {
            match name {
                "lid" => Ok(Arc::clone(&self.lid)),
                _ => Err(HostError::lookup(name)),
            }
        }

        fn get_var(&self, name: &str) -> Result<Value, HostError> {
            self.items.get(name).cloned().ok_or_else(|| HostError::lookup(name))
        }

        fn set_var(&mut self, name: &str, value: Value) -> Result<(), HostError> {
            self.items.insert(name.to_string(), value);
            Ok(())
        }
    }

    fn chain(path: &str) -> IdentChain {
        IdentChain::from_path(path, 1, Arc::new(Origin::inline("test")))
    }

    fn chest() -> ObjectHandle {
        handle(Chest {
            items: HashMap::new(),
            lid: handle(Lid { open: false }),
        })
    }

    #[test]
    fn test_assign_and_resolve() {
        let chest = chest();
        assign_var(&chest, &chain("gold"), Value::from(10)).unwrap();
        assert_eq!(resolve_var(&chest, &chain("gold")).unwrap(), Value::from(10));
        assert_eq!(resolve_var(&chest, &chain("lid.open")).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_missing_child_names_the_segment() {
        let chest = chest();
        assert_eq!(
            resolve_var(&chest, &chain("hinge.open")).unwrap_err(),
            HostError::lookup("hinge")
        );
        assert_eq!(
            resolve_var(&chest, &chain("lid.colour")).unwrap_err(),
            HostError::lookup("colour")
        );
    }

    #[test]
    fn test_invoke_sets_wait_target() {
        let chest = chest();
        let mut slot = None;
        invoke(&chest, &chain("lid.swing"), &[], &mut slot).unwrap();

        let target = slot.expect("command should wait");
        assert_eq!(target.lock().type_name(), "lid");
        assert_eq!(resolve_var(&chest, &chain("lid.open")).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_default_call_is_lookup_failure() {
        let chest = chest();
        let mut slot = None;
        assert_eq!(
            invoke(&chest, &chain("open"), &[], &mut slot).unwrap_err(),
            HostError::lookup("open")
        );
        assert!(slot.is_none());
    }
}
