use std::collections::HashMap;
use std::rc::Rc;

use crate::function::Function;
use crate::object::{Fields, Object};
use crate::token::Token;

/// A class value. Holds its own method table plus, when it inherits, a
/// reference to its superclass so lookups can walk the chain (`spec.md`
/// §4.6, §7).
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    pub methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn new(name: String, superclass: Option<Rc<Class>>, methods: HashMap<String, Rc<Function>>) -> Self {
        Class { name, superclass, methods }
    }

    /// Looks up a method by name, falling back to the superclass chain.
    /// Used both for instance method lookup and for `super.method()`
    /// resolution.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }

        self.superclass.as_ref().and_then(|sup| sup.find_method(name))
    }

    /// The arity a `Class` callable presents to the interpreter: the
    /// arity of its `init` method, or zero if it declares none
    /// (`spec.md` §4.6: instantiating a class with no initializer takes
    /// no arguments).
    pub fn initializer_arity(&self) -> usize {
        self.find_method("init").map(|init| init.params.len()).unwrap_or(0)
    }
}

/// An instance of a class: its class pointer plus a mutable field table.
/// Fields are created on first assignment (`spec.md` §4.6) rather than
/// declared up front.
#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    fields: Fields,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance { class, fields: HashMap::new() }
    }

    /// Reads a field first, then falls back to a method looked up on the
    /// class and bound to this instance. A class whose field and method
    /// share a name makes the field win, matching the order the source
    /// checks them in.
    pub fn get(&self, name: &Token, instance_rc: &std::rc::Rc<std::cell::RefCell<Instance>>) -> Option<Object> {
        if let Some(value) = self.fields.get(&name.lexeme) {
            return Some(value.clone());
        }

        self.class.find_method(&name.lexeme).map(|method| {
            Object::Callable(crate::object::Callable::BoundMethod(method, Rc::clone(instance_rc)))
        })
    }

    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_method(name: &str, is_initializer: bool) -> Rc<Function> {
        use crate::environment::Environment;
        use crate::token::Type;
        Rc::new(Function::new(
            Token::new(Type::Identifier, name, None, 1),
            Vec::new(),
            Rc::new(Vec::new()),
            Environment::new(None),
            is_initializer,
        ))
    }

    #[test]
    fn find_method_walks_superclass_chain() {
        let mut base_methods = HashMap::new();
        base_methods.insert("greet".to_string(), make_method("greet", false));
        let base = Rc::new(Class::new("Base".to_string(), None, base_methods));

        let child = Class::new("Child".to_string(), Some(Rc::clone(&base)), HashMap::new());
        assert!(child.find_method("greet").is_some());
        assert!(child.find_method("missing").is_none());
    }

    #[test]
    fn initializer_arity_defaults_to_zero_without_init() {
        let class = Class::new("Plain".to_string(), None, HashMap::new());
        assert_eq!(class.initializer_arity(), 0);
    }
}
