use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// A lexical scope: a name-to-value map plus an optional parent, forming
/// the chain that implements closures and block scoping. Reference-counted
/// and interior-mutable (`spec.md` §9 REDESIGN FLAGS: "shared mutable
/// closure environments") because multiple closures can share the same
/// chain, and a child scope outlives its textual block when captured.
#[derive(Debug)]
pub struct Environment {
    enclosing: Option<Env>,
    values: HashMap<String, Object>,
}

pub type Env = Rc<RefCell<Environment>>;

impl Environment {
    pub fn new(enclosing: Option<Env>) -> Env {
        Rc::new(RefCell::new(Environment { enclosing, values: HashMap::new() }))
    }

    /// Inserts into *this* scope. Redefinition is allowed here; the
    /// resolver is what rejects redeclaration within a single block scope
    /// (`spec.md` §4.3).
    pub fn define(&mut self, name: &str, value: Object) {
        self.values.insert(name.to_string(), value);
    }

    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.values.contains_key(&name.lexeme) {
            self.values.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError::new(name, format!("Undefined variable '{}'", name.lexeme)))
    }

    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError::new(name, format!("Undefined variable '{}'", name.lexeme)))
    }

    fn ancestor(env: &Env, distance: usize) -> Env {
        let mut current = Rc::clone(env);
        for _ in 0..distance {
            let parent = current.borrow().enclosing.clone()
                .unwrap_or_else(|| panic!("resolved distance {distance} has no ancestor at that depth"));
            current = parent;
        }
        current
    }

    /// Reads exactly `distance` scopes up. The resolver guarantees the name
    /// is bound there; absence is a bug in the resolver, not a runtime
    /// condition a Lox program can trigger (`spec.md` §4.3).
    pub fn get_at(env: &Env, distance: usize, name: &str) -> Object {
        let target = Self::ancestor(env, distance);
        let value = target.borrow().values.get(name).cloned();
        value.unwrap_or_else(|| panic!("resolved variable '{name}' missing at depth {distance}"))
    }

    pub fn assign_at(env: &Env, distance: usize, name: &str, value: Object) {
        let target = Self::ancestor(env, distance);
        target.borrow_mut().values.insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Type;

    fn token(name: &str) -> Token {
        Token::new(Type::Identifier, name, None, 1)
    }

    #[test]
    fn define_then_get() {
        let env = Environment::new(None);
        env.borrow_mut().define("a", Object::Number(1.0));
        assert_eq!(env.borrow().get(&token("a")).unwrap(), Object::Number(1.0));
    }

    #[test]
    fn get_falls_through_to_enclosing() {
        let global = Environment::new(None);
        global.borrow_mut().define("a", Object::Number(1.0));
        let block = Environment::new(Some(Rc::clone(&global)));
        assert_eq!(block.borrow().get(&token("a")).unwrap(), Object::Number(1.0));
    }

    #[test]
    fn assign_without_definition_errors() {
        let env = Environment::new(None);
        assert!(env.borrow_mut().assign(&token("missing"), Object::Nil).is_err());
    }

    #[test]
    fn shadowing_a_name_does_not_touch_enclosing() {
        let global = Environment::new(None);
        global.borrow_mut().define("a", Object::Number(1.0));
        let block = Environment::new(Some(Rc::clone(&global)));
        block.borrow_mut().define("a", Object::Number(2.0));
        assert_eq!(block.borrow().get(&token("a")).unwrap(), Object::Number(2.0));
        assert_eq!(global.borrow().get(&token("a")).unwrap(), Object::Number(1.0));
    }

    #[test]
    fn get_at_reads_exact_ancestor() {
        let global = Environment::new(None);
        global.borrow_mut().define("a", Object::Number(1.0));
        let middle = Environment::new(Some(Rc::clone(&global)));
        let inner = Environment::new(Some(Rc::clone(&middle)));
        assert_eq!(Environment::get_at(&inner, 2, "a"), Object::Number(1.0));
    }

    #[test]
    fn assign_at_mutates_the_exact_ancestor() {
        let global = Environment::new(None);
        global.borrow_mut().define("a", Object::Number(1.0));
        let inner = Environment::new(Some(Rc::clone(&global)));
        Environment::assign_at(&inner, 1, "a", Object::Number(9.0));
        assert_eq!(global.borrow().get(&token("a")).unwrap(), Object::Number(9.0));
    }
}
