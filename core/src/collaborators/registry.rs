use std::any::Any;
use std::collections::BTreeMap;

pub type Constructor = fn() -> Box<dyn Any + Send>;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("no type registered under '{0}'")]
pub struct TypeNotFound(pub String);

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("type '{0}' is already registered")]
pub struct DuplicateType(pub String);

#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, Constructor); 4] = [
            ("std.String", || Box::new(String::new())),
            ("std.Vec", || Box::new(Vec::<u8>::new())),
            ("std.Integer", || Box::new(0i64)),
            ("std.Boolean", || Box::new(false)),
        ];
        for (name, constructor) in builtins {
            registry.constructors.insert(name.to_string(), constructor);
        }
        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        constructor: Constructor,
    ) -> Result<(), DuplicateType> {
        let name = name.into();
        if self.constructors.contains_key(&name) {
            return Err(DuplicateType(name));
        }
        self.constructors.insert(name, constructor);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn instantiate(&self, name: &str) -> Result<Box<dyn Any + Send>, TypeNotFound> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| TypeNotFound(name.to_string()))?;
        Ok(constructor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_name_is_not_found() {
        let registry = TypeRegistry::builtin();
        let err = registry
            .instantiate("nonexistent.ClassName")
            .expect_err("missing");
        assert_eq!(err, TypeNotFound("nonexistent.ClassName".to_string()));
        assert_eq!(err.to_string(), "no type registered under 'nonexistent.ClassName'");
    }

    #[test]
    fn instantiates_registered_type() {
        let registry = TypeRegistry::builtin();
        let value = registry.instantiate("std.Integer").expect("registered");
        assert_eq!(value.downcast_ref::<i64>(), Some(&0));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = TypeRegistry::new();
        registry
            .register("app.Flag", || Box::new(true))
            .expect("first");
        let err = registry
            .register("app.Flag", || Box::new(false))
            .expect_err("duplicate");
        assert_eq!(err, DuplicateType("app.Flag".to_string()));
        assert!(registry.contains("app.Flag"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["app.Flag"]);
    }
}
