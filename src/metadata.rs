//! Class and field metadata the compiler resolves paths against.
//!
//! The compiler only ever reads a [`MetadataModel`]; one model may serve any
//! number of concurrent compiles.

use std::collections::HashMap;

use crate::value::ValueType;

/// What a field holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// A plain value
    Attribute(ValueType),
    /// A single object of the named class
    Reference(String),
    /// A bag of objects of the named class
    Collection(String),
}

/// Read-only view of the object model.
pub trait MetadataModel: Send + Sync {
    fn has_class(&self, class: &str) -> bool;

    /// The type of `field` on `class`, including inherited fields.
    fn field_type(&self, class: &str, field: &str) -> Option<FieldType>;

    fn has_field(&self, class: &str, field: &str) -> bool {
        self.field_type(class, field).is_some()
    }

    /// Whether an object of class `from` may stand where `to` is expected.
    fn is_assignable(&self, from: &str, to: &str) -> bool {
        from == to
    }
}

/// A class in a [`Model`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDescriptor {
    pub name: String,
    pub extends: Option<String>,
    pub fields: HashMap<String, FieldType>,
}

/// In-memory [`MetadataModel`] with single inheritance.
///
/// # Examples
///
/// ```
/// use iql_lang::metadata::{FieldType, MetadataModel, Model};
/// use iql_lang::ValueType;
///
/// let model = Model::builder("org.example")
///     .class("Employee", None)
///     .attribute("Employee", "name", ValueType::Text)
///     .class("Manager", Some("Employee"))
///     .build();
///
/// assert_eq!(
///     model.field_type("Manager", "name"),
///     Some(FieldType::Attribute(ValueType::Text))
/// );
/// assert!(model.is_assignable("Manager", "Employee"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    package: String,
    classes: HashMap<String, ClassDescriptor>,
}

impl Model {
    pub fn builder(package: &str) -> ModelBuilder {
        ModelBuilder {
            model: Model {
                package: package.to_string(),
                classes: HashMap::new(),
            },
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    /// The class and its ancestors, nearest first. Stops on a cycle.
    fn lineage<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ClassDescriptor> + 'a {
        let mut next = self.classes.get(name);
        let mut seen = 0usize;
        let limit = self.classes.len();
        std::iter::from_fn(move || {
            let current = next?;
            seen += 1;
            if seen > limit {
                return None;
            }
            next = current
                .extends
                .as_deref()
                .and_then(|parent| self.classes.get(parent));
            Some(current)
        })
    }

    /// Load a model from its JSON description.
    ///
    /// ```text
    /// {
    ///   "package": "org.flymine.model.testmodel",
    ///   "classes": {
    ///     "Company": {
    ///       "attributes": {"name": "text", "vatNumber": "integer"},
    ///       "references": {"CEO": "CEO"},
    ///       "collections": {"departments": "Department"}
    ///     },
    ///     "CEO": {"extends": "Manager", "attributes": {"salary": "integer"}}
    ///   }
    /// }
    /// ```
    pub fn from_json(text: &str) -> Result<Model, ModelError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Model::from_json_value(&value)
    }

    pub fn from_json_value(value: &serde_json::Value) -> Result<Model, ModelError> {
        let package = value
            .get("package")
            .and_then(|p| p.as_str())
            .ok_or_else(|| ModelError::Invalid("missing \"package\" string".to_string()))?;
        let classes = value
            .get("classes")
            .and_then(|c| c.as_object())
            .ok_or_else(|| ModelError::Invalid("missing \"classes\" object".to_string()))?;

        let mut builder = Model::builder(package);
        for (name, class) in classes {
            let extends = match class.get("extends") {
                None | Some(serde_json::Value::Null) => None,
                Some(serde_json::Value::String(parent)) => Some(parent.as_str()),
                Some(_) => {
                    return Err(ModelError::Invalid(format!(
                        "\"extends\" of class {} must be a string",
                        name
                    )));
                }
            };
            builder = builder.class(name, extends);

            for (field, type_name) in json_entries(class, "attributes", name)? {
                let ty = ValueType::from_name(type_name).ok_or_else(|| {
                    ModelError::Invalid(format!(
                        "unknown attribute type {} for {}.{}",
                        type_name, name, field
                    ))
                })?;
                builder = builder.attribute(name, field, ty);
            }
            for (field, target) in json_entries(class, "references", name)? {
                builder = builder.reference(name, field, target);
            }
            for (field, target) in json_entries(class, "collections", name)? {
                builder = builder.collection(name, field, target);
            }
        }

        let model = builder.build();
        model.validate()?;
        Ok(model)
    }

    /// Every superclass and relationship target must be a known class.
    fn validate(&self) -> Result<(), ModelError> {
        for class in self.classes.values() {
            if let Some(parent) = &class.extends
                && !self.classes.contains_key(parent)
            {
                return Err(ModelError::Invalid(format!(
                    "class {} extends unknown class {}",
                    class.name, parent
                )));
            }
            for (field, ty) in &class.fields {
                if let FieldType::Reference(target) | FieldType::Collection(target) = ty
                    && !self.classes.contains_key(target)
                {
                    return Err(ModelError::Invalid(format!(
                        "field {}.{} refers to unknown class {}",
                        class.name, field, target
                    )));
                }
            }
        }
        Ok(())
    }
}

fn json_entries<'a>(
    class: &'a serde_json::Value,
    key: &str,
    class_name: &str,
) -> Result<Vec<(&'a str, &'a str)>, ModelError> {
    let Some(entries) = class.get(key) else {
        return Ok(vec![]);
    };
    let entries = entries.as_object().ok_or_else(|| {
        ModelError::Invalid(format!("\"{}\" of class {} must be an object", key, class_name))
    })?;
    entries
        .iter()
        .map(|(field, value)| {
            value.as_str().map(|v| (field.as_str(), v)).ok_or_else(|| {
                ModelError::Invalid(format!(
                    "{}.{} must name a type as a string",
                    class_name, field
                ))
            })
        })
        .collect()
}

impl MetadataModel for Model {
    fn has_class(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    fn field_type(&self, class: &str, field: &str) -> Option<FieldType> {
        self.lineage(class)
            .find_map(|descriptor| descriptor.fields.get(field))
            .cloned()
    }

    fn is_assignable(&self, from: &str, to: &str) -> bool {
        self.lineage(from).any(|descriptor| descriptor.name == to)
    }
}

/// Fluent construction of a [`Model`].
pub struct ModelBuilder {
    model: Model,
}

impl ModelBuilder {
    pub fn class(mut self, name: &str, extends: Option<&str>) -> Self {
        let descriptor = self
            .model
            .classes
            .entry(name.to_string())
            .or_insert_with(|| ClassDescriptor {
                name: name.to_string(),
                ..ClassDescriptor::default()
            });
        descriptor.extends = extends.map(str::to_string);
        self
    }

    fn field(mut self, class: &str, field: &str, ty: FieldType) -> Self {
        self = self.ensure(class);
        if let Some(descriptor) = self.model.classes.get_mut(class) {
            descriptor.fields.insert(field.to_string(), ty);
        }
        self
    }

    fn ensure(self, class: &str) -> Self {
        if self.model.classes.contains_key(class) {
            self
        } else {
            self.class(class, None)
        }
    }

    pub fn attribute(self, class: &str, field: &str, ty: ValueType) -> Self {
        self.field(class, field, FieldType::Attribute(ty))
    }

    pub fn reference(self, class: &str, field: &str, target: &str) -> Self {
        self.field(class, field, FieldType::Reference(target.to_string()))
    }

    pub fn collection(self, class: &str, field: &str, target: &str) -> Self {
        self.field(class, field, FieldType::Collection(target.to_string()))
    }

    pub fn build(self) -> Model {
        self.model
    }
}

/// Errors loading a model description.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid model: {0}")]
    Invalid(String),
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A cut-down copy of the FlyMine test model.
    pub(crate) fn testmodel() -> Model {
        Model::builder("org.flymine.model.testmodel")
            .class("Company", None)
            .attribute("Company", "name", ValueType::Text)
            .attribute("Company", "vatNumber", ValueType::Integer)
            .reference("Company", "CEO", "CEO")
            .collection("Company", "departments", "Department")
            .class("Department", None)
            .attribute("Department", "name", ValueType::Text)
            .reference("Department", "company", "Company")
            .collection("Department", "employees", "Employee")
            .class("Employee", None)
            .attribute("Employee", "name", ValueType::Text)
            .attribute("Employee", "age", ValueType::Integer)
            .attribute("Employee", "fullTime", ValueType::Boolean)
            .reference("Employee", "department", "Department")
            .class("Manager", Some("Employee"))
            .attribute("Manager", "title", ValueType::Text)
            .class("CEO", Some("Manager"))
            .attribute("CEO", "salary", ValueType::Integer)
            .reference("CEO", "company", "Company")
            .build()
    }
}
