//! Schema type metadata
//!
//! Unlike compile-time schema definitions, every entity here is a plain
//! runtime value: an object field carries its resolver as a boxed closure,
//! and the whole type graph is assembled through a
//! [`Registry`](crate::schema::model::Registry).

use crate::{
    ast::{InputValue, Type},
    types::FieldResolver,
    value::DefaultScalarValue,
};

/// Scalar type metadata
///
/// The five built-in scalars (`Int`, `Float`, `String`, `Boolean`, `ID`) are
/// pre-registered; additional scalar names pass resolver output through
/// unchanged.
#[derive(Debug)]
pub struct ScalarMeta {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub description: Option<String>,
}

impl ScalarMeta {
    /// Build a new [`ScalarMeta`] type with the specified `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Set the `description` of this scalar type.
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Wrap this [`ScalarMeta`] into a generic [`MetaType`].
    pub fn into_meta<CtxT, S>(self) -> MetaType<CtxT, S> {
        MetaType::Scalar(self)
    }
}

/// Metadata for a single value in an enum
#[derive(Debug, Clone)]
pub struct EnumValue {
    /// The name of the enum value
    ///
    /// This is the string literal representation of the member in responses.
    pub name: String,
    /// The optional description of this enum _value_
    pub description: Option<String>,
}

impl EnumValue {
    /// Construct a new [`EnumValue`] with the provided `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Set the `description` of this enum value.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Enum type metadata
#[derive(Debug)]
pub struct EnumMeta {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub description: Option<String>,
    #[allow(missing_docs)]
    pub values: Vec<EnumValue>,
}

impl EnumMeta {
    /// Build a new [`EnumMeta`] type with the specified `name` and possible
    /// `values`.
    pub fn new(name: impl Into<String>, values: &[EnumValue]) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: values.to_vec(),
        }
    }

    /// Set the `description` of this enum type.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Does this enum contain a member with the given name?
    pub fn has_value(&self, name: &str) -> bool {
        self.values.iter().any(|v| v.name == name)
    }

    /// Wrap this [`EnumMeta`] into a generic [`MetaType`].
    pub fn into_meta<CtxT, S>(self) -> MetaType<CtxT, S> {
        MetaType::Enum(self)
    }
}

/// Object type metadata
pub struct ObjectMeta<CtxT, S = DefaultScalarValue> {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub description: Option<String>,
    #[allow(missing_docs)]
    pub fields: Vec<Field<CtxT, S>>,
}

impl<CtxT, S> ObjectMeta<CtxT, S> {
    /// Build a new [`ObjectMeta`] type with the specified `name` and `fields`.
    pub fn new(name: impl Into<String>, fields: Vec<Field<CtxT, S>>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields,
        }
    }

    /// Set the `description` of this object type.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Return a [`Field`]'s metadata by its `name`.
    pub fn field_by_name(&self, name: &str) -> Option<&Field<CtxT, S>> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Wrap this [`ObjectMeta`] into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType<CtxT, S> {
        MetaType::Object(self)
    }
}

impl<CtxT, S> std::fmt::Debug for ObjectMeta<CtxT, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectMeta")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("fields", &self.fields.iter().map(|x| &x.name).collect::<Vec<_>>())
            .finish()
    }
}

/// Input object metadata
#[derive(Debug)]
pub struct InputObjectMeta<S = DefaultScalarValue> {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub description: Option<String>,
    #[allow(missing_docs)]
    pub input_fields: Vec<Argument<S>>,
}

impl<S> InputObjectMeta<S> {
    /// Build a new [`InputObjectMeta`] type with the specified `name` and
    /// `input_fields`.
    pub fn new(name: impl Into<String>, input_fields: Vec<Argument<S>>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_fields,
        }
    }

    /// Set the `description` of this input object type.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Return an input field's metadata by its `name`.
    pub fn input_field_by_name(&self, name: &str) -> Option<&Argument<S>> {
        self.input_fields.iter().find(|f| f.name == name)
    }

    /// Wrap this [`InputObjectMeta`] into a generic [`MetaType`].
    pub fn into_meta<CtxT>(self) -> MetaType<CtxT, S> {
        MetaType::InputObject(self)
    }
}

/// Metadata for an output field, including its resolver
pub struct Field<CtxT, S = DefaultScalarValue> {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub description: Option<String>,
    #[allow(missing_docs)]
    pub arguments: Option<Vec<Argument<S>>>,
    #[allow(missing_docs)]
    pub field_type: Type<'static>,
    #[allow(missing_docs)]
    pub resolver: FieldResolver<CtxT, S>,
}

impl<CtxT, S> Field<CtxT, S> {
    /// Build a new [`Field`] of the given type, resolved by `resolver`.
    pub fn new(
        name: impl Into<String>,
        field_type: Type<'static>,
        resolver: FieldResolver<CtxT, S>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: None,
            field_type,
            resolver,
        }
    }

    /// Set the `description` of this field.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an `argument` to this field.
    ///
    /// Arguments are unordered and can't contain duplicates by name.
    #[must_use]
    pub fn argument(mut self, argument: Argument<S>) -> Self {
        match self.arguments {
            None => {
                self.arguments = Some(vec![argument]);
            }
            Some(ref mut args) => {
                args.push(argument);
            }
        };
        self
    }
}

impl<CtxT, S> std::fmt::Debug for Field<CtxT, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .finish_non_exhaustive()
    }
}

/// Metadata for an argument to a field, or a field of an input object
#[derive(Debug, Clone)]
pub struct Argument<S = DefaultScalarValue> {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub description: Option<String>,
    #[allow(missing_docs)]
    pub arg_type: Type<'static>,
    #[allow(missing_docs)]
    pub default_value: Option<InputValue<S>>,
}

impl<S> Argument<S> {
    /// Build a new [`Argument`] of the given type with the given `name`.
    pub fn new(name: impl Into<String>, arg_type: Type<'static>) -> Self {
        Self {
            name: name.into(),
            description: None,
            arg_type,
            default_value: None,
        }
    }

    /// Set the `description` of this argument.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the default value of this argument.
    ///
    /// Overwrites any previously set default value.
    #[must_use]
    pub fn default_value(mut self, val: InputValue<S>) -> Self {
        self.default_value = Some(val);
        self
    }
}

/// Generic type metadata
#[derive(Debug)]
pub enum MetaType<CtxT, S = DefaultScalarValue> {
    #[allow(missing_docs)]
    Scalar(ScalarMeta),
    #[allow(missing_docs)]
    Enum(EnumMeta),
    #[allow(missing_docs)]
    Object(ObjectMeta<CtxT, S>),
    #[allow(missing_docs)]
    InputObject(InputObjectMeta<S>),
}

impl<CtxT, S> MetaType<CtxT, S> {
    /// Return the name of the represented type.
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(ScalarMeta { name, .. })
            | Self::Enum(EnumMeta { name, .. })
            | Self::Object(ObjectMeta { name, .. })
            | Self::InputObject(InputObjectMeta { name, .. }) => name,
        }
    }

    /// Return the description of the represented type, if any.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Scalar(ScalarMeta { description, .. })
            | Self::Enum(EnumMeta { description, .. })
            | Self::Object(ObjectMeta { description, .. })
            | Self::InputObject(InputObjectMeta { description, .. }) => description.as_deref(),
        }
    }

    /// Return a [`Field`]'s metadata by its `name`.
    ///
    /// Only objects have output fields.
    pub fn field_by_name(&self, name: &str) -> Option<&Field<CtxT, S>> {
        match self {
            Self::Object(obj) => obj.field_by_name(name),
            Self::Scalar(..) | Self::Enum(..) | Self::InputObject(..) => None,
        }
    }

    /// Return an input field's metadata by its `name`.
    ///
    /// Only input objects have input fields.
    pub fn input_field_by_name(&self, name: &str) -> Option<&Argument<S>> {
        match self {
            Self::InputObject(obj) => obj.input_field_by_name(name),
            Self::Scalar(..) | Self::Enum(..) | Self::Object(..) => None,
        }
    }

    /// Whether the represented type can occur in leaf positions of queries.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar(..) | Self::Enum(..))
    }

    /// Whether the represented type can be used in input positions, e.g.
    /// arguments or variables.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Scalar(..) | Self::Enum(..) | Self::InputObject(..))
    }

    /// Whether the represented type is an object.
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(..))
    }
}
