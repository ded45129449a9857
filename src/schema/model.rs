//! Schema registry and construction

use std::{error::Error, fmt};

use fnv::FnvHashMap;

use crate::{
    ast::Type,
    schema::{
        meta::{Argument, MetaType, ScalarMeta},
        name::Name,
    },
    value::DefaultScalarValue,
};

/// Construction-time pool of type definitions
///
/// Definitions are inserted by name; the five built-in scalars are
/// pre-registered. Name collisions and invalid names are rejected at insert
/// time, the reachability of the type graph is checked when the pool is
/// turned into a [`Schema`].
pub struct Registry<CtxT, S = DefaultScalarValue> {
    pub(crate) types: FnvHashMap<Name, MetaType<CtxT, S>>,
}

impl<CtxT, S> Registry<CtxT, S> {
    /// Construct a new [`Registry`] holding the built-in scalar types.
    pub fn new() -> Self {
        let mut registry = Self {
            types: FnvHashMap::default(),
        };
        for name in ["Int", "Float", "String", "Boolean", "ID"] {
            let parsed = name.parse::<Name>().expect("Built-in scalar name is valid");
            registry
                .types
                .insert(parsed, ScalarMeta::new(name).into_meta());
        }
        registry
    }

    /// Register a type definition under its name.
    ///
    /// Fails if the name does not match the name grammar, or if a definition
    /// with the same name has already been registered.
    pub fn insert(&mut self, meta: MetaType<CtxT, S>) -> Result<(), SchemaError> {
        let name = meta
            .name()
            .parse::<Name>()
            .map_err(|_| SchemaError::InvalidName(meta.name().into()))?;
        if self.types.contains_key(&name) {
            return Err(SchemaError::DuplicateName(meta.name().into()));
        }
        self.types.insert(name, meta);
        Ok(())
    }
}

impl<CtxT, S> Default for Registry<CtxT, S> {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable schema: the type registry plus its operation roots
///
/// Shared freely across requests; nothing in here is mutated after
/// construction.
#[derive(Debug)]
pub struct Schema<CtxT, S = DefaultScalarValue> {
    pub(crate) types: FnvHashMap<Name, MetaType<CtxT, S>>,
    query_type_name: String,
    mutation_type_name: Option<String>,
    directives: FnvHashMap<String, DirectiveType<S>>,
}

/// A view of a type literal with its wrappers resolved against the registry
pub enum TypeType<'a, CtxT, S: 'a> {
    /// A registered named type
    Concrete(&'a MetaType<CtxT, S>),
    /// A type that can only represent non-`null` values
    NonNull(Box<TypeType<'a, CtxT, S>>),
    /// A list of the wrapped type
    List(Box<TypeType<'a, CtxT, S>>),
}

/// Description of an executable directive
#[derive(Debug)]
pub struct DirectiveType<S> {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub description: Option<String>,
    #[allow(missing_docs)]
    pub locations: Vec<DirectiveLocation>,
    #[allow(missing_docs)]
    pub arguments: Vec<Argument<S>>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
#[allow(missing_docs)]
pub enum DirectiveLocation {
    Field,
    FragmentSpread,
    InlineFragment,
}

/// An error that prevented schema construction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaError {
    /// A type name does not match the name grammar
    InvalidName(String),
    /// Two distinct type definitions share a name
    DuplicateName(String),
    /// A type reachable from the operation roots is not registered
    UnknownType(String),
    /// An operation root names a type that is not an object
    NotAnObject(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SchemaError::InvalidName(name) => {
                write!(f, "\"{}\" is not a valid type name", name)
            }
            SchemaError::DuplicateName(name) => {
                write!(f, "Type \"{}\" is defined more than once", name)
            }
            SchemaError::UnknownType(name) => {
                write!(f, "Type \"{}\" is not defined in the schema", name)
            }
            SchemaError::NotAnObject(name) => {
                write!(f, "Type \"{}\" is not an object type", name)
            }
        }
    }
}

impl Error for SchemaError {}

impl<CtxT, S> Schema<CtxT, S> {
    /// Turn a [`Registry`] into an executable schema.
    ///
    /// `query` (and `mutation`, when given) must name registered object
    /// types. Every type reachable from the roots through field types,
    /// argument types and input object field types must resolve in the
    /// registry.
    pub fn new(
        registry: Registry<CtxT, S>,
        query: &str,
        mutation: Option<&str>,
    ) -> Result<Self, SchemaError> {
        let types = registry.types;

        for root in std::iter::once(query).chain(mutation) {
            match types.get(root) {
                Some(meta) if meta.is_object() => {}
                Some(_) => return Err(SchemaError::NotAnObject(root.into())),
                None => return Err(SchemaError::UnknownType(root.into())),
            }
        }

        // Depth-first reachability walk. Revisiting a known name is a no-op,
        // which also terminates on recursive type graphs.
        let mut visited = std::collections::HashSet::new();
        let mut stack: Vec<String> = std::iter::once(query)
            .chain(mutation)
            .map(Into::into)
            .collect();

        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let meta = types
                .get(name.as_str())
                .ok_or_else(|| SchemaError::UnknownType(name.clone()))?;
            match meta {
                MetaType::Object(obj) => {
                    for field in &obj.fields {
                        stack.push(field.field_type.innermost_name().into());
                        for arg in field.arguments.iter().flatten() {
                            stack.push(arg.arg_type.innermost_name().into());
                        }
                    }
                }
                MetaType::InputObject(obj) => {
                    for field in &obj.input_fields {
                        stack.push(field.arg_type.innermost_name().into());
                    }
                }
                MetaType::Scalar(..) | MetaType::Enum(..) => {}
            }
        }

        let mut directives = FnvHashMap::default();
        directives.insert("skip".to_owned(), DirectiveType::new_skip());
        directives.insert("include".to_owned(), DirectiveType::new_include());

        Ok(Schema {
            types,
            query_type_name: query.into(),
            mutation_type_name: mutation.map(Into::into),
            directives,
        })
    }

    /// Get a type by name.
    pub fn type_by_name(&self, name: &str) -> Option<TypeType<CtxT, S>> {
        self.types.get(name).map(TypeType::Concrete)
    }

    /// Get a concrete type by name.
    pub fn concrete_type_by_name(&self, name: &str) -> Option<&MetaType<CtxT, S>> {
        self.types.get(name)
    }

    /// Get the query root type of the schema.
    pub fn query_type(&self) -> &MetaType<CtxT, S> {
        self.types
            .get(self.query_type_name.as_str())
            .expect("Query type does not exist in schema")
    }

    /// Get the mutation root type of the schema, if any.
    pub fn mutation_type(&self) -> Option<&MetaType<CtxT, S>> {
        self.mutation_type_name.as_ref().map(|name| {
            self.types
                .get(name.as_str())
                .expect("Mutation type does not exist in schema")
        })
    }

    /// Resolve a type literal against the registry.
    ///
    /// The literal must reference a registered type; anything reachable from
    /// the roots has been checked at construction time.
    pub fn make_type(&self, t: &Type) -> TypeType<CtxT, S> {
        match t {
            Type::NonNullNamed(n) => TypeType::NonNull(Box::new(
                self.type_by_name(n).expect("Type not found in schema"),
            )),
            Type::NonNullList(inner) => {
                TypeType::NonNull(Box::new(TypeType::List(Box::new(self.make_type(inner)))))
            }
            Type::Named(n) => self.type_by_name(n).expect("Type not found in schema"),
            Type::List(inner) => TypeType::List(Box::new(self.make_type(inner))),
        }
    }

    /// Get a directive description by name.
    pub fn directive_by_name(&self, name: &str) -> Option<&DirectiveType<S>> {
        self.directives.get(name)
    }
}

impl<'a, CtxT, S> TypeType<'a, CtxT, S> {
    /// The named type this view refers to, if it is not wrapped.
    #[inline]
    pub fn to_concrete(&self) -> Option<&'a MetaType<CtxT, S>> {
        match self {
            TypeType::Concrete(t) => Some(t),
            _ => None,
        }
    }

    /// The named type behind all list and non-null wrappers.
    #[inline]
    pub fn innermost_concrete(&self) -> &'a MetaType<CtxT, S> {
        match self {
            TypeType::Concrete(t) => t,
            TypeType::NonNull(n) | TypeType::List(n) => n.innermost_concrete(),
        }
    }

    /// The element type, when this view is a list behind at most a non-null
    /// wrapper.
    #[inline]
    pub fn list_contents(&self) -> Option<&TypeType<'a, CtxT, S>> {
        match self {
            TypeType::List(n) => Some(n),
            TypeType::NonNull(n) => n.list_contents(),
            _ => None,
        }
    }

    /// Whether this view can only represent non-`null` values.
    #[inline]
    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeType::NonNull(_))
    }
}

impl<'a, CtxT, S> Clone for TypeType<'a, CtxT, S> {
    fn clone(&self) -> Self {
        match self {
            TypeType::Concrete(t) => TypeType::Concrete(t),
            TypeType::NonNull(i) => TypeType::NonNull(i.clone()),
            TypeType::List(i) => TypeType::List(i.clone()),
        }
    }
}

impl<'a, CtxT, S> fmt::Display for TypeType<'a, CtxT, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeType::Concrete(t) => f.write_str(t.name()),
            TypeType::List(i) => write!(f, "[{}]", i),
            TypeType::NonNull(i) => write!(f, "{}!", i),
        }
    }
}

impl<'a, CtxT, S> fmt::Debug for TypeType<'a, CtxT, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<S> DirectiveType<S> {
    /// Describe a new executable directive.
    pub fn new(
        name: &str,
        locations: &[DirectiveLocation],
        arguments: Vec<Argument<S>>,
    ) -> DirectiveType<S> {
        DirectiveType {
            name: name.into(),
            description: None,
            locations: locations.to_vec(),
            arguments,
        }
    }

    fn new_skip() -> DirectiveType<S> {
        Self::new(
            "skip",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Argument::new("if", Type::NonNullNamed("Boolean".into()))],
        )
    }

    fn new_include() -> DirectiveType<S> {
        Self::new(
            "include",
            &[
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            vec![Argument::new("if", Type::NonNullNamed("Boolean".into()))],
        )
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            DirectiveLocation::Field => "field",
            DirectiveLocation::FragmentSpread => "fragment spread",
            DirectiveLocation::InlineFragment => "inline fragment",
        })
    }
}
