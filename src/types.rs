//! Resolver capabilities and their outcomes
//!
//! Field resolvers are attached to the schema at construction time. A
//! resolver receives the opaque source value of its enclosing object, the
//! coerced argument map and the request context, and produces a [`Resolved`]
//! outcome that the executor completes against the field's declared type.

use std::{any::Any, fmt, future::Future, sync::Arc};

use futures::future::BoxFuture;
use indexmap::IndexMap;

use crate::{
    ast::{FromInputValue, InputValue},
    executor::FieldResult,
    value::{DefaultScalarValue, Value},
};

/// Opaque payload a resolver reads its fields from
///
/// Parent resolvers decide what backs each object they return; child
/// resolvers downcast with [`Any::downcast_ref`].
pub type SourceValue = Arc<dyn Any + Send + Sync>;

/// A concrete object produced by a resolver
///
/// Carries the runtime type name that sub-selections are resolved against,
/// together with the source payload handed to the object's field resolvers.
#[derive(Clone)]
pub struct Instance {
    type_name: String,
    source: SourceValue,
}

impl Instance {
    /// Construct an instance of the named object type backed by `source`.
    pub fn new<T>(type_name: impl Into<String>, source: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Instance {
            type_name: type_name.into(),
            source: Arc::new(source),
        }
    }

    /// Construct an instance from an already shared source value.
    pub fn from_source(type_name: impl Into<String>, source: SourceValue) -> Self {
        Instance {
            type_name: type_name.into(),
            source,
        }
    }

    /// The concrete object type name of this instance.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The source payload of this instance.
    pub fn source(&self) -> &SourceValue {
        &self.source
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// The outcome of a successful resolver invocation
///
/// A `Resolved` is not yet a response value; the executor completes it
/// against the field's declared output type, which is where lists are walked,
/// scalars are canonicalized, enum membership is checked and non-null
/// violations are detected.
#[derive(Debug, Clone)]
pub enum Resolved<S = DefaultScalarValue> {
    /// No value
    Null,
    /// A leaf value, ready for the response tree
    Value(Value<S>),
    /// A typed object whose fields are resolved by a sub-selection
    Object(Instance),
    /// A list of outcomes, completed element by element
    List(Vec<Resolved<S>>),
}

impl<S> Resolved<S> {
    /// Construct a `null` outcome.
    pub fn null() -> Self {
        Self::Null
    }

    /// Construct a scalar leaf outcome.
    pub fn scalar<T>(v: T) -> Self
    where
        S: From<T>,
    {
        Self::Value(Value::scalar(v))
    }

    /// Construct an object outcome of the named type backed by `source`.
    pub fn object<T>(type_name: impl Into<String>, source: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self::Object(Instance::new(type_name, source))
    }

    /// Construct a list outcome.
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l)
    }

    /// Does this outcome represent a `null`?
    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Value(v) => v.is_null(),
            _ => false,
        }
    }
}

impl<S> From<Value<S>> for Resolved<S> {
    fn from(v: Value<S>) -> Self {
        Self::Value(v)
    }
}

impl<S> From<Instance> for Resolved<S> {
    fn from(i: Instance) -> Self {
        Self::Object(i)
    }
}

impl<S, T> From<Option<T>> for Resolved<S>
where
    Self: From<T>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl<'a, S: From<String>> From<&'a str> for Resolved<S> {
    fn from(s: &'a str) -> Self {
        Self::scalar(s.to_owned())
    }
}

impl<S: From<String>> From<String> for Resolved<S> {
    fn from(s: String) -> Self {
        Self::scalar(s)
    }
}

impl<S: From<i32>> From<i32> for Resolved<S> {
    fn from(i: i32) -> Self {
        Self::scalar(i)
    }
}

impl<S: From<f64>> From<f64> for Resolved<S> {
    fn from(f: f64) -> Self {
        Self::scalar(f)
    }
}

impl<S: From<bool>> From<bool> for Resolved<S> {
    fn from(b: bool) -> Self {
        Self::scalar(b)
    }
}

/// Field argument container
///
/// Holds the coerced arguments of one field invocation, with default values
/// substituted for the ones not provided by the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments<S = DefaultScalarValue> {
    args: IndexMap<String, InputValue<S>>,
}

impl<S> Arguments<S> {
    pub(crate) fn new(args: IndexMap<String, InputValue<S>>) -> Self {
        Arguments { args }
    }

    /// An empty argument container.
    pub fn none() -> Self {
        Arguments {
            args: IndexMap::new(),
        }
    }

    /// Get and convert an argument into the desired type.
    ///
    /// Returns `Some` if the argument is present _and_ the type conversion
    /// succeeds.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: FromInputValue<S>,
    {
        self.args.get(key).and_then(InputValue::convert)
    }

    /// Get the raw coerced value of an argument, if present.
    pub fn get_input_value(&self, key: &str) -> Option<&InputValue<S>> {
        self.args.get(key)
    }

    /// The number of arguments in this container.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether this container holds no arguments.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// Synchronous resolver function
pub type SyncResolverFn<CtxT, S> =
    Box<dyn Fn(&SourceValue, &Arguments<S>, &CtxT) -> FieldResult<Resolved<S>, S> + Send + Sync>;

/// Asynchronous resolver function
pub type AsyncResolverFn<CtxT, S> = Box<
    dyn for<'a> Fn(
            &'a SourceValue,
            &'a Arguments<S>,
            &'a CtxT,
        ) -> BoxFuture<'a, FieldResult<Resolved<S>, S>>
        + Send
        + Sync,
>;

/// A resolver attached to an object field
///
/// The two variants correspond to the two execution policies: synchronous
/// resolvers work under both [`crate::execute_sync`] and [`crate::execute`],
/// while asynchronous ones require the latter.
pub enum FieldResolver<CtxT, S = DefaultScalarValue> {
    /// Resolver returning its outcome directly
    Sync(SyncResolverFn<CtxT, S>),
    /// Resolver returning a future of its outcome
    Async(AsyncResolverFn<CtxT, S>),
}

impl<CtxT, S> FieldResolver<CtxT, S> {
    /// Wrap a synchronous resolver function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&SourceValue, &Arguments<S>, &CtxT) -> FieldResult<Resolved<S>, S>
            + Send
            + Sync
            + 'static,
    {
        Self::Sync(Box::new(f))
    }

    /// Wrap an asynchronous resolver function.
    ///
    /// The returned future cannot borrow from the resolver's inputs: clone
    /// whatever the future needs before constructing it.
    pub fn new_async<F, Fut>(f: F) -> Self
    where
        F: Fn(&SourceValue, &Arguments<S>, &CtxT) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FieldResult<Resolved<S>, S>> + Send + 'static,
    {
        Self::Async(Box::new(move |source, args, ctx| {
            Box::pin(f(source, args, ctx))
        }))
    }
}

impl<CtxT, S> fmt::Debug for FieldResolver<CtxT, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("FieldResolver::Sync(..)"),
            Self::Async(_) => f.write_str("FieldResolver::Async(..)"),
        }
    }
}
