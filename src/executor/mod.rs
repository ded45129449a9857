//! Resolve the document to values

use std::{
    cmp::Ordering,
    collections::HashMap,
    fmt::Display,
    sync::{Arc, RwLock},
};

use crate::{
    ast::{Definition, Document, Fragment, InputValue, Operation, OperationType, Selection},
    coercion::coerce_variable_values,
    schema::{meta::MetaType, model::Schema},
    span::{SourcePosition, Spanning},
    types::Instance,
    value::{DefaultScalarValue, Object, ScalarValue, Value},
    GraphQLError,
};

mod async_await;
mod resolve;

pub(crate) use self::resolve::resolve_selection_set_into;

/// The map of variables used for substitution during query execution
pub type Variables<S = DefaultScalarValue> = HashMap<String, InputValue<S>>;

/// Error type for errors that occur during field resolution
///
/// Field errors are represented by a human-readable error message and an
/// optional `Value` structure containing additional information.
///
/// They can be converted to from any type that implements `std::fmt::Display`,
/// which makes error chaining with the `?` operator a breeze:
///
/// ```rust
/// # use hawthorn::FieldError;
/// fn get_string(data: Vec<u8>) -> Result<String, FieldError> {
///     let s = String::from_utf8(data)?;
///     Ok(s)
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError<S = DefaultScalarValue> {
    message: String,
    extensions: Value<S>,
}

impl<T: Display, S> From<T> for FieldError<S> {
    fn from(e: T) -> Self {
        Self {
            message: e.to_string(),
            extensions: Value::Null,
        }
    }
}

impl<S> FieldError<S> {
    /// Construct a new [`FieldError`] with additional data.
    ///
    /// The `extensions` parameter will be added to the `"extensions"` field
    /// of the error object in the response. If it is [`Value::Null`], no
    /// extra data is included.
    #[must_use]
    pub fn new<T: Display>(e: T, extensions: Value<S>) -> Self {
        Self {
            message: e.to_string(),
            extensions,
        }
    }

    /// Return the `"message"` of this [`FieldError`].
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Return the `"extensions"` of this [`FieldError`].
    ///
    /// [`Value::Null`] when there are none.
    #[must_use]
    pub fn extensions(&self) -> &Value<S> {
        &self.extensions
    }
}

/// The result of resolving the value of a field of type `T`
pub type FieldResult<T, S = DefaultScalarValue> = Result<T, FieldError<S>>;

/// One segment of the response path leading to an error
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathSegment {
    /// A response name (the alias if present, else the field name)
    Field(String),
    /// A zero-based list index
    Index(usize),
}

/// Error type for errors that occur during query execution
///
/// All execution errors contain the source position in the query of the field
/// that failed to resolve, as well as the response path leading to it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionError<S> {
    location: SourcePosition,
    path: Vec<PathSegment>,
    error: FieldError<S>,
}

impl<S> Eq for ExecutionError<S> where Self: PartialEq {}

impl<S> ExecutionError<S> {
    /// Construct a new execution error occurring at the beginning of the
    /// query
    pub fn at_origin(error: FieldError<S>) -> ExecutionError<S> {
        ExecutionError {
            location: SourcePosition::new_origin(),
            path: Vec::new(),
            error,
        }
    }

    #[doc(hidden)]
    pub fn new(
        location: SourcePosition,
        path: Vec<PathSegment>,
        error: FieldError<S>,
    ) -> ExecutionError<S> {
        ExecutionError {
            location,
            path,
            error,
        }
    }

    /// The error itself
    pub fn error(&self) -> &FieldError<S> {
        &self.error
    }

    /// The source location _in the query_ of the field that failed to resolve
    pub fn location(&self) -> &SourcePosition {
        &self.location
    }

    /// The response path leading to the field that generated this error
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}

impl<S> PartialOrd for ExecutionError<S>
where
    Self: PartialEq,
{
    fn partial_cmp(&self, other: &ExecutionError<S>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S> Ord for ExecutionError<S>
where
    Self: Eq,
{
    fn cmp(&self, other: &ExecutionError<S>) -> Ordering {
        (&self.location, &self.path, &self.error.message).cmp(&(
            &other.location,
            &other.path,
            &other.error.message,
        ))
    }
}

/// Response path of the field currently being resolved
#[derive(Clone, Debug)]
pub enum FieldPath<'a> {
    /// The operation root
    Root(SourcePosition),
    /// A response name under the parent path
    Field(&'a str, SourcePosition, Arc<FieldPath<'a>>),
    /// A list index under the parent path
    Index(usize, Arc<FieldPath<'a>>),
}

impl<'a> FieldPath<'a> {
    fn construct_path(&self, acc: &mut Vec<PathSegment>) {
        match self {
            FieldPath::Root(_) => (),
            FieldPath::Field(name, _, parent) => {
                parent.construct_path(acc);
                acc.push(PathSegment::Field((*name).into()));
            }
            FieldPath::Index(index, parent) => {
                parent.construct_path(acc);
                acc.push(PathSegment::Index(*index));
            }
        }
    }

    fn location(&self) -> &SourcePosition {
        match self {
            FieldPath::Root(pos) | FieldPath::Field(_, pos, _) => pos,
            FieldPath::Index(_, parent) => parent.location(),
        }
    }
}

/// Query execution engine
///
/// The executor keeps track of the current field path, the variable
/// substitutions, the fragment table and the error accumulator while a
/// selection set is being resolved. Sub-executors derived per field or list
/// index share everything but the path.
pub struct Executor<'r, 'a, CtxT, S = DefaultScalarValue>
where
    CtxT: 'a,
    S: 'a,
{
    fragments: &'r HashMap<&'a str, Fragment<'a, S>>,
    variables: &'r Variables<S>,
    schema: &'a Schema<CtxT, S>,
    context: &'a CtxT,
    errors: &'r RwLock<Vec<ExecutionError<S>>>,
    field_path: Arc<FieldPath<'a>>,
}

impl<'r, 'a, CtxT, S> Executor<'r, 'a, CtxT, S>
where
    S: ScalarValue,
{
    /// Access the current context.
    ///
    /// The context is provided when calling the top-level `execute` functions
    /// and is shared by all resolvers of a request.
    pub fn context(&self) -> &'a CtxT {
        self.context
    }

    /// The currently executing schema.
    pub fn schema(&self) -> &'a Schema<CtxT, S> {
        self.schema
    }

    #[doc(hidden)]
    pub fn variables(&self) -> &'r Variables<S> {
        self.variables
    }

    #[doc(hidden)]
    pub fn fragment_by_name(&self, name: &str) -> Option<&'r Fragment<'a, S>> {
        self.fragments.get(name)
    }

    /// The current location of the executor in the query source.
    pub fn location(&self) -> &SourcePosition {
        self.field_path.location()
    }

    /// Add an error at the current executor location.
    pub fn push_error(&self, error: FieldError<S>) {
        self.push_error_at(error, *self.location());
    }

    /// Add an error at a specific location.
    pub fn push_error_at(&self, error: FieldError<S>, location: SourcePosition) {
        let mut path = Vec::new();
        self.field_path.construct_path(&mut path);

        let mut errors = self
            .errors
            .write()
            .expect("Error accumulator lock poisoned");

        errors.push(ExecutionError {
            location,
            path,
            error,
        });
    }

    pub(crate) fn field_sub_executor(
        &self,
        field_alias: &'a str,
        location: SourcePosition,
    ) -> Executor<'r, 'a, CtxT, S> {
        Executor {
            fragments: self.fragments,
            variables: self.variables,
            schema: self.schema,
            context: self.context,
            errors: self.errors,
            field_path: Arc::new(FieldPath::Field(
                field_alias,
                location,
                Arc::clone(&self.field_path),
            )),
        }
    }

    pub(crate) fn index_sub_executor(&self, index: usize) -> Executor<'r, 'a, CtxT, S> {
        Executor {
            fragments: self.fragments,
            variables: self.variables,
            schema: self.schema,
            context: self.context,
            errors: self.errors,
            field_path: Arc::new(FieldPath::Index(index, Arc::clone(&self.field_path))),
        }
    }
}

/// Find the operation to execute in a document.
///
/// Without an `operation_name`, the document must contain exactly one
/// operation.
pub fn get_operation<'b, 'd, S>(
    document: &'b Document<'d, S>,
    operation_name: Option<&str>,
) -> Result<&'b Spanning<Operation<'d, S>>, GraphQLError> {
    let mut operation = None;
    for def in document {
        if let Definition::Operation(op) = def {
            if operation_name.is_none() && operation.is_some() {
                return Err(GraphQLError::MultipleOperationsProvided);
            }

            let move_op =
                operation_name.is_none() || op.item.name.as_ref().map(|s| s.item) == operation_name;

            if move_op {
                operation = Some(op);
            }
        }
    }
    match operation {
        Some(op) => Ok(op),
        None if operation_name.is_none() => Err(GraphQLError::NoOperationProvided),
        None => Err(GraphQLError::UnknownOperationName),
    }
}

fn request_environment<'b, 'd, CtxT, S>(
    document: &'b Document<'d, S>,
    operation: &'b Spanning<Operation<'d, S>>,
    schema: &Schema<CtxT, S>,
    variables: &Variables<S>,
) -> Result<(HashMap<&'d str, Fragment<'d, S>>, Variables<S>), GraphQLError>
where
    S: ScalarValue,
{
    let mut fragments = HashMap::new();
    for def in document.iter() {
        if let Definition::Fragment(f) = def {
            fragments.insert(f.item.name.item, f.item.clone());
        }
    }

    let substitutions = coerce_variable_values(schema, &operation.item, variables)?;

    Ok((fragments, substitutions))
}

fn root_object_type<'s, CtxT, S>(
    schema: &'s Schema<CtxT, S>,
    operation_type: OperationType,
) -> Result<&'s MetaType<CtxT, S>, GraphQLError> {
    match operation_type {
        OperationType::Query => Ok(schema.query_type()),
        OperationType::Mutation => schema.mutation_type().ok_or(GraphQLError::NoMutationType),
    }
}

/// Create a new [`Executor`] and start synchronous query or mutation
/// execution.
///
/// Asynchronous resolvers encountered along the way produce field-level
/// errors; use [`execute_validated_query_async`] for schemas that contain
/// them.
pub fn execute_validated_query<'a, 'b, CtxT, S>(
    document: &'b Document<'a, S>,
    operation: &'b Spanning<Operation<'a, S>>,
    schema: &'b Schema<CtxT, S>,
    variables: &Variables<S>,
    context: &CtxT,
) -> Result<(Value<S>, Vec<ExecutionError<S>>), GraphQLError>
where
    S: ScalarValue,
{
    let (fragments, substitutions) = request_environment(document, operation, schema, variables)?;
    let root_meta = root_object_type(schema, operation.item.operation_type)?;
    let root_object = match root_meta {
        MetaType::Object(obj) => obj,
        _ => panic!("Root type is not an object"),
    };

    crate::__hawthorn_trace!(
        "executing {} operation",
        match operation.item.operation_type {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
        }
    );

    let errors = RwLock::new(Vec::new());
    let value;

    {
        let executor = Executor {
            fragments: &fragments,
            variables: &substitutions,
            schema,
            context,
            errors: &errors,
            field_path: Arc::new(FieldPath::Root(operation.start)),
        };

        let root_instance = Instance::new(root_object.name.clone(), ());
        let selection_set: Vec<&Selection<S>> = operation.item.selection_set.iter().collect();

        let mut result = Object::with_capacity(selection_set.len());
        value = if resolve_selection_set_into(
            root_object,
            root_instance.source(),
            &selection_set,
            &executor,
            &mut result,
        ) {
            Value::Object(result)
        } else {
            Value::Null
        };
    }

    let mut errors = errors.into_inner().expect("Error accumulator lock poisoned");
    errors.sort();

    crate::__hawthorn_trace!("execution finished with {} error(s)", errors.len());

    Ok((value, errors))
}

/// Create a new [`Executor`] and start asynchronous query or mutation
/// execution.
///
/// Sibling fields of a query operation are resolved concurrently; top-level
/// mutation fields are resolved strictly in source order.
pub async fn execute_validated_query_async<'a, 'b, CtxT, S>(
    document: &'b Document<'a, S>,
    operation: &'b Spanning<Operation<'a, S>>,
    schema: &'b Schema<CtxT, S>,
    variables: &Variables<S>,
    context: &CtxT,
) -> Result<(Value<S>, Vec<ExecutionError<S>>), GraphQLError>
where
    CtxT: Sync,
    S: ScalarValue,
{
    let (fragments, substitutions) = request_environment(document, operation, schema, variables)?;
    let root_meta = root_object_type(schema, operation.item.operation_type)?;
    let root_object = match root_meta {
        MetaType::Object(obj) => obj,
        _ => panic!("Root type is not an object"),
    };

    let serial = operation.item.operation_type == OperationType::Mutation;

    crate::__hawthorn_trace!(
        "executing {} operation",
        if serial { "mutation" } else { "query" }
    );

    let errors = RwLock::new(Vec::new());
    let value;

    {
        let executor = Executor {
            fragments: &fragments,
            variables: &substitutions,
            schema,
            context,
            errors: &errors,
            field_path: Arc::new(FieldPath::Root(operation.start)),
        };

        let root_instance = Instance::new(root_object.name.clone(), ());
        let selection_set: Vec<&Selection<S>> = operation.item.selection_set.iter().collect();

        value = match async_await::resolve_selection_set_async(
            root_object,
            root_instance.source(),
            &selection_set,
            &executor,
            serial,
        )
        .await
        {
            Ok(result) => Value::Object(result),
            Err(resolve::Nulled) => Value::Null,
        };
    }

    let mut errors = errors.into_inner().expect("Error accumulator lock poisoned");
    errors.sort();

    crate::__hawthorn_trace!("execution finished with {} error(s)", errors.len());

    Ok((value, errors))
}
