/*!

# Hawthorn

Hawthorn is a GraphQL execution engine for Rust built around schemas that are
constructed at runtime. Instead of deriving a schema from Rust types, you
register type definitions in a [`Registry`], attach resolver closures to
object fields, and execute parsed query documents against the resulting
[`Schema`].

Hawthorn does not include a query parser or a web server; it consumes the
document AST defined in [`ast`] and produces a [`Value`] tree plus a list of
[`ExecutionError`]s, which the envelopes in [`http`] render into the standard
`{"data": …, "errors": …}` response shape through `serde`.

## Example

```rust
use hawthorn::{
    ast::{Field, Operation, OperationType, Type},
    meta::{Field as MetaField, ObjectMeta},
    FieldResolver, Registry, Resolved, Schema, Variables,
};

let mut registry = Registry::new();
registry
    .insert(
        ObjectMeta::new(
            "Query",
            vec![MetaField::new(
                "answer",
                Type::NonNullNamed("Int".into()),
                FieldResolver::new(|_source, _args: &hawthorn::Arguments, _context: &()| Ok(Resolved::scalar(42))),
            )],
        )
        .into_meta(),
    )
    .unwrap();
let schema = Schema::new(registry, "Query", None).unwrap();

let document = vec![Operation::new(
    OperationType::Query,
    vec![Field::new("answer").into_selection()],
)
.into_definition()];

let (value, errors) =
    hawthorn::execute_sync(&document, None, &schema, &Variables::new(), &()).unwrap();

assert!(errors.is_empty());
assert_eq!(value.as_object_value().unwrap().field_count(), 1);
```

## Execution model

Execution happens in two stages. Variable values from the transport are
coerced against the types declared by the operation, producing the
substitution map; a failure here aborts the request before any resolver
runs. The selection set is then resolved against the operation's root object
type: fragments expand during field collection, each grouped field runs its
resolver once, and the outcome is completed against the field's declared
type, with `null`s propagating past non-null barriers to the nearest
nullable ancestor.

Both a synchronous driver ([`execute_sync`]) and an asynchronous one
([`execute`]) are provided. Under the asynchronous driver, sibling fields of
a query operation resolve concurrently while mutation roots stay strictly
sequential.

*/
#![warn(missing_docs)]

pub mod ast;
mod coercion;
mod executor;
pub mod http;
mod integrations;
mod macros;
pub mod schema;
mod span;
mod types;
mod value;

#[cfg(test)]
mod executor_tests;

use std::{error::Error, fmt};

use crate::{
    ast::Document,
    executor::get_operation,
};

pub use crate::{
    coercion::{coerce_argument_values, coerce_variable_values, CoercionError},
    executor::{
        ExecutionError, Executor, FieldError, FieldPath, FieldResult, PathSegment, Variables,
    },
    schema::{
        meta,
        model::{DirectiveLocation, DirectiveType, Registry, Schema, SchemaError, TypeType},
        Name, NameParseError,
    },
    span::{SourcePosition, Spanning},
    types::{Arguments, FieldResolver, Instance, Resolved, SourceValue},
    value::{DefaultScalarValue, Object, ScalarValue, Value},
};

/// An error that prevented query execution
#[derive(Clone, Debug, PartialEq)]
pub enum GraphQLError {
    /// The document contains no operation to execute
    NoOperationProvided,
    /// The document contains several operations and no operation name was
    /// given
    MultipleOperationsProvided,
    /// No operation with the given name exists in the document
    UnknownOperationName,
    /// A mutation was requested on a schema without a mutation root
    NoMutationType,
    /// Variable values could not be coerced to their declared types
    CoercionError(CoercionError),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GraphQLError::NoOperationProvided => write!(f, "No operation provided"),
            GraphQLError::MultipleOperationsProvided => write!(f, "Multiple operations provided"),
            GraphQLError::UnknownOperationName => write!(f, "Unknown operation name"),
            GraphQLError::NoMutationType => write!(f, "Schema is not configured for mutations"),
            GraphQLError::CoercionError(e) => e.fmt(f),
        }
    }
}

impl Error for GraphQLError {}

impl From<CoercionError> for GraphQLError {
    fn from(e: CoercionError) -> GraphQLError {
        GraphQLError::CoercionError(e)
    }
}

/// Execute a query or mutation synchronously in the provided schema.
///
/// Every resolver encountered must be a synchronous one; asynchronous
/// resolvers produce field-level errors under this driver.
pub fn execute_sync<'a, 'b, CtxT, S>(
    document: &'b Document<'a, S>,
    operation_name: Option<&str>,
    schema: &'b Schema<CtxT, S>,
    variables: &Variables<S>,
    context: &CtxT,
) -> Result<(Value<S>, Vec<ExecutionError<S>>), GraphQLError>
where
    S: ScalarValue,
{
    let operation = get_operation(document, operation_name)?;

    executor::execute_validated_query(document, operation, schema, variables, context)
}

/// Execute a query or mutation in the provided schema.
///
/// Sibling fields of a query operation are resolved concurrently; top-level
/// mutation fields are resolved in source order, one after another.
/// Cancelling the returned future drops all in-flight resolver futures.
pub async fn execute<'a, 'b, CtxT, S>(
    document: &'b Document<'a, S>,
    operation_name: Option<&str>,
    schema: &'b Schema<CtxT, S>,
    variables: &Variables<S>,
    context: &CtxT,
) -> Result<(Value<S>, Vec<ExecutionError<S>>), GraphQLError>
where
    CtxT: Sync,
    S: ScalarValue,
{
    let operation = get_operation(document, operation_name)?;

    executor::execute_validated_query_async(document, operation, schema, variables, context).await
}
