//! Request and response envelopes for building HTTP endpoints in a
//! library-agnostic manner
//!
//! The query document arrives pre-parsed; decoding the query text is the
//! transport's job, as is rendering [`GraphQLResponse`] to bytes through its
//! `serde::Serialize` impl.

use serde::ser::{self, SerializeMap, Serialize};

use crate::{
    ast::{InputValue, OwnedDocument},
    executor::{ExecutionError, FieldError, Variables},
    schema::model::Schema,
    value::{DefaultScalarValue, ScalarValue, Value},
    GraphQLError,
};

/// The decoded body of a GraphQL request
///
/// Carries the parsed query document together with the optional operation
/// name and the raw variable values from the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphQLRequest<'a, S = DefaultScalarValue>
where
    S: ScalarValue,
{
    /// Parsed query document representing this request
    pub document: OwnedDocument<'a, S>,

    /// Optional name of the operation to execute
    pub operation_name: Option<String>,

    /// Optional variables to execute the operation with
    ///
    /// Holds the transport-level value; coercion against the declared
    /// variable types happens during execution.
    pub variables: Option<InputValue<S>>,
}

impl<'a, S> GraphQLRequest<'a, S>
where
    S: ScalarValue,
{
    /// Construct a new request from parts.
    pub fn new(
        document: OwnedDocument<'a, S>,
        operation_name: Option<String>,
        variables: Option<InputValue<S>>,
    ) -> Self {
        Self {
            document,
            operation_name,
            variables,
        }
    }

    /// Return the raw variable values defined within this request.
    pub fn variables(&self) -> Variables<S> {
        self.variables
            .as_ref()
            .and_then(|iv| {
                iv.to_object_value()
                    .map(|o| o.into_iter().map(|(k, v)| (k.into(), v.clone())).collect())
            })
            .unwrap_or_default()
    }

    /// Execute this request synchronously against the given schema and
    /// context.
    ///
    /// This is a simple wrapper around [`crate::execute_sync`].
    pub fn execute_sync<CtxT>(
        &self,
        schema: &Schema<CtxT, S>,
        context: &CtxT,
    ) -> GraphQLResponse<S> {
        GraphQLResponse(crate::execute_sync(
            &self.document,
            self.operation_name.as_deref(),
            schema,
            &self.variables(),
            context,
        ))
    }

    /// Execute this request against the given schema and context.
    ///
    /// This is a simple wrapper around [`crate::execute`].
    pub async fn execute<CtxT>(
        &self,
        schema: &Schema<CtxT, S>,
        context: &CtxT,
    ) -> GraphQLResponse<S>
    where
        CtxT: Sync,
    {
        let op = self.operation_name.as_deref();
        let vars = self.variables();
        let res = crate::execute(&self.document, op, schema, &vars, context).await;
        GraphQLResponse(res)
    }
}

/// Simple wrapper around the result of executing a GraphQL operation
///
/// Serializes to the response shape of the GraphQL specification: `data` is
/// omitted when a request-level error occurred before execution, and
/// `errors` is omitted when the list is empty. Use [`GraphQLResponse::is_ok`]
/// to pick an HTTP status code.
#[derive(Debug, PartialEq)]
pub struct GraphQLResponse<S = DefaultScalarValue>(
    Result<(Value<S>, Vec<ExecutionError<S>>), GraphQLError>,
);

impl<S> GraphQLResponse<S>
where
    S: ScalarValue,
{
    /// Construct a new response using the given result.
    pub fn from_result(r: Result<(Value<S>, Vec<ExecutionError<S>>), GraphQLError>) -> Self {
        Self(r)
    }

    /// Construct an error response outside of the normal execution flow.
    pub fn error(error: FieldError<S>) -> Self {
        GraphQLResponse(Ok((Value::null(), vec![ExecutionError::at_origin(error)])))
    }

    /// Was the request successful or not?
    ///
    /// There still might be errors in the response even though it is
    /// considered OK; that is by design in GraphQL.
    pub fn is_ok(&self) -> bool {
        self.0.is_ok()
    }
}

impl<T> Serialize for GraphQLResponse<T>
where
    T: ScalarValue,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match &self.0 {
            Ok((res, err)) => {
                let mut map = serializer.serialize_map(None)?;

                map.serialize_key("data")?;
                map.serialize_value(res)?;

                if !err.is_empty() {
                    map.serialize_key("errors")?;
                    map.serialize_value(err)?;
                }

                map.end()
            }
            Err(err) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_key("errors")?;
                map.serialize_value(err)?;
                map.end()
            }
        }
    }
}
