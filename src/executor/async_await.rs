//! Asynchronous selection-set resolution
//!
//! Mirrors the synchronous path, with two differences: resolvers may return
//! futures, and sibling fields of a non-serial selection set are driven
//! concurrently through an order-preserving join. Field collection, argument
//! coercion and leaf completion stay synchronous; resolver invocations are
//! the only suspension points.

use futures::{
    future::BoxFuture,
    stream::{FuturesOrdered, StreamExt as _},
};
use indexmap::IndexMap;

use crate::{
    ast::Selection,
    executor::{
        resolve::{
            collect_fields, complete_enum, complete_scalar, nulled_slot, CollectedField, Nulled,
        },
        Executor, FieldError,
    },
    coercion::coerce_argument_values,
    schema::{meta::MetaType, meta::ObjectMeta, model::TypeType},
    types::{FieldResolver, Resolved, SourceValue},
    value::{Object, ScalarValue, Value},
};

/// Resolve `selection_set` against the object backed by `source`.
///
/// With `serial` set, fields are resolved strictly in source order, awaiting
/// each resolver before invoking the next; otherwise sibling fields run
/// concurrently while the response map still preserves source order.
pub(crate) fn resolve_selection_set_async<'x, CtxT, S>(
    object_meta: &'x ObjectMeta<CtxT, S>,
    source: &'x SourceValue,
    selection_set: &'x [&'x Selection<'x, S>],
    executor: &'x Executor<'x, 'x, CtxT, S>,
    serial: bool,
) -> BoxFuture<'x, Result<Object<S>, Nulled>>
where
    CtxT: Sync,
    S: ScalarValue,
{
    Box::pin(async move {
        let mut grouped = IndexMap::new();
        let mut spread_stack = Vec::new();
        collect_fields(
            executor,
            &object_meta.name,
            selection_set,
            &mut spread_stack,
            &mut grouped,
        );

        let mut result = Object::with_capacity(grouped.len());

        if serial {
            for (&response_name, collected) in &grouped {
                match execute_field_async(object_meta, source, response_name, collected, executor)
                    .await
                {
                    Ok(value) => {
                        result.add_field(response_name, value);
                    }
                    Err(Nulled) => return Err(Nulled),
                }
            }
        } else {
            let mut pending = FuturesOrdered::new();
            for (&response_name, collected) in &grouped {
                pending.push_back(async move {
                    let value =
                        execute_field_async(object_meta, source, response_name, collected, executor)
                            .await;
                    (response_name, value)
                });
            }

            // Dropping the remaining futures on early return cancels the
            // in-flight resolvers of this selection set.
            while let Some((response_name, value)) = pending.next().await {
                match value {
                    Ok(value) => {
                        result.add_field(response_name, value);
                    }
                    Err(Nulled) => return Err(Nulled),
                }
            }
        }

        Ok(result)
    })
}

async fn execute_field_async<'r, 'a, CtxT, S>(
    object_meta: &ObjectMeta<CtxT, S>,
    source: &SourceValue,
    response_name: &'a str,
    collected: &CollectedField<'r, 'a, S>,
    executor: &Executor<'r, 'a, CtxT, S>,
) -> Result<Value<S>, Nulled>
where
    CtxT: Sync,
    S: ScalarValue,
{
    let f = &collected.field.item;
    let position = collected.field.start;

    if f.name.item == "__typename" {
        return Ok(Value::scalar(object_meta.name.clone()));
    }

    let sub_exec = executor.field_sub_executor(response_name, position);

    let meta_field = match object_meta.field_by_name(f.name.item) {
        Some(field) => field,
        None => {
            sub_exec.push_error_at(
                FieldError::from(format!("field {} not resolved.", f.name.item)),
                position,
            );
            return Ok(Value::Null);
        }
    };

    let arguments = match coerce_argument_values(
        executor.schema(),
        &meta_field.arguments,
        f.arguments.as_ref(),
        executor.variables(),
    ) {
        Ok(arguments) => arguments,
        Err(e) => {
            sub_exec.push_error_at(FieldError::from(e), position);
            return nulled_slot(meta_field.field_type.is_non_null());
        }
    };

    let outcome = match &meta_field.resolver {
        FieldResolver::Sync(resolve_fn) => resolve_fn(source, &arguments, executor.context()),
        FieldResolver::Async(resolve_fn) => {
            resolve_fn(source, &arguments, executor.context()).await
        }
    };

    let resolved = match outcome {
        Ok(resolved) => resolved,
        Err(e) => {
            sub_exec.push_error_at(e, position);
            return nulled_slot(meta_field.field_type.is_non_null());
        }
    };

    let field_type = executor.schema().make_type(&meta_field.field_type);
    match complete_value_async(&sub_exec, &field_type, &collected.selections, resolved).await {
        Ok(value) => Ok(value),
        Err(Nulled) => nulled_slot(meta_field.field_type.is_non_null()),
    }
}

fn complete_value_async<'x, CtxT, S>(
    executor: &'x Executor<'x, 'x, CtxT, S>,
    field_type: &'x TypeType<'x, CtxT, S>,
    selections: &'x [&'x Selection<'x, S>],
    resolved: Resolved<S>,
) -> BoxFuture<'x, Result<Value<S>, Nulled>>
where
    CtxT: Sync,
    S: ScalarValue,
{
    Box::pin(async move {
        match field_type {
            TypeType::NonNull(inner) => {
                match complete_value_async(executor, inner, selections, resolved).await {
                    Ok(value) if value.is_null() => {
                        executor.push_error(FieldError::from(format!(
                            "Cannot return null for non-nullable type \"{}\"",
                            field_type
                        )));
                        Err(Nulled)
                    }
                    other => other,
                }
            }
            _ if resolved.is_null() => Ok(Value::Null),
            TypeType::List(inner) => {
                let items = match resolved {
                    Resolved::List(items) => items,
                    Resolved::Value(Value::List(values)) => {
                        values.into_iter().map(Resolved::Value).collect()
                    }
                    _ => {
                        executor.push_error(FieldError::from(format!(
                            "Expected a list value for type \"{}\"",
                            field_type
                        )));
                        return Err(Nulled);
                    }
                };

                let mut completed = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let sub_exec = executor.index_sub_executor(index);
                    match complete_value_async(&sub_exec, inner, selections, item).await {
                        Ok(value) => completed.push(value),
                        Err(Nulled) => {
                            if inner.is_non_null() {
                                return Err(Nulled);
                            }
                            completed.push(Value::Null);
                        }
                    }
                }
                Ok(Value::List(completed))
            }
            TypeType::Concrete(meta) => match meta {
                MetaType::Scalar(scalar_meta) => complete_scalar(executor, scalar_meta, resolved),
                MetaType::Enum(enum_meta) => complete_enum(executor, enum_meta, resolved),
                MetaType::Object(_) => {
                    let instance = match resolved {
                        Resolved::Object(instance) => instance,
                        _ => {
                            executor.push_error(FieldError::from(
                                "Expected an object value for an object type",
                            ));
                            return Err(Nulled);
                        }
                    };

                    let runtime_meta = match executor
                        .schema()
                        .concrete_type_by_name(instance.type_name())
                    {
                        Some(MetaType::Object(obj)) => obj,
                        Some(_) => {
                            executor.push_error(FieldError::from(format!(
                                "Type \"{}\" is not an object type",
                                instance.type_name()
                            )));
                            return Err(Nulled);
                        }
                        None => {
                            executor.push_error(FieldError::from(format!(
                                "Type \"{}\" is not defined in the schema",
                                instance.type_name()
                            )));
                            return Err(Nulled);
                        }
                    };

                    resolve_selection_set_async(
                        runtime_meta,
                        instance.source(),
                        selections,
                        executor,
                        false,
                    )
                    .await
                    .map(Value::Object)
                }
                MetaType::InputObject(input_meta) => {
                    executor.push_error(FieldError::from(format!(
                        "Type \"{}\" cannot be used in output position",
                        input_meta.name
                    )));
                    Err(Nulled)
                }
            },
        }
    })
}
