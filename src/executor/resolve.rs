//! Synchronous selection-set resolution
//!
//! Resolution happens in two phases. Field collection flattens the selection
//! set against the current object type: directives gate inclusion, fragments
//! expand (guarded against recursion) and duplicate response names merge
//! their sub-selections. Field execution then runs each grouped entry once
//! and completes the resolver outcome against the field's declared type.

use indexmap::{map::Entry, IndexMap};

use crate::{
    ast::{Directive, Field as AstField, Selection},
    coercion::coerce_argument_values,
    executor::{Executor, FieldError, Variables},
    schema::{
        meta::{EnumMeta, MetaType, ObjectMeta, ScalarMeta},
        model::TypeType,
    },
    span::Spanning,
    types::{FieldResolver, Resolved, SourceValue},
    value::{Object, ScalarValue, Value},
};

/// Marker for a `null` that crossed a non-null barrier
///
/// The error has already been recorded at its originating path; consumers
/// either absorb the `null` (when their slot is nullable) or keep bubbling.
pub(crate) struct Nulled;

/// One grouped entry of a collected selection set
pub(crate) struct CollectedField<'r, 'a, S> {
    /// First occurrence of this response name, in source order
    pub(crate) field: &'r Spanning<AstField<'a, S>>,
    /// Concatenated sub-selections of every merged occurrence
    pub(crate) selections: Vec<&'r Selection<'a, S>>,
}

/// Flatten `selection_set` against the object type named `type_name`.
///
/// `spread_stack` holds the names of the named fragments currently being
/// expanded; re-entering one of them contributes nothing.
pub(crate) fn collect_fields<'r, 'a, CtxT, S>(
    executor: &Executor<'r, 'a, CtxT, S>,
    type_name: &str,
    selection_set: &[&'r Selection<'a, S>],
    spread_stack: &mut Vec<&'a str>,
    grouped: &mut IndexMap<&'a str, CollectedField<'r, 'a, S>>,
) where
    S: ScalarValue,
{
    for &selection in selection_set {
        match selection {
            Selection::Field(spanned) => {
                let f = &spanned.item;
                if is_excluded(&f.directives, executor.variables()) {
                    continue;
                }

                let response_name = f.alias.as_ref().unwrap_or(&f.name).item;

                match grouped.entry(response_name) {
                    Entry::Occupied(mut entry) => {
                        if let Some(sub) = &f.selection_set {
                            entry.get_mut().selections.extend(sub.iter());
                        }
                    }
                    Entry::Vacant(entry) => {
                        let selections = f
                            .selection_set
                            .as_ref()
                            .map(|sub| sub.iter().collect())
                            .unwrap_or_default();
                        entry.insert(CollectedField {
                            field: spanned,
                            selections,
                        });
                    }
                }
            }
            Selection::FragmentSpread(spanned) => {
                let spread = &spanned.item;
                if is_excluded(&spread.directives, executor.variables()) {
                    continue;
                }
                if spread_stack.contains(&spread.name.item) {
                    // Recursive spread: skip silently.
                    continue;
                }

                match executor.fragment_by_name(spread.name.item) {
                    None => {
                        executor.push_error_at(
                            FieldError::from(format!(
                                "Unknown fragment \"{}\"",
                                spread.name.item
                            )),
                            spanned.start,
                        );
                    }
                    Some(fragment) => {
                        if fragment.type_condition.item == type_name {
                            let sub: Vec<_> = fragment.selection_set.iter().collect();
                            spread_stack.push(spread.name.item);
                            collect_fields(executor, type_name, &sub, spread_stack, grouped);
                            spread_stack.pop();
                        }
                    }
                }
            }
            Selection::InlineFragment(spanned) => {
                let fragment = &spanned.item;
                if is_excluded(&fragment.directives, executor.variables()) {
                    continue;
                }

                let applies = match &fragment.type_condition {
                    Some(condition) => condition.item == type_name,
                    None => true,
                };
                if applies {
                    let sub: Vec<_> = fragment.selection_set.iter().collect();
                    collect_fields(executor, type_name, &sub, spread_stack, grouped);
                }
            }
        }
    }
}

/// Evaluate the `@skip`/`@include` directives attached to a selection.
///
/// A malformed condition leaves the directive inert; validating the argument
/// is a separate phase.
pub(crate) fn is_excluded<S>(
    directives: &Option<Vec<Spanning<Directive<S>>>>,
    vars: &Variables<S>,
) -> bool
where
    S: ScalarValue,
{
    if let Some(directives) = directives {
        for directive in directives {
            let condition = directive
                .item
                .arguments
                .iter()
                .flat_map(|args| args.item.get("if"))
                .filter_map(|v| v.item.clone().into_const(vars))
                .find_map(|v| v.as_boolean_value());

            match (directive.item.name.item, condition) {
                ("skip", Some(true)) | ("include", Some(false)) => return true,
                _ => (),
            }
        }
    }
    false
}

/// Resolve `selection_set` against the object backed by `source`, writing
/// response values into `result`.
///
/// Returns `false` when a `null` crossed a non-null field whose enclosing
/// object must therefore become `null` itself.
pub(crate) fn resolve_selection_set_into<'r, 'a, CtxT, S>(
    object_meta: &ObjectMeta<CtxT, S>,
    source: &SourceValue,
    selection_set: &[&'r Selection<'a, S>],
    executor: &Executor<'r, 'a, CtxT, S>,
    result: &mut Object<S>,
) -> bool
where
    S: ScalarValue,
{
    let mut grouped = IndexMap::new();
    let mut spread_stack = Vec::new();
    collect_fields(
        executor,
        &object_meta.name,
        selection_set,
        &mut spread_stack,
        &mut grouped,
    );

    for (&response_name, collected) in &grouped {
        match execute_field(object_meta, source, response_name, collected, executor) {
            Ok(value) => {
                result.add_field(response_name, value);
            }
            Err(Nulled) => return false,
        }
    }

    true
}

/// Run one grouped field entry: look up the definition, coerce arguments,
/// invoke the resolver and complete the outcome.
///
/// `Err(Nulled)` means the enclosing object must be nulled; recoverable
/// failures surface as `Ok(Value::Null)` with the error recorded.
fn execute_field<'r, 'a, CtxT, S>(
    object_meta: &ObjectMeta<CtxT, S>,
    source: &SourceValue,
    response_name: &'a str,
    collected: &CollectedField<'r, 'a, S>,
    executor: &Executor<'r, 'a, CtxT, S>,
) -> Result<Value<S>, Nulled>
where
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
        FieldResolver::Async(_) => Err(FieldError::from(format!(
            "field {} requires asynchronous execution.",
            f.name.item
        ))),
    };

    let resolved = match outcome {
        Ok(resolved) => resolved,
        Err(e) => {
            sub_exec.push_error_at(e, position);
            return nulled_slot(meta_field.field_type.is_non_null());
        }
    };

    let field_type = executor.schema().make_type(&meta_field.field_type);
    match complete_value(&sub_exec, &field_type, &collected.selections, resolved) {
        Ok(value) => Ok(value),
        Err(Nulled) => nulled_slot(meta_field.field_type.is_non_null()),
    }
}

/// Absorb a nulled value at a field or element slot of the given
/// nullability, or keep bubbling.
pub(crate) fn nulled_slot<S>(is_non_null: bool) -> Result<Value<S>, Nulled> {
    if is_non_null {
        Err(Nulled)
    } else {
        Ok(Value::Null)
    }
}

/// Complete a resolver outcome against the declared type of its slot.
///
/// All completion errors are recorded here, at the path where they
/// originate; `Err(Nulled)` carries only the fact that a `null` is bubbling.
pub(crate) fn complete_value<'r, 'a, CtxT, S>(
    executor: &Executor<'r, 'a, CtxT, S>,
    field_type: &TypeType<'_, CtxT, S>,
    selections: &[&'r Selection<'a, S>],
    resolved: Resolved<S>,
) -> Result<Value<S>, Nulled>
where
    S: ScalarValue,
{
    match field_type {
        TypeType::NonNull(inner) => {
            match complete_value(executor, inner, selections, resolved) {
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
                match complete_value(&sub_exec, inner, selections, item) {
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
            MetaType::Object(_) => complete_object(executor, selections, resolved),
            MetaType::InputObject(input_meta) => {
                executor.push_error(FieldError::from(format!(
                    "Type \"{}\" cannot be used in output position",
                    input_meta.name
                )));
                Err(Nulled)
            }
        },
    }
}

/// Coerce a leaf outcome to the canonical shape of a scalar type.
pub(crate) fn complete_scalar<'r, 'a, CtxT, S>(
    executor: &Executor<'r, 'a, CtxT, S>,
    meta: &ScalarMeta,
    resolved: Resolved<S>,
) -> Result<Value<S>, Nulled>
where
    S: ScalarValue,
{
    let scalar = match resolved {
        Resolved::Value(Value::Scalar(s)) => s,
        _ => {
            executor.push_error(FieldError::from(format!(
                "Expected a scalar value for type \"{}\"",
                meta.name
            )));
            return Err(Nulled);
        }
    };

    let canonical = match meta.name.as_str() {
        "Int" => scalar.as_int().map(Value::scalar),
        "Float" => scalar.as_float().map(Value::scalar),
        "String" => scalar.into_string().map(Value::scalar),
        "Boolean" => scalar.as_boolean().map(Value::scalar),
        "ID" => match scalar.as_int() {
            Some(i) => Some(Value::scalar(i.to_string())),
            None => scalar.into_string().map(Value::scalar),
        },
        // Custom scalar: any scalar shape is accepted as-is.
        _ => Some(Value::Scalar(scalar)),
    };

    match canonical {
        Some(value) => Ok(value),
        None => {
            executor.push_error(FieldError::from(format!(
                "Invalid value for scalar \"{}\"",
                meta.name
            )));
            Err(Nulled)
        }
    }
}

/// Verify an enum outcome against the membership of its type.
pub(crate) fn complete_enum<'r, 'a, CtxT, S>(
    executor: &Executor<'r, 'a, CtxT, S>,
    meta: &EnumMeta,
    resolved: Resolved<S>,
) -> Result<Value<S>, Nulled>
where
    S: ScalarValue,
{
    let name = match &resolved {
        Resolved::Value(Value::Scalar(s)) => s.as_str().map(str::to_owned),
        _ => None,
    };

    match name {
        Some(name) if meta.has_value(&name) => Ok(Value::scalar(name)),
        Some(name) => {
            executor.push_error(FieldError::from(format!(
                "Invalid value \"{}\" for enum \"{}\"",
                name, meta.name
            )));
            Err(Nulled)
        }
        None => {
            executor.push_error(FieldError::from(format!(
                "Expected a string value for enum \"{}\"",
                meta.name
            )));
            Err(Nulled)
        }
    }
}

/// Resolve the sub-selection of an object outcome against its runtime type.
///
/// The instance's own type name decides which object definition the
/// selection is matched against; the declared field type only contributes
/// the list and non-null wrappers around it.
fn complete_object<'r, 'a, CtxT, S>(
    executor: &Executor<'r, 'a, CtxT, S>,
    selections: &[&'r Selection<'a, S>],
    resolved: Resolved<S>,
) -> Result<Value<S>, Nulled>
where
    S: ScalarValue,
{
    let instance = match resolved {
        Resolved::Object(instance) => instance,
        _ => {
            executor.push_error(FieldError::from(
                "Expected an object value for an object type",
            ));
            return Err(Nulled);
        }
    };

    let runtime_meta = match executor.schema().concrete_type_by_name(instance.type_name()) {
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

    let mut result = Object::with_capacity(selections.len());
    if resolve_selection_set_into(
        runtime_meta,
        instance.source(),
        selections,
        executor,
        &mut result,
    ) {
        Ok(Value::Object(result))
    } else {
        Err(Nulled)
    }
}
