//! Input value coercion
//!
//! Two call sites feed the executor with coerced values: variable values
//! arriving from the transport are coerced once per request, and argument
//! literals from the query are coerced per field invocation with variable
//! references already substituted. Both share the same recursive rules;
//! transport values are slightly more lenient because the wire format cannot
//! distinguish enums from strings or integral floats from integers.

use std::{error::Error, fmt};

use indexmap::IndexMap;

use crate::{
    ast::{Arguments as AstArguments, InputValue, Operation, Type},
    executor::Variables,
    schema::{
        meta::{Argument, EnumMeta, InputObjectMeta, MetaType, ScalarMeta},
        model::{Schema, TypeType},
    },
    span::Spanning,
    types::Arguments,
    value::ScalarValue,
};

/// An error produced while coercing an input value to its expected type
///
/// Coercion is all-or-nothing: the first failure aborts the whole
/// variable-map or argument-map coercion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoercionError {
    /// A required variable was not provided
    MissingVariable {
        /// The variable name, without the `$` prefix
        name: String,
        /// Display form of the declared type
        of_type: String,
    },
    /// A required argument was not provided
    MissingArgument {
        /// The argument name
        name: String,
        /// Display form of the declared type
        of_type: String,
    },
    /// A `null` (explicit or nested) reached a non-null type
    NonNull {
        /// Display form of the non-null type
        of_type: String,
    },
    /// A scalar value did not match the expected scalar type
    ScalarMismatch {
        /// Display form of the offending value
        value: String,
        /// The scalar type name
        of_type: String,
    },
    /// A value that is not an enum member name was provided for an enum type
    EnumMismatch {
        /// Display form of the offending value
        value: String,
        /// The enum type name
        of_type: String,
    },
    /// An input object carried a key that is not a declared field
    UnknownField {
        /// The unknown key
        name: String,
        /// The input object type name
        of_type: String,
    },
    /// A required input object field was neither provided nor defaulted
    MissingField {
        /// The missing field name
        name: String,
        /// The input object type name
        of_type: String,
    },
    /// The value shape did not match the expected type at all
    TypeMismatch {
        /// Display form of the offending value
        value: String,
        /// Display form of the expected type
        of_type: String,
    },
    /// A variable declared a type that is not registered in the schema
    UnknownType {
        /// The undefined type name
        name: String,
    },
    /// A variable declared a type that cannot be used in input position
    NotInput {
        /// The output-only type name
        name: String,
    },
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoercionError::MissingVariable { name, of_type } => write!(
                f,
                "Variable \"${}\" of required type \"{}\" was not provided",
                name, of_type
            ),
            CoercionError::MissingArgument { name, of_type } => write!(
                f,
                "Argument \"{}\" of required type \"{}\" was not provided",
                name, of_type
            ),
            CoercionError::NonNull { of_type } => {
                write!(f, "Type \"{}\" is not nullable", of_type)
            }
            CoercionError::ScalarMismatch { value, of_type }
            | CoercionError::TypeMismatch { value, of_type } => {
                write!(f, "Invalid value {} for type \"{}\"", value, of_type)
            }
            CoercionError::EnumMismatch { value, of_type } => {
                write!(f, "Invalid value {} for enum \"{}\"", value, of_type)
            }
            CoercionError::UnknownField { name, of_type } => write!(
                f,
                "Field \"{}\" does not exist on type \"{}\"",
                name, of_type
            ),
            CoercionError::MissingField { name, of_type } => {
                write!(f, "\"{}\" is missing fields: \"{}\"", of_type, name)
            }
            CoercionError::UnknownType { name } => {
                write!(f, "Type \"{}\" is not defined in the schema", name)
            }
            CoercionError::NotInput { name } => {
                write!(f, "Type \"{}\" cannot be used in input position", name)
            }
        }
    }
}

impl Error for CoercionError {}

/// Where a value being coerced came from
///
/// Transport values cannot express enums or variables, so strings act as
/// enum member names and integral floats act as integers. Literals from the
/// query document are stricter.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ValueOrigin {
    Transport,
    Literal,
}

/// Build the variable substitution map of an operation.
///
/// Each declared variable is either taken from `values` and coerced against
/// its declared type, replaced by its default literal, or defaulted to
/// `Null`. The resulting map contains exactly the declared variable names;
/// undeclared entries of `values` are ignored.
pub fn coerce_variable_values<CtxT, S>(
    schema: &Schema<CtxT, S>,
    operation: &Operation<'_, S>,
    values: &Variables<S>,
) -> Result<Variables<S>, CoercionError>
where
    S: ScalarValue,
{
    let mut substitutions = Variables::<S>::new();

    if let Some(defs) = &operation.variable_definitions {
        for (name, def) in defs.item.iter() {
            let var_type = make_input_type(schema, &def.var_type.item)?;

            match values.get(name.item) {
                Some(value) => {
                    let coerced =
                        coerce_input_value(schema, &var_type, value, ValueOrigin::Transport)?;
                    substitutions.insert(name.item.into(), coerced);
                }
                None => match &def.default_value {
                    Some(default) => {
                        substitutions.insert(name.item.into(), default.item.clone());
                    }
                    None if def.var_type.item.is_non_null() => {
                        return Err(CoercionError::MissingVariable {
                            name: name.item.into(),
                            of_type: def.var_type.item.to_string(),
                        });
                    }
                    None => {
                        substitutions.insert(name.item.into(), InputValue::Null);
                    }
                },
            }
        }
    }

    Ok(substitutions)
}

/// Build the coerced argument map of one field invocation.
///
/// `literals` are the argument literals attached to the field selection;
/// variable references are substituted from `variables` before coercion.
/// Missing arguments pick up their declared defaults.
pub fn coerce_argument_values<CtxT, S>(
    schema: &Schema<CtxT, S>,
    meta_args: &Option<Vec<Argument<S>>>,
    literals: Option<&Spanning<AstArguments<'_, S>>>,
    variables: &Variables<S>,
) -> Result<Arguments<S>, CoercionError>
where
    S: ScalarValue,
{
    let mut coerced = IndexMap::new();

    if let Some(meta_args) = meta_args {
        for arg in meta_args {
            let literal = literals
                .and_then(|args| args.item.get(&arg.name))
                .map(|s| s.item.clone())
                // An unresolvable variable reference acts like an absent
                // argument so that the default can apply.
                .and_then(|v| v.into_const(variables));

            match literal {
                Some(value) => {
                    let arg_type = schema.make_type(&arg.arg_type);
                    let value =
                        coerce_input_value(schema, &arg_type, &value, ValueOrigin::Literal)?;
                    coerced.insert(arg.name.clone(), value);
                }
                None => match &arg.default_value {
                    Some(default) => {
                        coerced.insert(arg.name.clone(), default.clone());
                    }
                    None if arg.arg_type.is_non_null() => {
                        return Err(CoercionError::MissingArgument {
                            name: arg.name.clone(),
                            of_type: arg.arg_type.to_string(),
                        });
                    }
                    None => {
                        coerced.insert(arg.name.clone(), InputValue::Null);
                    }
                },
            }
        }
    }

    Ok(Arguments::new(coerced))
}

/// Resolve a variable's declared type literal against the schema, rejecting
/// types that cannot appear in input position.
fn make_input_type<'s, CtxT, S>(
    schema: &'s Schema<CtxT, S>,
    literal: &Type<'_>,
) -> Result<TypeType<'s, CtxT, S>, CoercionError> {
    let name = literal.innermost_name();
    match schema.concrete_type_by_name(name) {
        None => Err(CoercionError::UnknownType { name: name.into() }),
        Some(meta) if !meta.is_input() => Err(CoercionError::NotInput { name: name.into() }),
        Some(_) => Ok(schema.make_type(literal)),
    }
}

fn coerce_input_value<CtxT, S>(
    schema: &Schema<CtxT, S>,
    expected: &TypeType<'_, CtxT, S>,
    value: &InputValue<S>,
    origin: ValueOrigin,
) -> Result<InputValue<S>, CoercionError>
where
    S: ScalarValue,
{
    match expected {
        TypeType::NonNull(inner) => {
            let coerced = coerce_input_value(schema, inner, value, origin)?;
            if coerced.is_null() {
                Err(CoercionError::NonNull {
                    of_type: expected.to_string(),
                })
            } else {
                Ok(coerced)
            }
        }
        _ if value.is_null() => Ok(InputValue::Null),
        TypeType::List(inner) => match value {
            InputValue::List(items) => {
                let coerced = items
                    .iter()
                    .map(|item| {
                        coerce_input_value(schema, inner, &item.item, origin)
                            .map(|v| Spanning::start_end(&item.start, &item.end, v))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(InputValue::parsed_list(coerced))
            }
            // A single value coerces to a list of one element.
            v => Ok(InputValue::list(vec![coerce_input_value(
                schema, inner, v, origin,
            )?])),
        },
        TypeType::Concrete(meta) => match meta {
            MetaType::Scalar(scalar) => coerce_scalar(scalar, value, origin),
            MetaType::Enum(enum_meta) => coerce_enum(enum_meta, value, origin),
            MetaType::InputObject(object_meta) => {
                coerce_input_object(schema, object_meta, value, origin)
            }
            MetaType::Object(object_meta) => Err(CoercionError::NotInput {
                name: object_meta.name.clone(),
            }),
        },
    }
}

fn coerce_scalar<S>(
    meta: &ScalarMeta,
    value: &InputValue<S>,
    origin: ValueOrigin,
) -> Result<InputValue<S>, CoercionError>
where
    S: ScalarValue,
{
    let mismatch = || CoercionError::ScalarMismatch {
        value: value.to_string(),
        of_type: meta.name.clone(),
    };

    match meta.name.as_str() {
        "Boolean" => value
            .as_boolean_value()
            .map(InputValue::scalar)
            .ok_or_else(mismatch),
        "String" => value
            .as_string_value()
            .map(|s| InputValue::scalar(s.to_owned()))
            .ok_or_else(mismatch),
        "ID" => {
            if let Some(s) = value.as_string_value() {
                Ok(InputValue::scalar(s.to_owned()))
            } else if let Some(i) = value.as_int_value() {
                // Integer identifiers canonicalize to decimal strings.
                Ok(InputValue::scalar(i.to_string()))
            } else {
                Err(mismatch())
            }
        }
        "Int" => {
            if let Some(i) = value.as_int_value() {
                Ok(InputValue::scalar(i))
            } else if origin == ValueOrigin::Transport {
                // The wire format cannot tell `3` from `3.0`, so integral
                // in-range floats are accepted; fractional or out-of-range
                // numbers are not.
                match value.as_float_value() {
                    Some(f)
                        if f.fract() == 0.0
                            && f >= f64::from(i32::MIN)
                            && f <= f64::from(i32::MAX) =>
                    {
                        Ok(InputValue::scalar(f as i32))
                    }
                    _ => Err(mismatch()),
                }
            } else {
                Err(mismatch())
            }
        }
        "Float" => value
            .as_float_value()
            .map(InputValue::scalar)
            .ok_or_else(mismatch),
        // Custom scalar: accept any scalar value as-is.
        _ => value
            .as_scalar()
            .map(|s| InputValue::Scalar(s.clone()))
            .ok_or_else(mismatch),
    }
}

fn coerce_enum<S>(
    meta: &EnumMeta,
    value: &InputValue<S>,
    origin: ValueOrigin,
) -> Result<InputValue<S>, CoercionError>
where
    S: ScalarValue,
{
    match value {
        InputValue::Enum(name) => Ok(InputValue::enum_value(name)),
        // Transport values carry enum members as plain strings. Membership
        // is not verified at this point.
        InputValue::Scalar(s) if origin == ValueOrigin::Transport => match s.as_str() {
            Some(name) => Ok(InputValue::enum_value(name)),
            None => Err(CoercionError::EnumMismatch {
                value: value.to_string(),
                of_type: meta.name.clone(),
            }),
        },
        _ => Err(CoercionError::EnumMismatch {
            value: value.to_string(),
            of_type: meta.name.clone(),
        }),
    }
}

fn coerce_input_object<CtxT, S>(
    schema: &Schema<CtxT, S>,
    meta: &InputObjectMeta<S>,
    value: &InputValue<S>,
    origin: ValueOrigin,
) -> Result<InputValue<S>, CoercionError>
where
    S: ScalarValue,
{
    let provided = match value.to_object_value() {
        Some(obj) => obj,
        None => {
            return Err(CoercionError::TypeMismatch {
                value: value.to_string(),
                of_type: meta.name.clone(),
            });
        }
    };

    for key in provided.keys() {
        if meta.input_field_by_name(key).is_none() {
            return Err(CoercionError::UnknownField {
                name: (*key).into(),
                of_type: meta.name.clone(),
            });
        }
    }

    let mut coerced = IndexMap::with_capacity(meta.input_fields.len());
    for field in &meta.input_fields {
        match provided.get(field.name.as_str()) {
            Some(v) => {
                let field_type = schema.make_type(&field.arg_type);
                coerced.insert(
                    field.name.clone(),
                    coerce_input_value(schema, &field_type, v, origin)?,
                );
            }
            None => match &field.default_value {
                Some(default) => {
                    coerced.insert(field.name.clone(), default.clone());
                }
                None if field.arg_type.is_non_null() => {
                    return Err(CoercionError::MissingField {
                        name: field.name.clone(),
                        of_type: meta.name.clone(),
                    });
                }
                None => {
                    coerced.insert(field.name.clone(), InputValue::Null);
                }
            },
        }
    }

    Ok(InputValue::object(coerced))
}
