//! Query document syntax tree
//!
//! The lexer and parser for the query language live outside of this crate;
//! what execution consumes is the tree of types in this module. Every node
//! also has unlocated builder constructors so that documents can be put
//! together programmatically, e.g. by tests or by a transport that receives
//! pre-parsed queries.

use std::{borrow::Cow, fmt, slice, vec};

use indexmap::IndexMap;

use crate::{
    executor::Variables,
    span::Spanning,
    value::{DefaultScalarValue, ScalarValue},
};

/// A type literal in the syntax tree
///
/// This enum carries no semantic information and might refer to types that
/// do not exist.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Type<'a> {
    /// A nullable named type, e.g. `String`
    Named(Cow<'a, str>),
    /// A nullable list type, e.g. `[String]`
    ///
    /// The list itself is what's nullable, the containing type might be
    /// non-null.
    List(Box<Type<'a>>),
    /// A non-null named type, e.g. `String!`
    NonNullNamed(Cow<'a, str>),
    /// A non-null list type, e.g. `[String]!`
    NonNullList(Box<Type<'a>>),
}

impl<'a> Type<'a> {
    /// Get the name of a named type.
    ///
    /// Only applies to named types; lists will return `None`.
    pub fn name(&self) -> Option<&str> {
        match self {
            Type::Named(n) | Type::NonNullNamed(n) => Some(n),
            _ => None,
        }
    }

    /// Get the innermost name by unpacking lists
    ///
    /// All type literals contain exactly one named type.
    pub fn innermost_name(&self) -> &str {
        match self {
            Type::Named(n) | Type::NonNullNamed(n) => n,
            Type::List(l) | Type::NonNullList(l) => l.innermost_name(),
        }
    }

    /// Determines if a type only can represent non-null values.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNullNamed(_) | Type::NonNullList(_))
    }
}

impl<'a> fmt::Display for Type<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Named(n) => write!(f, "{}", n),
            Type::NonNullNamed(n) => write!(f, "{}!", n),
            Type::List(t) => write!(f, "[{}]", t),
            Type::NonNullList(t) => write!(f, "[{}]!", t),
        }
    }
}

/// A JSON-like value that can be passed into the query execution, either
/// out-of-band, or in-band as default variable values. These are _not_
/// constant and might contain variables.
///
/// List and object variants are _spanned_: they reference their position in
/// the source file, if available.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum InputValue<S = DefaultScalarValue> {
    Null,
    Scalar(S),
    Enum(String),
    Variable(String),
    List(Vec<Spanning<InputValue<S>>>),
    Object(Vec<(Spanning<String>, Spanning<InputValue<S>>)>),
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct VariableDefinition<'a, S> {
    pub var_type: Spanning<Type<'a>>,
    pub default_value: Option<Spanning<InputValue<S>>>,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Arguments<'a, S> {
    pub items: Vec<(Spanning<&'a str>, Spanning<InputValue<S>>)>,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct VariableDefinitions<'a, S> {
    pub items: Vec<(Spanning<&'a str>, VariableDefinition<'a, S>)>,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Field<'a, S> {
    pub alias: Option<Spanning<&'a str>>,
    pub name: Spanning<&'a str>,
    pub arguments: Option<Spanning<Arguments<'a, S>>>,
    pub directives: Option<Vec<Spanning<Directive<'a, S>>>>,
    pub selection_set: Option<Vec<Selection<'a, S>>>,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct FragmentSpread<'a, S> {
    pub name: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a, S>>>>,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct InlineFragment<'a, S> {
    pub type_condition: Option<Spanning<&'a str>>,
    pub directives: Option<Vec<Spanning<Directive<'a, S>>>>,
    pub selection_set: Vec<Selection<'a, S>>,
}

/// Entry in a GraphQL selection set
///
/// This enum represents one of the three variants of a selection that exists
/// in GraphQL: a field, a fragment spread, or an inline fragment. Each of the
/// variants references their location in the query source.
///
/// ```text
/// {
///   field(withArg: 123) { subField }
///   ...fragmentSpread
///   ...on User {
///     inlineFragmentField
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Selection<'a, S = DefaultScalarValue> {
    Field(Spanning<Field<'a, S>>),
    FragmentSpread(Spanning<FragmentSpread<'a, S>>),
    InlineFragment(Spanning<InlineFragment<'a, S>>),
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Directive<'a, S> {
    pub name: Spanning<&'a str>,
    pub arguments: Option<Spanning<Arguments<'a, S>>>,
}

#[derive(Clone, PartialEq, Eq, Debug, Copy)]
#[allow(missing_docs)]
pub enum OperationType {
    Query,
    Mutation,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Operation<'a, S> {
    pub operation_type: OperationType,
    pub name: Option<Spanning<&'a str>>,
    pub variable_definitions: Option<Spanning<VariableDefinitions<'a, S>>>,
    pub directives: Option<Vec<Spanning<Directive<'a, S>>>>,
    pub selection_set: Vec<Selection<'a, S>>,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Fragment<'a, S> {
    pub name: Spanning<&'a str>,
    pub type_condition: Spanning<&'a str>,
    pub directives: Option<Vec<Spanning<Directive<'a, S>>>>,
    pub selection_set: Vec<Selection<'a, S>>,
}

#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Definition<'a, S> {
    Operation(Spanning<Operation<'a, S>>),
    Fragment(Spanning<Fragment<'a, S>>),
}

#[allow(missing_docs)]
pub type Document<'a, S> = [Definition<'a, S>];
#[allow(missing_docs)]
pub type OwnedDocument<'a, S> = Vec<Definition<'a, S>>;

/// Parse an unstructured input value into a Rust data type.
///
/// The conversion _can_ fail, and must in that case return `None`. Implemented
/// for the primitive scalar representations, `Option` and `Vec` so that
/// resolvers can extract coerced arguments directly.
pub trait FromInputValue<S = DefaultScalarValue>: Sized {
    /// Performs the conversion.
    fn from_input_value(v: &InputValue<S>) -> Option<Self>;
}

impl<S> InputValue<S> {
    /// Construct a `null` value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Construct a scalar value.
    pub fn scalar<T>(v: T) -> Self
    where
        S: From<T>,
    {
        Self::Scalar(v.into())
    }

    /// Construct an enum value.
    pub fn enum_value<T: AsRef<str>>(s: T) -> Self {
        Self::Enum(s.as_ref().into())
    }

    /// Construct a variable reference.
    pub fn variable<T: AsRef<str>>(v: T) -> Self {
        Self::Variable(v.as_ref().into())
    }

    /// Construct an unlocated list.
    ///
    /// Convenience function to make each [`InputValue`] in the input vector
    /// not contain any location information, for use where no source code
    /// position is available.
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l.into_iter().map(Spanning::unlocated).collect())
    }

    /// Construct a located list.
    pub fn parsed_list(l: Vec<Spanning<Self>>) -> Self {
        Self::List(l)
    }

    /// Construct an unlocated object.
    pub fn object<K>(o: IndexMap<K, Self>) -> Self
    where
        K: AsRef<str>,
    {
        Self::Object(
            o.into_iter()
                .map(|(k, v)| {
                    (
                        Spanning::unlocated(k.as_ref().into()),
                        Spanning::unlocated(v),
                    )
                })
                .collect(),
        )
    }

    /// Construct a located object.
    pub fn parsed_object(o: Vec<(Spanning<String>, Spanning<Self>)>) -> Self {
        Self::Object(o)
    }

    /// Resolve all variables of this [`InputValue`] to their actual `values`.
    ///
    /// If a variable is not present in the `values`:
    /// - Returns `None` in case this is an [`InputValue::Variable`].
    /// - Skips the field in case of an [`InputValue::Object`] field.
    /// - Replaces with an [`InputValue::Null`] in case of an
    ///   [`InputValue::List`] element.
    ///
    /// A variable or an object field can pick up a default value later, while
    /// a single list element cannot.
    #[must_use]
    pub fn into_const(self, values: &Variables<S>) -> Option<Self>
    where
        S: Clone,
    {
        match self {
            Self::Variable(v) => values.get(&v).cloned(),
            Self::List(l) => Some(Self::List(
                l.into_iter()
                    .map(|s| s.map(|v| v.into_const(values).unwrap_or_else(Self::null)))
                    .collect(),
            )),
            Self::Object(o) => Some(Self::Object(
                o.into_iter()
                    .filter_map(|(sk, sv)| sv.and_then(|v| v.into_const(values)).map(|sv| (sk, sv)))
                    .collect(),
            )),
            v => Some(v),
        }
    }

    /// Shorthand form of invoking [`FromInputValue::from_input_value()`].
    pub fn convert<T: FromInputValue<S>>(&self) -> Option<T> {
        T::from_input_value(self)
    }

    /// Does the value represent a `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Does the value represent a variable reference?
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// View the underlying enum value, if present.
    pub fn as_enum_value(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e.as_str()),
            _ => None,
        }
    }

    /// View the underlying scalar value, if present.
    pub fn as_scalar(&self) -> Option<&S> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// View the underlying int value, if present.
    pub fn as_int_value(&self) -> Option<i32>
    where
        S: ScalarValue,
    {
        self.as_scalar().and_then(ScalarValue::as_int)
    }

    /// View the underlying float value, if present.
    pub fn as_float_value(&self) -> Option<f64>
    where
        S: ScalarValue,
    {
        self.as_scalar().and_then(ScalarValue::as_float)
    }

    /// View the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str>
    where
        S: ScalarValue,
    {
        self.as_scalar().and_then(ScalarValue::as_str)
    }

    /// View the underlying boolean value, if present.
    pub fn as_boolean_value(&self) -> Option<bool>
    where
        S: ScalarValue,
    {
        self.as_scalar().and_then(ScalarValue::as_boolean)
    }

    /// Convert this [`InputValue`] to a map of object field values.
    pub fn to_object_value(&self) -> Option<IndexMap<&str, &Self>> {
        match self {
            Self::Object(o) => Some(
                o.iter()
                    .map(|(sk, sv)| (sk.item.as_str(), &sv.item))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Convert this [`InputValue`] to a list of element values.
    pub fn to_list_value(&self) -> Option<Vec<&Self>> {
        match self {
            Self::List(l) => Some(l.iter().map(|s| &s.item).collect()),
            _ => None,
        }
    }

    /// Recursively find all variable references.
    pub fn referenced_variables(&self) -> Vec<&str> {
        match self {
            Self::Variable(name) => vec![name.as_str()],
            Self::List(l) => l
                .iter()
                .flat_map(|v| v.item.referenced_variables())
                .collect(),
            Self::Object(o) => o
                .iter()
                .flat_map(|(_, v)| v.item.referenced_variables())
                .collect(),
            _ => vec![],
        }
    }

    /// Compare equality with another [`InputValue`] ignoring any source
    /// position information.
    pub fn unlocated_eq(&self, other: &Self) -> bool
    where
        S: PartialEq,
    {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Scalar(s1), Self::Scalar(s2)) => s1 == s2,
            (Self::Enum(s1), Self::Enum(s2)) | (Self::Variable(s1), Self::Variable(s2)) => s1 == s2,
            (Self::List(l1), Self::List(l2)) => {
                l1.len() == l2.len()
                    && l1
                        .iter()
                        .zip(l2.iter())
                        .all(|(v1, v2)| v1.item.unlocated_eq(&v2.item))
            }
            (Self::Object(o1), Self::Object(o2)) => {
                o1.len() == o2.len()
                    && o1.iter().all(|(sk1, sv1)| {
                        o2.iter().any(|(sk2, sv2)| {
                            sk1.item == sk2.item && sv1.item.unlocated_eq(&sv2.item)
                        })
                    })
            }
            _ => false,
        }
    }
}

impl<S: ScalarValue> fmt::Display for InputValue<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Scalar(s) => {
                if let Some(s) = s.as_str() {
                    write!(f, "\"{}\"", s)
                } else {
                    write!(f, "{}", s)
                }
            }
            Self::Enum(v) => write!(f, "{}", v),
            Self::Variable(v) => write!(f, "${}", v),
            Self::List(v) => {
                write!(f, "[")?;
                for (i, spanning) in v.iter().enumerate() {
                    spanning.item.fmt(f)?;
                    if i < v.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "]")
            }
            Self::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    write!(f, "{}: ", k.item)?;
                    v.item.fmt(f)?;
                    if i < o.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

impl<S, T> From<Option<T>> for InputValue<S>
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

impl<'a, S: From<String>> From<&'a str> for InputValue<S> {
    fn from(s: &'a str) -> Self {
        Self::scalar(s.to_owned())
    }
}

impl<S: From<String>> From<String> for InputValue<S> {
    fn from(s: String) -> Self {
        Self::scalar(s)
    }
}

impl<S: From<i32>> From<i32> for InputValue<S> {
    fn from(i: i32) -> Self {
        Self::scalar(i)
    }
}

impl<S: From<f64>> From<f64> for InputValue<S> {
    fn from(f: f64) -> Self {
        Self::scalar(f)
    }
}

impl<S: From<bool>> From<bool> for InputValue<S> {
    fn from(b: bool) -> Self {
        Self::scalar(b)
    }
}

impl<'a, S> Arguments<'a, S> {
    #[allow(missing_docs)]
    pub fn into_iter(self) -> vec::IntoIter<(Spanning<&'a str>, Spanning<InputValue<S>>)> {
        self.items.into_iter()
    }

    #[allow(missing_docs)]
    pub fn iter(&self) -> slice::Iter<(Spanning<&'a str>, Spanning<InputValue<S>>)> {
        self.items.iter()
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the value of the first argument with the given name, if any.
    pub fn get(&self, key: &str) -> Option<&Spanning<InputValue<S>>> {
        self.items
            .iter()
            .filter(|&(k, _)| k.item == key)
            .map(|(_, v)| v)
            .next()
    }
}

impl<'a, S> VariableDefinitions<'a, S> {
    #[allow(missing_docs)]
    pub fn iter(&self) -> slice::Iter<(Spanning<&'a str>, VariableDefinition<'a, S>)> {
        self.items.iter()
    }
}

impl<'a, S> Field<'a, S> {
    /// Start building an unlocated field selection.
    pub fn new(name: &'a str) -> Self {
        Field {
            alias: None,
            name: Spanning::unlocated(name),
            arguments: None,
            directives: None,
            selection_set: None,
        }
    }

    /// Set the response alias of this field.
    #[must_use]
    pub fn alias(mut self, alias: &'a str) -> Self {
        self.alias = Some(Spanning::unlocated(alias));
        self
    }

    /// Add an argument literal to this field.
    #[must_use]
    pub fn argument(mut self, name: &'a str, value: InputValue<S>) -> Self {
        let item = (Spanning::unlocated(name), Spanning::unlocated(value));
        match &mut self.arguments {
            Some(args) => args.item.items.push(item),
            None => {
                self.arguments = Some(Spanning::unlocated(Arguments { items: vec![item] }));
            }
        }
        self
    }

    /// Attach a directive to this field.
    #[must_use]
    pub fn directive(mut self, directive: Directive<'a, S>) -> Self {
        self.directives
            .get_or_insert_with(Vec::new)
            .push(Spanning::unlocated(directive));
        self
    }

    /// Set the sub-selections of this field.
    #[must_use]
    pub fn selection_set(mut self, selections: Vec<Selection<'a, S>>) -> Self {
        self.selection_set = Some(selections);
        self
    }

    /// Wrap this field into a [`Selection`].
    pub fn into_selection(self) -> Selection<'a, S> {
        Selection::Field(Spanning::unlocated(self))
    }
}

impl<'a, S> Directive<'a, S> {
    /// Start building an unlocated directive.
    pub fn new(name: &'a str) -> Self {
        Directive {
            name: Spanning::unlocated(name),
            arguments: None,
        }
    }

    /// Add an argument literal to this directive.
    #[must_use]
    pub fn argument(mut self, name: &'a str, value: InputValue<S>) -> Self {
        let item = (Spanning::unlocated(name), Spanning::unlocated(value));
        match &mut self.arguments {
            Some(args) => args.item.items.push(item),
            None => {
                self.arguments = Some(Spanning::unlocated(Arguments { items: vec![item] }));
            }
        }
        self
    }
}

impl<'a, S> FragmentSpread<'a, S> {
    /// Build an unlocated spread of the named fragment.
    pub fn new(name: &'a str) -> Self {
        FragmentSpread {
            name: Spanning::unlocated(name),
            directives: None,
        }
    }

    /// Attach a directive to this spread.
    #[must_use]
    pub fn directive(mut self, directive: Directive<'a, S>) -> Self {
        self.directives
            .get_or_insert_with(Vec::new)
            .push(Spanning::unlocated(directive));
        self
    }

    /// Wrap this spread into a [`Selection`].
    pub fn into_selection(self) -> Selection<'a, S> {
        Selection::FragmentSpread(Spanning::unlocated(self))
    }
}

impl<'a, S> InlineFragment<'a, S> {
    /// Build an unlocated inline fragment.
    ///
    /// A `type_condition` of `None` is the untyped `... { … }` form.
    pub fn new(type_condition: Option<&'a str>, selection_set: Vec<Selection<'a, S>>) -> Self {
        InlineFragment {
            type_condition: type_condition.map(Spanning::unlocated),
            directives: None,
            selection_set,
        }
    }

    /// Attach a directive to this fragment.
    #[must_use]
    pub fn directive(mut self, directive: Directive<'a, S>) -> Self {
        self.directives
            .get_or_insert_with(Vec::new)
            .push(Spanning::unlocated(directive));
        self
    }

    /// Wrap this fragment into a [`Selection`].
    pub fn into_selection(self) -> Selection<'a, S> {
        Selection::InlineFragment(Spanning::unlocated(self))
    }
}

impl<'a, S> Fragment<'a, S> {
    /// Build an unlocated named fragment definition.
    pub fn new(
        name: &'a str,
        type_condition: &'a str,
        selection_set: Vec<Selection<'a, S>>,
    ) -> Self {
        Fragment {
            name: Spanning::unlocated(name),
            type_condition: Spanning::unlocated(type_condition),
            directives: None,
            selection_set,
        }
    }

    /// Wrap this fragment into a document [`Definition`].
    pub fn into_definition(self) -> Definition<'a, S> {
        Definition::Fragment(Spanning::unlocated(self))
    }
}

impl<'a, S> Operation<'a, S> {
    /// Start building an unlocated operation with the given selection set.
    pub fn new(operation_type: OperationType, selection_set: Vec<Selection<'a, S>>) -> Self {
        Operation {
            operation_type,
            name: None,
            variable_definitions: None,
            directives: None,
            selection_set,
        }
    }

    /// Name this operation.
    #[must_use]
    pub fn name(mut self, name: &'a str) -> Self {
        self.name = Some(Spanning::unlocated(name));
        self
    }

    /// Declare a variable on this operation.
    #[must_use]
    pub fn variable(
        mut self,
        name: &'a str,
        var_type: Type<'a>,
        default_value: Option<InputValue<S>>,
    ) -> Self {
        let def = VariableDefinition {
            var_type: Spanning::unlocated(var_type),
            default_value: default_value.map(Spanning::unlocated),
        };
        let item = (Spanning::unlocated(name), def);
        match &mut self.variable_definitions {
            Some(defs) => defs.item.items.push(item),
            None => {
                self.variable_definitions =
                    Some(Spanning::unlocated(VariableDefinitions { items: vec![item] }));
            }
        }
        self
    }

    /// Wrap this operation into a document [`Definition`].
    pub fn into_definition(self) -> Definition<'a, S> {
        Definition::Operation(Spanning::unlocated(self))
    }
}

impl<S: ScalarValue> FromInputValue<S> for i32 {
    fn from_input_value(v: &InputValue<S>) -> Option<i32> {
        v.as_int_value()
    }
}

impl<S: ScalarValue> FromInputValue<S> for f64 {
    fn from_input_value(v: &InputValue<S>) -> Option<f64> {
        v.as_float_value()
    }
}

impl<S: ScalarValue> FromInputValue<S> for String {
    fn from_input_value(v: &InputValue<S>) -> Option<String> {
        v.as_string_value().map(Into::into)
    }
}

impl<S: ScalarValue> FromInputValue<S> for bool {
    fn from_input_value(v: &InputValue<S>) -> Option<bool> {
        v.as_boolean_value()
    }
}

impl<S, T> FromInputValue<S> for Option<T>
where
    T: FromInputValue<S>,
{
    fn from_input_value(v: &InputValue<S>) -> Option<Option<T>> {
        match v {
            InputValue::Null => Some(None),
            v => T::from_input_value(v).map(Some),
        }
    }
}

impl<S, T> FromInputValue<S> for Vec<T>
where
    T: FromInputValue<S>,
{
    fn from_input_value(v: &InputValue<S>) -> Option<Vec<T>> {
        match v {
            InputValue::List(l) => l.iter().map(|e| T::from_input_value(&e.item)).collect(),
            // A single value acts as a list of one element.
            v => T::from_input_value(v).map(|e| vec![e]),
        }
    }
}
