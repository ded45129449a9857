use crate::{
    ast::{Directive, Field, Fragment, FragmentSpread, InlineFragment, InputValue, Operation,
          OperationType, Type},
    schema::{
        meta::{Field as MetaField, ObjectMeta},
        model::{Registry, Schema},
    },
    types::{FieldResolver, Resolved},
    value::{DefaultScalarValue, Value},
    Variables,
};

fn schema() -> Schema<(), DefaultScalarValue> {
    let mut registry: Registry<(), DefaultScalarValue> = Registry::new();
    registry
        .insert(
            ObjectMeta::new(
                "Query",
                vec![
                    MetaField::new(
                        "a",
                        Type::NonNullNamed("String".into()),
                        FieldResolver::new(|_, _, _| Ok(Resolved::scalar("a"))),
                    ),
                    MetaField::new(
                        "b",
                        Type::NonNullNamed("String".into()),
                        FieldResolver::new(|_, _, _| Ok(Resolved::scalar("b"))),
                    ),
                ],
            )
            .into_meta(),
        )
        .unwrap();
    Schema::new(registry, "Query", None).unwrap()
}

fn run(
    document: &[crate::ast::Definition<'_, DefaultScalarValue>],
    vars: Variables,
) -> Vec<String> {
    let schema = schema();
    let (result, errs) =
        crate::execute_sync(document, None, &schema, &vars, &()).expect("Execution failed");
    assert_eq!(errs, []);

    result
        .as_object_value()
        .expect("Result is not an object")
        .iter()
        .map(|(k, _)| k.clone())
        .collect()
}

fn skip(condition: InputValue) -> Directive<'static, DefaultScalarValue> {
    Directive::new("skip").argument("if", condition)
}

fn include(condition: InputValue) -> Directive<'static, DefaultScalarValue> {
    Directive::new("include").argument("if", condition)
}

#[test]
fn skip_true_drops_the_field() {
    let document = vec![Operation::new(
        OperationType::Query,
        vec![
            Field::new("a").into_selection(),
            Field::new("b")
                .directive(skip(InputValue::scalar(true)))
                .into_selection(),
        ],
    )
    .into_definition()];

    assert_eq!(run(&document, Variables::new()), vec!["a"]);
}

#[test]
fn skip_false_keeps_the_field() {
    let document = vec![Operation::new(
        OperationType::Query,
        vec![
            Field::new("a").into_selection(),
            Field::new("b")
                .directive(skip(InputValue::scalar(false)))
                .into_selection(),
        ],
    )
    .into_definition()];

    assert_eq!(run(&document, Variables::new()), vec!["a", "b"]);
}

#[test]
fn include_false_drops_the_field() {
    let document = vec![Operation::new(
        OperationType::Query,
        vec![
            Field::new("a")
                .directive(include(InputValue::scalar(false)))
                .into_selection(),
            Field::new("b").into_selection(),
        ],
    )
    .into_definition()];

    assert_eq!(run(&document, Variables::new()), vec!["b"]);
}

#[test]
fn conditions_resolve_through_variables() {
    let document = vec![Operation::new(
        OperationType::Query,
        vec![
            Field::new("a")
                .directive(include(InputValue::variable("yes")))
                .into_selection(),
            Field::new("b")
                .directive(skip(InputValue::variable("yes")))
                .into_selection(),
        ],
    )
    .variable("yes", Type::NonNullNamed("Boolean".into()), None)
    .into_definition()];

    let vars: Variables = vec![("yes".to_owned(), InputValue::scalar(true))]
        .into_iter()
        .collect();

    assert_eq!(run(&document, vars), vec!["a"]);
}

#[test]
fn inline_fragments_are_gated_before_collection() {
    let document = vec![Operation::new(
        OperationType::Query,
        vec![
            Field::new("a").into_selection(),
            InlineFragment::new(None, vec![Field::new("b").into_selection()])
                .directive(skip(InputValue::scalar(true)))
                .into_selection(),
        ],
    )
    .into_definition()];

    assert_eq!(run(&document, Variables::new()), vec!["a"]);
}

#[test]
fn fragment_spreads_are_gated_before_collection() {
    let document = vec![
        Operation::new(
            OperationType::Query,
            vec![
                Field::new("a").into_selection(),
                FragmentSpread::new("bFrag")
                    .directive(include(InputValue::scalar(false)))
                    .into_selection(),
            ],
        )
        .into_definition(),
        Fragment::new("bFrag", "Query", vec![Field::new("b").into_selection()])
            .into_definition(),
    ];

    assert_eq!(run(&document, Variables::new()), vec!["a"]);
}

#[test]
fn unknown_directives_are_ignored() {
    let document = vec![Operation::new(
        OperationType::Query,
        vec![
            Field::new("a")
                .directive(Directive::new("uppercase"))
                .into_selection(),
            Field::new("b").into_selection(),
        ],
    )
    .into_definition()];

    assert_eq!(run(&document, Variables::new()), vec!["a", "b"]);
}

#[test]
fn both_directives_must_allow_inclusion() {
    let document = vec![Operation::new(
        OperationType::Query,
        vec![
            Field::new("a")
                .directive(include(InputValue::scalar(true)))
                .directive(skip(InputValue::scalar(true)))
                .into_selection(),
            Field::new("b").into_selection(),
        ],
    )
    .into_definition()];

    assert_eq!(run(&document, Variables::new()), vec!["b"]);
}

#[test]
fn excluded_fields_do_not_merge_sub_selections() {
    // `a` is selected twice; the skipped occurrence must not contribute.
    let document = vec![Operation::new(
        OperationType::Query,
        vec![
            Field::new("a").into_selection(),
            Field::new("a")
                .alias("second")
                .directive(skip(InputValue::scalar(true)))
                .into_selection(),
        ],
    )
    .into_definition()];

    let schema = schema();
    let (result, errs) = crate::execute_sync(&document, None, &schema, &Variables::new(), &())
        .expect("Execution failed");
    assert_eq!(errs, []);
    assert_eq!(
        result,
        Value::object(vec![("a", Value::scalar("a"))].into_iter().collect()),
    );
}
