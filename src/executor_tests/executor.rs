mod field_execution {
    use crate::{
        ast::{Field, InputValue, Operation, OperationType, Type},
        schema::{
            meta::{Argument, Field as MetaField, ObjectMeta},
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
                    "Deep",
                    vec![
                        MetaField::new(
                            "a",
                            Type::NonNullNamed("String".into()),
                            FieldResolver::new(|_, _, _| Ok(Resolved::scalar("Already Been Done"))),
                        ),
                        MetaField::new(
                            "c",
                            Type::List(Box::new(Type::Named("String".into()))),
                            FieldResolver::new(|_, _, _| {
                                Ok(Resolved::list(vec![
                                    Resolved::scalar("Contrived"),
                                    Resolved::null(),
                                    Resolved::scalar("Confusing"),
                                ]))
                            }),
                        ),
                    ],
                )
                .into_meta(),
            )
            .unwrap();

        registry
            .insert(
                ObjectMeta::new(
                    "Query",
                    vec![
                        MetaField::new(
                            "a",
                            Type::NonNullNamed("String".into()),
                            FieldResolver::new(|_, _, _| Ok(Resolved::scalar("Apple"))),
                        ),
                        MetaField::new(
                            "b",
                            Type::NonNullNamed("String".into()),
                            FieldResolver::new(|_, _, _| Ok(Resolved::scalar("Banana"))),
                        ),
                        MetaField::new(
                            "pic",
                            Type::NonNullNamed("String".into()),
                            FieldResolver::new(|_, args, _| {
                                let size = args.get::<i32>("size").unwrap_or(50);
                                Ok(Resolved::scalar(format!("Pic of size: {}", size)))
                            }),
                        )
                        .argument(Argument::new("size", Type::Named("Int".into()))),
                        MetaField::new(
                            "deep",
                            Type::NonNullNamed("Deep".into()),
                            FieldResolver::new(|_, _, _| Ok(Resolved::object("Deep", ()))),
                        ),
                    ],
                )
                .into_meta(),
            )
            .unwrap();

        Schema::new(registry, "Query", None).unwrap()
    }

    #[test]
    fn aliases_arguments_and_nesting() {
        let schema = schema();

        let document = vec![Operation::new(
            OperationType::Query,
            vec![
                Field::new("a").into_selection(),
                Field::new("b").into_selection(),
                Field::new("a").alias("x").into_selection(),
                Field::new("pic")
                    .argument("size", InputValue::variable("size"))
                    .into_selection(),
                Field::new("deep")
                    .selection_set(vec![
                        Field::new("a").into_selection(),
                        Field::new("c").into_selection(),
                    ])
                    .into_selection(),
            ],
        )
        .variable("size", Type::Named("Int".into()), None)
        .into_definition()];

        let vars: Variables = vec![("size".to_owned(), InputValue::scalar(100))]
            .into_iter()
            .collect();

        let (result, errs) =
            crate::execute_sync(&document, None, &schema, &vars, &()).expect("Execution failed");

        assert_eq!(errs, []);

        assert_eq!(
            result,
            Value::object(
                vec![
                    ("a", Value::scalar("Apple")),
                    ("b", Value::scalar("Banana")),
                    ("x", Value::scalar("Apple")),
                    ("pic", Value::scalar("Pic of size: 100")),
                    (
                        "deep",
                        Value::object(
                            vec![
                                ("a", Value::scalar("Already Been Done")),
                                (
                                    "c",
                                    Value::list(vec![
                                        Value::scalar("Contrived"),
                                        Value::null(),
                                        Value::scalar("Confusing"),
                                    ]),
                                ),
                            ]
                            .into_iter()
                            .collect(),
                        ),
                    ),
                ]
                .into_iter()
                .collect(),
            )
        );
    }

    #[test]
    fn response_keys_preserve_source_order() {
        let schema = schema();

        let document = vec![Operation::new(
            OperationType::Query,
            vec![
                Field::new("b").into_selection(),
                Field::new("a").alias("z").into_selection(),
                Field::new("a").into_selection(),
            ],
        )
        .into_definition()];

        let (result, errs) =
            crate::execute_sync(&document, None, &schema, &Variables::new(), &())
                .expect("Execution failed");

        assert_eq!(errs, []);

        let keys: Vec<_> = result
            .as_object_value()
            .expect("Result is not an object")
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["b", "z", "a"]);
    }

    #[test]
    fn duplicate_fields_merge_sub_selections() {
        let schema = schema();

        let document = vec![Operation::new(
            OperationType::Query,
            vec![
                Field::new("deep")
                    .selection_set(vec![Field::new("a").into_selection()])
                    .into_selection(),
                Field::new("deep")
                    .selection_set(vec![Field::new("c").into_selection()])
                    .into_selection(),
            ],
        )
        .into_definition()];

        let (result, errs) =
            crate::execute_sync(&document, None, &schema, &Variables::new(), &())
                .expect("Execution failed");

        assert_eq!(errs, []);

        let deep = result
            .as_object_value()
            .and_then(|o| o.get_field_value("deep"))
            .and_then(Value::as_object_value)
            .expect("deep is not an object");
        assert!(deep.contains_field("a"));
        assert!(deep.contains_field("c"));
    }

    #[test]
    fn typename_resolves_to_the_current_type() {
        let schema = schema();

        let document = vec![Operation::new(
            OperationType::Query,
            vec![
                Field::new("__typename").into_selection(),
                Field::new("deep")
                    .selection_set(vec![Field::new("__typename").into_selection()])
                    .into_selection(),
            ],
        )
        .into_definition()];

        let (result, errs) =
            crate::execute_sync(&document, None, &schema, &Variables::new(), &())
                .expect("Execution failed");

        assert_eq!(errs, []);
        assert_eq!(
            result,
            Value::object(
                vec![
                    ("__typename", Value::scalar("Query")),
                    (
                        "deep",
                        Value::object(
                            vec![("__typename", Value::scalar("Deep"))].into_iter().collect(),
                        ),
                    ),
                ]
                .into_iter()
                .collect(),
            )
        );
    }

    #[test]
    fn operation_selection_errors() {
        let schema = schema();
        let empty: Vec<crate::ast::Definition<DefaultScalarValue>> = vec![];

        assert_eq!(
            crate::execute_sync(&empty, None, &schema, &Variables::new(), &()).unwrap_err(),
            crate::GraphQLError::NoOperationProvided,
        );

        let two_ops = vec![
            Operation::new(OperationType::Query, vec![Field::new("a").into_selection()])
                .name("First")
                .into_definition(),
            Operation::new(OperationType::Query, vec![Field::new("b").into_selection()])
                .name("Second")
                .into_definition(),
        ];

        assert_eq!(
            crate::execute_sync(&two_ops, None, &schema, &Variables::new(), &()).unwrap_err(),
            crate::GraphQLError::MultipleOperationsProvided,
        );

        assert_eq!(
            crate::execute_sync(&two_ops, Some("Third"), &schema, &Variables::new(), &())
                .unwrap_err(),
            crate::GraphQLError::UnknownOperationName,
        );

        let (result, errs) =
            crate::execute_sync(&two_ops, Some("Second"), &schema, &Variables::new(), &())
                .expect("Execution failed");
        assert_eq!(errs, []);
        assert!(result.as_object_value().unwrap().contains_field("b"));
    }

    #[test]
    fn selections_also_run_against_explicit_selection_type() {
        // An untyped inline fragment applies to whatever the current type is.
        let schema = schema();

        let document = vec![Operation::new(
            OperationType::Query,
            vec![crate::ast::InlineFragment::new(
                None,
                vec![Field::new("a").into_selection()],
            )
            .into_selection()],
        )
        .into_definition()];

        let (result, errs) =
            crate::execute_sync(&document, None, &schema, &Variables::new(), &())
                .expect("Execution failed");

        assert_eq!(errs, []);
        assert_eq!(
            result,
            Value::object(vec![("a", Value::scalar("Apple"))].into_iter().collect()),
        );
    }
}

mod failure_semantics {
    use serde_json::to_string;

    use crate::{
        ast::{Field, Operation, OperationType, Type},
        http::GraphQLResponse,
        schema::{
            meta::{Field as MetaField, ObjectMeta},
            model::{Registry, Schema},
        },
        types::{FieldResolver, Resolved},
        value::{DefaultScalarValue, Value},
        FieldError, PathSegment, Variables,
    };

    fn registry_with_inner(
        inner_resolver: FieldResolver<(), DefaultScalarValue>,
        inner_type: Type<'static>,
    ) -> Registry<(), DefaultScalarValue> {
        let mut registry: Registry<(), DefaultScalarValue> = Registry::new();
        registry
            .insert(
                ObjectMeta::new("Inner", vec![MetaField::new("v", inner_type, inner_resolver)])
                    .into_meta(),
            )
            .unwrap();
        registry
    }

    fn schema_with_query_field(
        registry: Registry<(), DefaultScalarValue>,
        field: MetaField<(), DefaultScalarValue>,
    ) -> Schema<(), DefaultScalarValue> {
        let mut registry = registry;
        registry
            .insert(ObjectMeta::new("Query", vec![field]).into_meta())
            .unwrap();
        Schema::new(registry, "Query", None).unwrap()
    }

    #[test]
    fn missing_field_yields_null_and_error() {
        let mut registry: Registry<(), DefaultScalarValue> = Registry::new();
        registry
            .insert(
                ObjectMeta::new(
                    "Query",
                    vec![MetaField::new(
                        "a",
                        Type::Named("Int".into()),
                        FieldResolver::new(|_, _, _| Ok(Resolved::scalar(1))),
                    )],
                )
                .into_meta(),
            )
            .unwrap();
        let schema = Schema::new(registry, "Query", None).unwrap();

        let document = vec![Operation::new(
            OperationType::Query,
            vec![Field::new("nonexistent").into_selection()],
        )
        .into_definition()];

        let response = GraphQLResponse::from_result(crate::execute_sync(
            &document,
            None,
            &schema,
            &Variables::new(),
            &(),
        ));

        assert_eq!(
            to_string(&response).unwrap(),
            r#"{"data":{"nonexistent":null},"errors":[{"message":"field nonexistent not resolved.","path":["nonexistent"]}]}"#
        );
    }

    #[test]
    fn resolver_errors_become_null_fields() {
        let schema = schema_with_query_field(
            Registry::new(),
            MetaField::new(
                "broken",
                Type::Named("Int".into()),
                FieldResolver::new(|_, _, _| Err(FieldError::from("broke down"))),
            ),
        );

        let document = vec![Operation::new(
            OperationType::Query,
            vec![Field::new("broken").into_selection()],
        )
        .into_definition()];

        let (result, errs) =
            crate::execute_sync(&document, None, &schema, &Variables::new(), &())
                .expect("Execution failed");

        assert_eq!(
            result,
            Value::object(vec![("broken", Value::null())].into_iter().collect()),
        );
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error().message(), "broke down");
        assert_eq!(errs[0].path(), &[PathSegment::Field("broken".into())]);
    }

    #[test]
    fn null_for_non_null_field_nullifies_the_parent() {
        let registry = registry_with_inner(
            FieldResolver::new(|_, _, _| Ok(Resolved::null())),
            Type::NonNullNamed("Int".into()),
        );
        let schema = schema_with_query_field(
            registry,
            MetaField::new(
                "inner",
                Type::Named("Inner".into()),
                FieldResolver::new(|_, _, _| Ok(Resolved::object("Inner", ()))),
            ),
        );

        let document = vec![Operation::new(
            OperationType::Query,
            vec![Field::new("inner")
                .selection_set(vec![Field::new("v").into_selection()])
                .into_selection()],
        )
        .into_definition()];

        let (result, errs) =
            crate::execute_sync(&document, None, &schema, &Variables::new(), &())
                .expect("Execution failed");

        // The nearest nullable ancestor of `v` is `inner`.
        assert_eq!(
            result,
            Value::object(vec![("inner", Value::null())].into_iter().collect()),
        );
        assert_eq!(errs.len(), 1);
        assert_eq!(
            errs[0].path(),
            &[
                PathSegment::Field("inner".into()),
                PathSegment::Field("v".into()),
            ]
        );
    }

    #[test]
    fn null_propagates_to_data_when_all_ancestors_are_non_null() {
        let registry = registry_with_inner(
            FieldResolver::new(|_, _, _| Ok(Resolved::null())),
            Type::NonNullNamed("Int".into()),
        );
        let schema = schema_with_query_field(
            registry,
            MetaField::new(
                "inner",
                Type::NonNullNamed("Inner".into()),
                FieldResolver::new(|_, _, _| Ok(Resolved::object("Inner", ()))),
            ),
        );

        let document = vec![Operation::new(
            OperationType::Query,
            vec![Field::new("inner")
                .selection_set(vec![Field::new("v").into_selection()])
                .into_selection()],
        )
        .into_definition()];

        let (result, errs) =
            crate::execute_sync(&document, None, &schema, &Variables::new(), &())
                .expect("Execution failed");

        assert_eq!(result, Value::Null);
        assert_eq!(errs.len(), 1);
        assert_eq!(
            errs[0].path(),
            &[
                PathSegment::Field("inner".into()),
                PathSegment::Field("v".into()),
            ]
        );
    }

    #[test]
    fn nullable_list_elements_absorb_nulls() {
        let schema = schema_with_query_field(
            Registry::new(),
            MetaField::new(
                "list",
                Type::List(Box::new(Type::Named("Int".into()))),
                FieldResolver::new(|_, _, _| {
                    Ok(Resolved::list(vec![
                        Resolved::scalar(1),
                        Resolved::null(),
                        Resolved::scalar(3),
                    ]))
                }),
            ),
        );

        let document = vec![Operation::new(
            OperationType::Query,
            vec![Field::new("list").into_selection()],
        )
        .into_definition()];

        let (result, errs) =
            crate::execute_sync(&document, None, &schema, &Variables::new(), &())
                .expect("Execution failed");

        assert_eq!(errs, []);
        assert_eq!(
            result,
            Value::object(
                vec![(
                    "list",
                    Value::list(vec![Value::scalar(1), Value::null(), Value::scalar(3)]),
                )]
                .into_iter()
                .collect(),
            )
        );
    }

    #[test]
    fn non_null_list_elements_nullify_the_list() {
        let schema = schema_with_query_field(
            Registry::new(),
            MetaField::new(
                "list",
                Type::List(Box::new(Type::NonNullNamed("Int".into()))),
                FieldResolver::new(|_, _, _| {
                    Ok(Resolved::list(vec![
                        Resolved::scalar(1),
                        Resolved::null(),
                        Resolved::scalar(3),
                    ]))
                }),
            ),
        );

        let document = vec![Operation::new(
            OperationType::Query,
            vec![Field::new("list").into_selection()],
        )
        .into_definition()];

        let (result, errs) =
            crate::execute_sync(&document, None, &schema, &Variables::new(), &())
                .expect("Execution failed");

        assert_eq!(
            result,
            Value::object(vec![("list", Value::null())].into_iter().collect()),
        );
        assert_eq!(errs.len(), 1);
        assert_eq!(
            errs[0].path(),
            &[PathSegment::Field("list".into()), PathSegment::Index(1)]
        );
    }

    #[test]
    fn scalar_mismatch_is_a_field_error() {
        let schema = schema_with_query_field(
            Registry::new(),
            MetaField::new(
                "num",
                Type::Named("Int".into()),
                FieldResolver::new(|_, _, _| Ok(Resolved::scalar("not a number"))),
            ),
        );

        let document = vec![Operation::new(
            OperationType::Query,
            vec![Field::new("num").into_selection()],
        )
        .into_definition()];

        let (result, errs) =
            crate::execute_sync(&document, None, &schema, &Variables::new(), &())
                .expect("Execution failed");

        assert_eq!(
            result,
            Value::object(vec![("num", Value::null())].into_iter().collect()),
        );
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error().message(), "Invalid value for scalar \"Int\"");
    }

    #[test]
    fn field_error_extensions_are_preserved() {
        let schema = schema_with_query_field(
            Registry::new(),
            MetaField::new(
                "broken",
                Type::Named("Int".into()),
                FieldResolver::new(|_, _, _| {
                    Err(FieldError::new(
                        "permission denied",
                        Value::object(
                            vec![("code", Value::scalar("FORBIDDEN"))].into_iter().collect(),
                        ),
                    ))
                }),
            ),
        );

        let document = vec![Operation::new(
            OperationType::Query,
            vec![Field::new("broken").into_selection()],
        )
        .into_definition()];

        let (_, errs) = crate::execute_sync(&document, None, &schema, &Variables::new(), &())
            .expect("Execution failed");

        assert_eq!(errs.len(), 1);
        assert_eq!(
            errs[0].error().extensions(),
            &Value::object(vec![("code", Value::scalar("FORBIDDEN"))].into_iter().collect()),
        );
    }
}

mod mutations {
    use std::sync::Mutex;

    use crate::{
        ast::{Field, Operation, OperationType, Type},
        schema::{
            meta::{Field as MetaField, ObjectMeta},
            model::{Registry, Schema},
        },
        types::{FieldResolver, Resolved},
        value::DefaultScalarValue,
        GraphQLError, Variables,
    };

    #[derive(Default)]
    struct CallLog {
        calls: Mutex<Vec<&'static str>>,
    }

    impl CallLog {
        fn record(&self, name: &'static str) {
            self.calls
                .lock()
                .expect("Call log lock poisoned")
                .push(name);
        }
    }

    fn logging_field(name: &'static str) -> MetaField<CallLog, DefaultScalarValue> {
        MetaField::new(
            name,
            Type::NonNullNamed("String".into()),
            FieldResolver::new(move |_, _, ctx: &CallLog| {
                ctx.record(name);
                Ok(Resolved::scalar(name))
            }),
        )
    }

    fn schema() -> Schema<CallLog, DefaultScalarValue> {
        let mut registry: Registry<CallLog, DefaultScalarValue> = Registry::new();
        registry
            .insert(ObjectMeta::new("Query", vec![logging_field("q")]).into_meta())
            .unwrap();
        registry
            .insert(
                ObjectMeta::new(
                    "Mutation",
                    vec![logging_field("a"), logging_field("b"), logging_field("c")],
                )
                .into_meta(),
            )
            .unwrap();
        Schema::new(registry, "Query", Some("Mutation")).unwrap()
    }

    #[test]
    fn mutation_fields_run_in_source_order() {
        let schema = schema();
        let log = CallLog::default();

        let document = vec![Operation::new(
            OperationType::Mutation,
            vec![
                Field::new("a").into_selection(),
                Field::new("b").into_selection(),
                Field::new("c").into_selection(),
            ],
        )
        .into_definition()];

        let (_, errs) = crate::execute_sync(&document, None, &schema, &Variables::new(), &log)
            .expect("Execution failed");

        assert_eq!(errs, []);
        assert_eq!(*log.calls.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn repeated_fields_resolve_once() {
        let schema = schema();
        let log = CallLog::default();

        let document = vec![Operation::new(
            OperationType::Query,
            vec![
                Field::new("q").into_selection(),
                Field::new("q").into_selection(),
                Field::new("q").into_selection(),
            ],
        )
        .into_definition()];

        let (result, errs) =
            crate::execute_sync(&document, None, &schema, &Variables::new(), &log)
                .expect("Execution failed");

        assert_eq!(errs, []);
        assert_eq!(result.as_object_value().unwrap().field_count(), 1);
        assert_eq!(*log.calls.lock().unwrap(), vec!["q"]);
    }

    #[test]
    fn mutations_require_a_mutation_root() {
        let mut registry: Registry<(), DefaultScalarValue> = Registry::new();
        registry
            .insert(
                ObjectMeta::new(
                    "Query",
                    vec![MetaField::new(
                        "a",
                        Type::Named("Int".into()),
                        FieldResolver::new(|_, _, _| Ok(Resolved::scalar(1))),
                    )],
                )
                .into_meta(),
            )
            .unwrap();
        let schema = Schema::new(registry, "Query", None).unwrap();

        let document = vec![Operation::new(
            OperationType::Mutation,
            vec![Field::new("a").into_selection()],
        )
        .into_definition()];

        assert_eq!(
            crate::execute_sync(&document, None, &schema, &Variables::new(), &()).unwrap_err(),
            GraphQLError::NoMutationType,
        );
    }
}

mod fragments {
    use serde_json::to_string;

    use crate::{
        ast::{Field, Fragment, FragmentSpread, InlineFragment, Operation, OperationType, Type},
        http::GraphQLResponse,
        schema::{
            meta::{Field as MetaField, ObjectMeta},
            model::{Registry, Schema},
        },
        types::{FieldResolver, Resolved, SourceValue},
        value::DefaultScalarValue,
        FieldError, Variables,
    };

    struct Hat {
        circumference: i32,
    }

    struct Shirt {
        size: String,
    }

    fn circumference_resolver() -> FieldResolver<(), DefaultScalarValue> {
        FieldResolver::new(|source: &SourceValue, _, _| {
            source
                .downcast_ref::<Hat>()
                .map(|hat| Resolved::scalar(hat.circumference))
                .ok_or_else(|| FieldError::from("no hat to measure"))
        })
    }

    fn size_resolver() -> FieldResolver<(), DefaultScalarValue> {
        FieldResolver::new(|source: &SourceValue, _, _| {
            source
                .downcast_ref::<Shirt>()
                .map(|shirt| Resolved::scalar(shirt.size.clone()))
                .ok_or_else(|| FieldError::from("no shirt to measure"))
        })
    }

    /// A schema whose `garment` field yields a `Hat` or a `Shirt` depending
    /// on what hangs in the wardrobe.
    fn wardrobe_schema(hat: bool) -> Schema<(), DefaultScalarValue> {
        let mut registry: Registry<(), DefaultScalarValue> = Registry::new();
        registry
            .insert(
                ObjectMeta::new(
                    "Hat",
                    vec![MetaField::new(
                        "circumference",
                        Type::NonNullNamed("Int".into()),
                        circumference_resolver(),
                    )],
                )
                .into_meta(),
            )
            .unwrap();
        registry
            .insert(
                ObjectMeta::new(
                    "Shirt",
                    vec![MetaField::new(
                        "size",
                        Type::NonNullNamed("String".into()),
                        size_resolver(),
                    )],
                )
                .into_meta(),
            )
            .unwrap();
        registry
            .insert(
                ObjectMeta::new(
                    "Query",
                    vec![MetaField::new(
                        "garment",
                        Type::Named("Hat".into()),
                        FieldResolver::new(move |_, _, _| {
                            Ok(if hat {
                                Resolved::object("Hat", Hat { circumference: 60 })
                            } else {
                                Resolved::object(
                                    "Shirt",
                                    Shirt {
                                        size: "L".to_owned(),
                                    },
                                )
                            })
                        }),
                    )],
                )
                .into_meta(),
            )
            .unwrap();
        Schema::new(registry, "Query", None).unwrap()
    }

    /// A schema whose query root is itself `Hat`-typed.
    fn hat_root_schema() -> Schema<(), DefaultScalarValue> {
        let mut registry: Registry<(), DefaultScalarValue> = Registry::new();
        registry
            .insert(
                ObjectMeta::new(
                    "Hat",
                    vec![MetaField::new(
                        "circumference",
                        Type::NonNullNamed("Int".into()),
                        FieldResolver::new(|_, _, _| Ok(Resolved::scalar(60))),
                    )],
                )
                .into_meta(),
            )
            .unwrap();
        Schema::new(registry, "Hat", None).unwrap()
    }

    fn render(
        schema: &Schema<(), DefaultScalarValue>,
        document: &[crate::ast::Definition<'_, DefaultScalarValue>],
    ) -> String {
        let response = GraphQLResponse::from_result(crate::execute_sync(
            document,
            None,
            schema,
            &Variables::new(),
            &(),
        ));
        to_string(&response).expect("Response failed to serialize")
    }

    #[test]
    fn inline_fragment_selects_by_runtime_type() {
        let garment_selections = || {
            vec![Field::new("garment")
                .selection_set(vec![
                    InlineFragment::new(
                        Some("Hat"),
                        vec![Field::new("circumference").into_selection()],
                    )
                    .into_selection(),
                    InlineFragment::new(Some("Shirt"), vec![Field::new("size").into_selection()])
                        .into_selection(),
                ])
                .into_selection()]
        };

        let document = vec![Operation::new(OperationType::Query, garment_selections())
            .into_definition()];

        assert_eq!(
            render(&wardrobe_schema(true), &document),
            r#"{"data":{"garment":{"circumference":60}}}"#
        );
        assert_eq!(
            render(&wardrobe_schema(false), &document),
            r#"{"data":{"garment":{"size":"L"}}}"#
        );
    }

    #[test]
    fn untyped_inline_fragment_applies_to_the_current_type() {
        let mut registry: Registry<(), DefaultScalarValue> = Registry::new();
        registry
            .insert(
                ObjectMeta::new(
                    "Garment",
                    vec![
                        MetaField::new(
                            "circumference",
                            Type::NonNullNamed("Int".into()),
                            FieldResolver::new(|_, _, _| Ok(Resolved::scalar(60))),
                        ),
                        MetaField::new(
                            "size",
                            Type::NonNullNamed("String".into()),
                            FieldResolver::new(|_, _, _| Ok(Resolved::scalar("L"))),
                        ),
                    ],
                )
                .into_meta(),
            )
            .unwrap();
        registry
            .insert(
                ObjectMeta::new(
                    "Query",
                    vec![MetaField::new(
                        "garment",
                        Type::Named("Garment".into()),
                        FieldResolver::new(|_, _, _| Ok(Resolved::object("Garment", ()))),
                    )],
                )
                .into_meta(),
            )
            .unwrap();
        let schema = Schema::new(registry, "Query", None).unwrap();

        let document = vec![Operation::new(
            OperationType::Query,
            vec![Field::new("garment")
                .selection_set(vec![
                    Field::new("circumference").into_selection(),
                    InlineFragment::new(None, vec![Field::new("size").into_selection()])
                        .into_selection(),
                ])
                .into_selection()],
        )
        .into_definition()];

        assert_eq!(
            render(&schema, &document),
            r#"{"data":{"garment":{"circumference":60,"size":"L"}}}"#
        );
    }

    #[test]
    fn named_fragment_spread_on_the_root() {
        let schema = hat_root_schema();

        let document = vec![
            Operation::new(
                OperationType::Query,
                vec![FragmentSpread::new("circFrag").into_selection()],
            )
            .into_definition(),
            Fragment::new(
                "circFrag",
                "Hat",
                vec![Field::new("circumference").into_selection()],
            )
            .into_definition(),
        ];

        assert_eq!(
            render(&schema, &document),
            r#"{"data":{"circumference":60}}"#
        );
    }

    #[test]
    fn recursive_fragment_contributes_nothing() {
        let schema = hat_root_schema();

        let document = vec![
            Operation::new(
                OperationType::Query,
                vec![FragmentSpread::new("f").into_selection()],
            )
            .into_definition(),
            Fragment::new("f", "Hat", vec![FragmentSpread::new("f").into_selection()])
                .into_definition(),
        ];

        assert_eq!(render(&schema, &document), r#"{"data":{}}"#);
    }

    #[test]
    fn mutually_recursive_fragments_terminate() {
        let schema = hat_root_schema();

        let document = vec![
            Operation::new(
                OperationType::Query,
                vec![FragmentSpread::new("f").into_selection()],
            )
            .into_definition(),
            Fragment::new(
                "f",
                "Hat",
                vec![
                    Field::new("circumference").into_selection(),
                    FragmentSpread::new("g").into_selection(),
                ],
            )
            .into_definition(),
            Fragment::new("g", "Hat", vec![FragmentSpread::new("f").into_selection()])
                .into_definition(),
        ];

        assert_eq!(
            render(&schema, &document),
            r#"{"data":{"circumference":60}}"#
        );
    }

    #[test]
    fn mismatched_fragment_conditions_are_skipped() {
        let schema = wardrobe_schema(true);

        let document = vec![
            Operation::new(
                OperationType::Query,
                vec![Field::new("garment")
                    .selection_set(vec![
                        FragmentSpread::new("hatFrag").into_selection(),
                        FragmentSpread::new("shirtFrag").into_selection(),
                    ])
                    .into_selection()],
            )
            .into_definition(),
            Fragment::new(
                "hatFrag",
                "Hat",
                vec![Field::new("circumference").into_selection()],
            )
            .into_definition(),
            Fragment::new("shirtFrag", "Shirt", vec![Field::new("size").into_selection()])
                .into_definition(),
        ];

        assert_eq!(
            render(&schema, &document),
            r#"{"data":{"garment":{"circumference":60}}}"#
        );
    }

    #[test]
    fn unknown_fragment_spreads_are_reported() {
        let schema = hat_root_schema();

        let document = vec![Operation::new(
            OperationType::Query,
            vec![FragmentSpread::new("nope").into_selection()],
        )
        .into_definition()];

        let (result, errs) =
            crate::execute_sync(&document, None, &schema, &Variables::new(), &())
                .expect("Execution failed");

        assert_eq!(result.as_object_value().unwrap().field_count(), 0);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error().message(), "Unknown fragment \"nope\"");
    }
}
