//! Schema inference tests

use chrono::NaiveDate;
use ddl_inference::inference::{ColumnOrder, InferenceConfig, InferenceError, SchemaInferrer};
use ddl_inference::models::{ColumnType, ForeignKey, InferredSchema, Record, Value};
use serde_json::json;

fn config() -> InferenceConfig {
    InferenceConfig::builder()
        .reference_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        .build()
}

fn infer(records: Vec<serde_json::Value>, table: &str) -> InferredSchema {
    SchemaInferrer::with_config(config())
        .infer(records, table)
        .unwrap()
}

fn sample_provinces() -> Vec<serde_json::Value> {
    vec![
        json!({"province": "Québec", "capital": {"name": "Québec City", "pop": 491140},
               "id": 1, "province_id": 1,
               "cities": [{"name": "Montreal", "pop": 1649519}, {"name": "Laval", "pop": 401553}]}),
        json!({"province": "Ontario", "capital": {"name": "Toronto", "pop": 2615060}, "province_id": 2,
               "cities": [{"name": "Ottawa", "pop": 883391}, {"name": "Missisauga", "pop": 713443}]}),
        json!({"province": "New Brunswick", "capital": {"name": "Fredricton", "pop": 56224},
               "id": 3, "province_id": 3,
               "cities": [{"name": "Saint John", "pop": 70063}, {"name": "Moncton", "pop": 69074}]}),
    ]
}

mod scenario_tests {
    use super::*;

    #[test]
    fn test_knights_single_table() {
        let schema = infer(
            vec![
                json!({"name": "Lancelot", "kg": 83, "dob": "9 jan 461"}),
                json!({"name": "Gawain", "kg": 69.4}),
            ],
            "knights",
        );

        assert_eq!(schema.table_names(), vec!["knights"]);
        let knights = schema.root().unwrap();
        assert_eq!(knights.column_names(), vec!["name", "kg", "dob"]);

        let kg = knights.column("kg").unwrap();
        assert_eq!(
            kg.column_type,
            ColumnType::ExactDecimal {
                precision: 3,
                scale: 1
            }
        );
        assert!(!kg.nullable);

        let dob = knights.column("dob").unwrap();
        assert_eq!(dob.column_type, ColumnType::Temporal);
        assert!(dob.nullable);

        let name = knights.column("name").unwrap();
        assert_eq!(name.column_type, ColumnType::Text { length: Some(8) });
        assert!(name.unique);
        assert!(!name.nullable);
    }

    #[test]
    fn test_nested_record_flattens_without_child_table() {
        let schema = infer(
            vec![json!({"province": "Québec", "capital": {"name": "Québec City", "pop": 491140}})],
            "provinces",
        );

        assert_eq!(schema.len(), 1);
        let provinces = schema.root().unwrap();
        assert_eq!(
            provinces.column_names(),
            vec!["province", "capital_name", "capital_pop"]
        );
        assert!(provinces.primary_key.is_none());
        assert_eq!(
            provinces.rows[0].get("capital_name"),
            Some(&Value::from("Québec City"))
        );
    }

    #[test]
    fn test_nested_list_becomes_child_table() {
        let schema = infer(
            vec![
                json!({"province": "Québec", "cities": [{"name": "Montreal"}, {"name": "Laval"}]}),
                json!({"province": "Ontario", "cities": [{"name": "Ottawa"}]}),
            ],
            "province",
        );

        assert_eq!(schema.table_names(), vec!["province", "cities"]);

        let province = schema.table("province").unwrap();
        assert_eq!(province.primary_key.as_deref(), Some("id"));
        assert_eq!(province.column_names(), vec!["id", "province"]);
        let id = province.column("id").unwrap();
        assert!(id.primary_key);
        assert!(id.unique);
        assert_eq!(id.column_type, ColumnType::Integer);

        let cities = schema.table("cities").unwrap();
        assert_eq!(cities.column_names(), vec!["name", "province_id"]);
        assert_eq!(
            cities.foreign_key,
            Some(ForeignKey {
                column: "province_id".to_string(),
                parent_table: "province".to_string(),
                parent_column: "id".to_string(),
            })
        );
        assert!(!cities.column("province_id").unwrap().unique);
        assert_eq!(cities.rows.len(), 3);

        let children: Vec<_> = schema.children_of("province").map(|t| t.name.as_str()).collect();
        assert_eq!(children, vec!["cities"]);
        assert_eq!(schema.stats.generated_keys, 2);
        assert_eq!(schema.stats.tables, 2);
    }

    #[test]
    fn test_duplicate_key_candidate_falls_back() {
        let config = InferenceConfig::builder().primary_key("code").build();
        let schema = SchemaInferrer::with_config(config)
            .infer(
                vec![
                    json!({"code": "a", "name": "x", "province_id": 10}),
                    json!({"code": "a", "name": "y", "province_id": 11}),
                ],
                "province",
            )
            .unwrap();

        let province = schema.root().unwrap();
        assert_eq!(province.primary_key.as_deref(), Some("province_id"));
        assert_eq!(schema.stats.generated_keys, 0);
    }

    #[test]
    fn test_requested_key_generated_alongside_existing_id() {
        let config = InferenceConfig::builder()
            .primary_key("code")
            .reference_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .build();
        let schema = SchemaInferrer::with_config(config)
            .infer(
                vec![
                    json!({"id": 1, "kids": [{"a": 1}]}),
                    json!({"id": 2, "kids": [{"a": 2}]}),
                ],
                "province",
            )
            .unwrap();

        let province = schema.table("province").unwrap();
        assert_eq!(province.primary_key.as_deref(), Some("code"));
        assert_eq!(province.column_names(), vec!["code", "id"]);
        assert!(province.column("code").unwrap().primary_key);
        assert!(!province.column("id").unwrap().primary_key);

        let kids = schema.table("kids").unwrap();
        let fk = kids.foreign_key.as_ref().unwrap();
        assert_eq!(fk.parent_column, "code");
        assert_eq!(schema.stats.generated_keys, 2);
    }

    #[test]
    fn test_all_key_candidates_duplicated() {
        let row = json!({"id": 1, "t_id": 1, "_t_id": 1, "items": [1]});
        let err = SchemaInferrer::with_config(config())
            .infer(vec![row.clone(), row], "t")
            .unwrap_err();
        assert_eq!(
            err,
            InferenceError::UnusableKey {
                table: "t".to_string(),
                candidates: vec!["id".to_string(), "t_id".to_string(), "_t_id".to_string()],
            }
        );
    }

    #[test]
    fn test_mixed_integer_column() {
        let schema = infer(
            vec![json!({"n": 6}), json!({"n": "2"}), json!({"n": 9})],
            "numbers",
        );
        let n = schema.root().unwrap().column("n").unwrap();
        assert_eq!(n.column_type, ColumnType::Integer);
        assert_eq!(n.extent.width, 1);
        assert_eq!(n.extent.integer_digits, 1);
        assert!(n.unique);
    }
}

mod reshape_tests {
    use super::*;

    #[test]
    fn test_partial_key_filled_above_existing() {
        let mut records = sample_provinces();
        for row in records.iter_mut() {
            row["province_id"] = json!(4);
        }
        let config = InferenceConfig::builder()
            .primary_key("id")
            .force_primary_key(true)
            .reference_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .build();
        let schema = SchemaInferrer::with_config(config)
            .infer(records, "province")
            .unwrap();

        let province = schema.table("province").unwrap();
        assert_eq!(province.primary_key.as_deref(), Some("id"));
        let ids: Vec<_> = province.rows.iter().map(|r| r.get("id").cloned()).collect();
        assert_eq!(
            ids,
            vec![
                Some(Value::from(1i64)),
                Some(Value::from(4i64)),
                Some(Value::from(3i64))
            ]
        );

        let cities = schema.table("cities").unwrap();
        let fks: Vec<_> = cities
            .rows
            .iter()
            .map(|r| r.get("province_id").cloned())
            .collect();
        assert_eq!(
            fks,
            [1i64, 1, 4, 4, 3, 3]
                .into_iter()
                .map(|n| Some(Value::from(n)))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_flat_records_round_trip() {
        let schema = infer(
            vec![
                json!({"Name": "Lancelot", "Weight KG": 83}),
                json!({"Name": "Gawain", "Weight KG": 69.4}),
            ],
            "Knights",
        );

        let knights = schema.table("knights").unwrap();
        assert_eq!(
            knights.rows,
            vec![
                Record::from([("name", Value::from("Lancelot")), ("weight_kg", Value::from(83i64))]),
                Record::from([("name", Value::from("Gawain")), ("weight_kg", Value::from(69.4))]),
            ]
        );
    }

    #[test]
    fn test_grandchild_tables_in_dependency_order() {
        let schema = infer(
            vec![json!({
                "country": "Canada",
                "provinces": [
                    {"name": "Québec", "cities": [{"name": "Montreal"}, {"name": "Laval"}]},
                    {"name": "Ontario", "cities": [{"name": "Ottawa"}]}
                ]
            })],
            "countries",
        );

        assert_eq!(schema.table_names(), vec!["countries", "provinces", "cities"]);
        let cities = schema.table("cities").unwrap();
        assert_eq!(cities.parent(), Some("provinces"));
        assert_eq!(cities.foreign_key.as_ref().unwrap().column, "provinces_id");
        let provinces = schema.table("provinces").unwrap();
        assert_eq!(provinces.parent(), Some("countries"));
        assert_eq!(provinces.primary_key.as_deref(), Some("id"));
    }

    #[test]
    fn test_scalar_list_items_are_wrapped() {
        let schema = infer(
            vec![
                json!({"id": 10, "tags": ["red", "green"]}),
                json!({"id": 11, "tags": ["blue"]}),
            ],
            "posts",
        );

        let tags = schema.table("tags").unwrap();
        assert_eq!(tags.column_names(), vec!["tags", "posts_id"]);
        assert_eq!(
            tags.column("tags").unwrap().column_type,
            ColumnType::Text { length: Some(5) }
        );
        assert_eq!(schema.stats.generated_keys, 0);
    }

    #[test]
    fn test_text_keys_are_filled_with_hashes() {
        let schema = infer(
            vec![
                json!({"id": "alpha", "items": [1]}),
                json!({"items": [2]}),
            ],
            "t",
        );

        let t = schema.root().unwrap();
        assert_eq!(
            t.column("id").unwrap().column_type,
            ColumnType::Text { length: Some(32) }
        );
        let Some(Value::Scalar(generated)) = t.rows[1].get("id") else {
            panic!("expected a generated key");
        };
        assert_eq!(generated.to_string().len(), 32);
    }

    #[test]
    fn test_ambiguous_merge_aborts() {
        let err = SchemaInferrer::with_config(config())
            .infer(
                vec![json!({"capital": {"name": "Toronto", "pop": 2615060}, "capital_name": "x"})],
                "provinces",
            )
            .unwrap_err();
        assert!(matches!(err, InferenceError::AmbiguousMerge { .. }));
    }

    #[test]
    fn test_duplicate_canonical_names_abort() {
        let err = SchemaInferrer::with_config(config())
            .infer(vec![json!({"Name": "a", "name": "b"})], "t")
            .unwrap_err();
        assert_eq!(
            err,
            InferenceError::DuplicateFieldName {
                first: "Name".to_string(),
                second: "name".to_string(),
                canonical: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_row_names_index() {
        let err = SchemaInferrer::with_config(config())
            .infer(vec![json!({"a": 1}), json!({"a": 2}), json!(["x"])], "t")
            .unwrap_err();
        assert!(matches!(err, InferenceError::MalformedRow { index: 2, .. }));
    }
}

mod profile_tests {
    use super::*;

    #[test]
    fn test_uniqueness_matches_coerced_values() {
        let schema = infer(
            vec![
                json!({"a": 1, "b": "1.50", "c": "x", "d": null}),
                json!({"a": 2, "b": "1.5", "c": "X", "d": ""}),
                json!({"a": "3", "b": "2.25", "c": "y"}),
            ],
            "t",
        );
        let t = schema.root().unwrap();
        assert!(t.column("a").unwrap().unique);
        assert!(!t.column("b").unwrap().unique);
        assert!(t.column("c").unwrap().unique);

        // No values at all: nothing to be unique about
        let d = t.column("d").unwrap();
        assert!(!d.unique);
        assert!(d.nullable);
        assert_eq!(d.non_null_count, 0);
        assert_eq!(d.column_type, ColumnType::Text { length: Some(1) });
    }

    #[test]
    fn test_uniqueness_compares_numbers_by_value() {
        let schema = infer(
            vec![json!({"v": 1.0}), json!({"v": 1}), json!({"v": 2.5})],
            "t",
        );
        let v = schema.root().unwrap().column("v").unwrap();
        assert_eq!(
            v.column_type,
            ColumnType::ExactDecimal {
                precision: 2,
                scale: 1
            }
        );
        assert!(!v.unique);

        let schema = infer(
            vec![json!({"v": 5}), json!({"v": "5.0"}), json!({"v": 7})],
            "t",
        );
        assert!(!schema.root().unwrap().column("v").unwrap().unique);
    }

    #[test]
    fn test_row_order_does_not_shrink_columns() {
        let rows = vec![
            json!({"v": "12.5", "s": "ab"}),
            json!({"v": "123", "s": "abcdef"}),
            json!({"v": "0.125", "s": "a"}),
        ];
        let forward = infer(rows.clone(), "t");
        let mut reversed_rows = rows;
        reversed_rows.reverse();
        let reversed = infer(reversed_rows, "t");

        for name in ["v", "s"] {
            assert_eq!(
                forward.root().unwrap().column(name).unwrap().column_type,
                reversed.root().unwrap().column(name).unwrap().column_type
            );
        }
        assert_eq!(
            forward.root().unwrap().column("v").unwrap().column_type,
            ColumnType::ExactDecimal {
                precision: 6,
                scale: 3
            }
        );
    }

    #[test]
    fn test_alphabetical_key_first_ordering() {
        let config = InferenceConfig::builder()
            .column_order(ColumnOrder::AlphabeticalKeyFirst)
            .reference_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .build();
        let schema = SchemaInferrer::with_config(config)
            .infer(
                vec![json!({"zeta": 1, "alpha": 2, "cities": [{"name": "x", "area": 3}]})],
                "region",
            )
            .unwrap();

        assert_eq!(
            schema.table("region").unwrap().column_names(),
            vec!["id", "alpha", "zeta"]
        );
        assert_eq!(
            schema.table("cities").unwrap().column_names(),
            vec!["region_id", "area", "name"]
        );
    }

    #[test]
    fn test_text_width_options() {
        let records = vec![
            json!({"name": "Lancelot", "kg": 83}),
            json!({"name": "Gawain", "kg": 69.4}),
        ];

        let config = InferenceConfig::builder()
            .size_cushion(2)
            .reference_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .build();
        let schema = SchemaInferrer::with_config(config)
            .infer(records.clone(), "knights")
            .unwrap();
        let knights = schema.root().unwrap();
        assert_eq!(
            knights.column("name").unwrap().column_type,
            ColumnType::Text { length: Some(10) }
        );
        assert_eq!(
            knights.column("kg").unwrap().column_type,
            ColumnType::ExactDecimal {
                precision: 5,
                scale: 1
            }
        );

        let config = InferenceConfig::builder().varying_length_text(true).build();
        let schema = SchemaInferrer::with_config(config)
            .infer(records, "knights")
            .unwrap();
        assert_eq!(
            schema.root().unwrap().column("name").unwrap().column_type,
            ColumnType::Text { length: None }
        );
    }

    #[test]
    fn test_mixed_types_widen_to_text() {
        let schema = infer(
            vec![
                json!({"seen": "2014 jun 7", "flag": "yes", "code": "A-1"}),
                json!({"seen": 7, "flag": 42, "code": 311920}),
            ],
            "t",
        );
        let t = schema.root().unwrap();
        assert_eq!(
            t.column("seen").unwrap().column_type,
            ColumnType::Text { length: Some(10) }
        );
        assert_eq!(
            t.column("flag").unwrap().column_type,
            ColumnType::Text { length: Some(3) }
        );
        assert_eq!(
            t.column("code").unwrap().column_type,
            ColumnType::Text { length: Some(6) }
        );
    }

    #[test]
    fn test_sample_size_limits_records_read() {
        let config = InferenceConfig::builder().sample_size(2).build();
        let records: Vec<_> = (0..10).map(|i| json!({"n": i})).collect();
        let schema = SchemaInferrer::with_config(config)
            .infer(records, "t")
            .unwrap();
        assert_eq!(schema.stats.records_read, 2);
        assert_eq!(schema.root().unwrap().rows.len(), 2);
    }
}

mod adapter_tests {
    use super::*;

    #[test]
    fn test_yaml_documents() {
        let docs: serde_yaml::Value = serde_yaml::from_str(
            r#"
- name: Lancelot
  kg: 83
  quest:
    - grail
    - dragons
- name: Gawain
  kg: 69.4
"#,
        )
        .unwrap();
        let serde_yaml::Value::Sequence(rows) = docs else {
            panic!("expected a sequence");
        };

        let schema = SchemaInferrer::with_config(config())
            .infer(rows, "knights")
            .unwrap();
        assert_eq!(schema.table_names(), vec!["knights", "quest"]);
        assert_eq!(schema.table("quest").unwrap().rows.len(), 2);
    }

    #[test]
    fn test_schema_serializes_to_json() {
        let schema = infer(vec![json!({"name": "Lancelot", "kg": 83})], "knights");
        let json = serde_json::to_value(&schema).unwrap();

        assert_eq!(json["tables"][0]["name"], "knights");
        assert_eq!(json["tables"][0]["columns"][1]["columnType"]["kind"], "integer");
        assert_eq!(json["tables"][0]["rows"][0]["name"], "Lancelot");
        assert_eq!(json["stats"]["recordsRead"], 1);
    }

    #[test]
    fn test_schema_reads_back_from_json() {
        let schema = infer(
            vec![
                json!({"name": "Lancelot", "kg": 83, "horses": [{"name": "Bayard"}]}),
                json!({"name": "Gawain", "kg": 69.4, "horses": [{"name": "Gringolet"}]}),
            ],
            "knights",
        );
        let json = serde_json::to_string(&schema).unwrap();
        let back: InferredSchema = serde_json::from_str(&json).unwrap();

        assert_eq!(back.tables, schema.tables);
        assert_eq!(back.stats, schema.stats);
        assert_eq!(back.table("horses").unwrap().parent(), Some("knights"));
    }
}
