use super::*;
use serde_json::json;

fn find(options: Value) -> FindQuery {
    FindQuery::from_json(&options).unwrap()
}

fn data(value: Value) -> Data {
    Data::from_json(&value).unwrap()
}

fn filter(value: Value) -> Filter {
    Filter::from_json(&value).unwrap()
}

#[test]
fn test_select_star() {
    let b = StatementBuilder::new();
    assert_eq!(
        b.build_select("user", &find(json!({"id": 1}))).unwrap(),
        "SELECT * FROM user WHERE id='1'"
    );
}

#[test]
fn test_select_columns_projection() {
    let b = StatementBuilder::new();
    assert_eq!(
        b.build_select(
            "user",
            &find(json!({"selectColumns": ["id", "name"], "age": {">": 18}}))
        )
        .unwrap(),
        "SELECT id,name FROM user WHERE age >'18'"
    );
}

#[test]
fn test_select_columns_anywhere_in_options() {
    let b = StatementBuilder::new();
    assert_eq!(
        b.build_select(
            "user",
            &find(json!({"a": 1, "selectColumns": ["name"], "b": 2}))
        )
        .unwrap(),
        "SELECT name FROM user WHERE a='1' AND b='2'"
    );
}

#[test]
fn test_select_columns_null_is_select_star() {
    let b = StatementBuilder::new();
    assert_eq!(
        b.build_select("user", &find(json!({"selectColumns": null, "a": 1})))
            .unwrap(),
        "SELECT * FROM user WHERE a='1'"
    );
}

#[test]
fn test_select_with_empty_filter_has_no_where() {
    let b = StatementBuilder::new();
    assert_eq!(
        b.build_select("user", &FindQuery::default()).unwrap(),
        "SELECT * FROM user"
    );
    assert_eq!(
        b.build_select("user", &find(json!({"selectColumns": ["id"]})))
            .unwrap(),
        "SELECT id FROM user"
    );
}

#[test]
fn test_select_rejects_empty_projection_built_by_hand() {
    let b = StatementBuilder::new();
    let query = FindQuery::default().select(Vec::<String>::new());
    assert!(b.build_select("user", &query).unwrap_err().is_malformed_filter());
}

#[test]
fn test_insert() {
    let b = StatementBuilder::new();
    assert_eq!(
        b.build_insert(
            "user",
            &data(json!({"firstName": "gayan", "lastName": "witharana"}))
        )
        .unwrap(),
        "INSERT INTO user (firstName,lastName) VALUES ('gayan','witharana');"
    );
}

#[test]
fn test_insert_mixed_scalars() {
    let b = StatementBuilder::new();
    let payload = Data::new().set("name", "a").set("age", 3).set("active", false);
    assert_eq!(
        b.build_insert("user", &payload).unwrap(),
        "INSERT INTO user (name,age,active) VALUES ('a','3','false');"
    );
}

#[test]
fn test_insert_empty_is_rejected() {
    let b = StatementBuilder::new();
    assert!(matches!(
        b.build_insert("user", &Data::new()),
        Err(OrmError::EmptyInsert)
    ));
}

#[test]
fn test_data_rejects_nested_values() {
    for bad in [json!({"a": {"b": 1}}), json!({"a": [1]}), json!({"a": null}), json!(3)] {
        assert!(matches!(
            Data::from_json(&bad),
            Err(OrmError::MalformedData(_))
        ));
    }
}

#[test]
fn test_data_set_replaces_existing_column() {
    let payload = Data::new().set("a", 1).set("b", 2).set("a", 3);
    let cols: Vec<_> = payload.columns().cloned().collect();
    assert_eq!(
        cols,
        vec![("a".to_string(), Scalar::from(3)), ("b".to_string(), Scalar::from(2))]
    );
}

#[test]
fn test_update() {
    let b = StatementBuilder::new();
    assert_eq!(
        b.build_update(
            "user",
            Some(&data(json!({"firstName": "gayan", "lastName": "madhumal"}))),
            &filter(json!({"id": 1}))
        )
        .unwrap(),
        "UPDATE user SET firstName='gayan', lastName='madhumal' WHERE id='1';"
    );
}

#[test]
fn test_update_with_disjunction() {
    let b = StatementBuilder::new();
    assert_eq!(
        b.build_update(
            "user",
            Some(&Data::new().set("status", "inactive")),
            &filter(json!({"or": [{"age": {"<": 18}}, {"banned": true}]}))
        )
        .unwrap(),
        "UPDATE user SET status='inactive' WHERE (age <'18' OR banned='true');"
    );
}

#[test]
fn test_update_without_data_is_rejected() {
    let b = StatementBuilder::new();
    let f = filter(json!({"id": 1}));
    assert!(matches!(
        b.build_update("user", Some(&Data::new()), &f),
        Err(OrmError::EmptyUpdate)
    ));
    assert!(matches!(
        b.build_update("user", None, &f),
        Err(OrmError::EmptyUpdate)
    ));
}

#[test]
fn test_empty_update_checked_before_filter() {
    let b = StatementBuilder::new();
    assert!(matches!(
        b.build_update("user", None, &Filter::new()),
        Err(OrmError::EmptyUpdate)
    ));
}

#[test]
fn test_update_and_delete_require_filter() {
    let b = StatementBuilder::new();
    assert!(matches!(
        b.build_update("user", Some(&Data::new().set("a", 1)), &Filter::new()),
        Err(OrmError::MissingFilter("UPDATE"))
    ));
    assert!(matches!(
        b.build_delete("user", &Filter::new()),
        Err(OrmError::MissingFilter("DELETE"))
    ));
}

#[test]
fn test_delete() {
    let b = StatementBuilder::new();
    assert_eq!(
        b.build_delete("user", &filter(json!({"firstName": "gayan", "age": {"<": 30}})))
            .unwrap(),
        "DELETE FROM user WHERE firstName='gayan' AND age <'30';"
    );
}

#[test]
fn test_malformed_filter_propagates() {
    let b = StatementBuilder::new();
    let err = FindQuery::from_json(&json!({"age": {"<": 30, ">": 10}})).unwrap_err();
    assert!(err.is_malformed_filter());
    let err = b
        .build_delete("user", &Filter::new().or(vec![Filter::new()]))
        .unwrap_err();
    assert!(err.is_malformed_filter());
}

#[test]
fn test_hardened_builder() {
    let b = StatementBuilder::hardened();
    assert_eq!(b.mode(), RenderMode::Hardened);
    assert_eq!(
        b.build_insert("user", &Data::new().set("name", "o'brien")).unwrap(),
        r#"INSERT INTO "user" ("name") VALUES ('o''brien');"#
    );
    assert!(matches!(
        b.build_select("user; DROP TABLE user", &FindQuery::default()),
        Err(OrmError::InvalidIdentifier(_))
    ));
    assert!(matches!(
        b.build_select("user", &FindQuery::default().select(["id, password"])),
        Err(OrmError::InvalidIdentifier(_))
    ));
    assert!(matches!(
        b.build_update("user", Some(&Data::new().set("a=1,b", 1)), &Filter::new().eq("id", 1)),
        Err(OrmError::InvalidIdentifier(_))
    ));
}

#[test]
fn test_hardened_quotes_reserved_words_and_mixed_case() {
    let b = StatementBuilder::hardened();
    assert_eq!(
        b.build_select("user", &FindQuery::default()).unwrap(),
        r#"SELECT * FROM "user""#
    );
    assert_eq!(
        b.build_select("user", &find(json!({"selectColumns": ["id", "firstName"], "age": {">": 18}})))
            .unwrap(),
        r#"SELECT "id","firstName" FROM "user" WHERE "age" >'18'"#
    );
    assert_eq!(
        b.build_insert("user", &Data::new().set("firstName", "gayan")).unwrap(),
        r#"INSERT INTO "user" ("firstName") VALUES ('gayan');"#
    );
    assert_eq!(
        b.build_update(
            "order",
            Some(&Data::new().set("status", "shipped")),
            &Filter::new().eq("id", 1)
        )
        .unwrap(),
        r#"UPDATE "order" SET "status"='shipped' WHERE "id"='1';"#
    );
    assert_eq!(
        b.build_delete("order", &Filter::new().eq("id", 1)).unwrap(),
        r#"DELETE FROM "order" WHERE "id"='1';"#
    );
}
