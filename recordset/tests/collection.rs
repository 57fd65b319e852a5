//! End-to-end tests of the collection query surface over dynamic records.

use std::collections::BTreeSet;

use recordset::prelude::*;
use regex::RegexBuilder;
use serde_json::json;

fn people() -> RecordCollection {
    RecordCollection::try_from_json(json!([
        { "name": "Alice", "age": 25, "gender": "female" },
        { "name": "Bob", "age": 40, "gender": "male" },
        { "name": "Charlie", "age": 30, "gender": "male" },
        { "name": "Dave", "age": 30, "gender": "male" },
    ]))
    .unwrap()
}

fn names(collection: &RecordCollection) -> Vec<String> {
    collection
        .iter()
        .map(|person| person.get_attribute("name").unwrap().to_string())
        .collect()
}

fn name_set(collection: &RecordCollection) -> BTreeSet<String> {
    names(collection).into_iter().collect()
}

fn set(expected: &[&str]) -> BTreeSet<String> {
    expected.iter().map(|name| name.to_string()).collect()
}

#[test]
fn filter_by_keyword_table() {
    let people = people();
    let cases: [(Criteria, &[&str]); 11] = [
        (criteria! { "age" => 25 }, &["Alice"]),
        (criteria! { "gender" => "male", "age" => 30 }, &["Charlie", "Dave"]),
        (criteria! { "name" => ".*a.*" }, &["Charlie", "Dave"]),
        (criteria! { "age__gt" => 25, "name__contains" => "v" }, &["Dave"]),
        (criteria! { "name" => ".*a.*|.*e.*" }, &["Alice", "Charlie", "Dave"]),
        (criteria! { "name" => "" }, &["Alice", "Bob", "Charlie", "Dave"]),
        (criteria! {}, &["Alice", "Bob", "Charlie", "Dave"]),
        (criteria! { "age" => 100 }, &[]),
        (criteria! { "name" => "^A.*" }, &["Alice"]),
        (criteria! { "name" => ".*e$" }, &["Alice", "Charlie", "Dave"]),
        (criteria! { "name" => "^A.*|.*e$" }, &["Alice", "Charlie", "Dave"]),
    ];

    for (criteria, expected) in cases {
        let result = people.filter_by(&criteria).unwrap();
        assert_eq!(name_set(&result), set(expected), "criteria {criteria}");
    }
}

#[test]
fn filter_leaves_receiver_untouched() {
    let people = people();
    let before = people.clone();
    let result = people.filter_by(&criteria! { "age" => 25 }).unwrap();

    assert_ne!(result, people);
    assert_eq!(people, before);
}

#[test]
fn ordering_across_types_is_rejected() {
    let err = people().filter_by(&criteria! { "age__gt" => "25" }).unwrap_err();
    assert_eq!(err, RecordError::type_mismatch("gt", "int", "str"));
    assert_eq!(err.to_string(), "unsupported operand type(s) for gt: 'int' and 'str'");
}

#[test]
fn compiled_patterns_carry_flags() {
    let people = people();

    let containing_z = RegexBuilder::new(".*z.*").case_insensitive(true).build().unwrap();
    let query = Query::from(Predicate::pattern("name", containing_z));
    assert!(people.filter(&[query], &Criteria::new()).unwrap().is_empty());

    let ending_ie = RegexBuilder::new(".*ie$").case_insensitive(true).build().unwrap();
    let query = Query::from(Predicate::pattern("name", ending_ie));
    assert_eq!(names(&people.filter(&[query], &Criteria::new()).unwrap()), ["Charlie"]);

    assert!(matches!(Predicate::regex("name", "["), Err(RecordError::InvalidPattern(_))));
}

#[test]
fn find_by_table() {
    let people = people();
    let found = [
        (criteria! { "name" => "Bob" }, "Bob"),
        (criteria! { "name" => "Alice", "age" => 25 }, "Alice"),
        (criteria! { "age__lt" => 30 }, "Alice"),
        (criteria! { "gender__in" => vec!["female", "nonbinary"] }, "Alice"),
        (criteria! { "name__startswith" => "C" }, "Charlie"),
        (criteria! { "gender__not" => "male" }, "Alice"),
        (criteria! { "name__endswith" => "b" }, "Bob"),
        (criteria! { "age__lte" => 25 }, "Alice"),
        (criteria! { "age__gte" => 40 }, "Bob"),
        (criteria! { "age__gt" => 39 }, "Bob"),
        (criteria! { "age__nin" => vec![25, 30] }, "Bob"),
        (criteria! { "name__contains" => "v" }, "Dave"),
    ];

    for (criteria, expected) in found {
        let person = people.find_by(&criteria).unwrap();
        assert_eq!(person.get_attribute("name").unwrap().to_string(), expected, "criteria {criteria}");
    }
}

#[test]
fn find_by_failures() {
    let people = people();

    for criteria in [criteria! { "name" => ".*a.*" }, criteria! { "name__contains" => "i" }] {
        assert!(matches!(people.find_by(&criteria), Err(RecordError::MultipleRecordsFound(_))));
    }
    for criteria in [criteria! { "name" => "Eve" }, criteria! { "age" => 20 }] {
        assert!(matches!(people.find_by(&criteria), Err(RecordError::RecordNotFound(_))));
    }

    assert_eq!(
        people.find_by(&criteria! { "email" => "alice@example.com" }).unwrap_err(),
        RecordError::UnknownAttribute("email".into())
    );
    assert_eq!(
        people.find_by(&criteria! { "name__notValid" => "i" }).unwrap_err(),
        RecordError::InvalidOperator("notValid".into())
    );

    let err = people.find_by(&criteria! { "name__contains" => "i" }).unwrap_err();
    assert_eq!(err.to_string(), r#"more than one record found for {name__contains: "i"}"#);
}

#[test]
fn or_composition_evaluates_as_and() {
    let people = people();
    let young = Query::from(Predicate::lt("age", 30));
    let old = Query::from(Predicate::gt("age", 35));

    // Neither young nor old persons satisfy both operands.
    let either = people.filter(&[young.clone() | old.clone()], &Criteria::new()).unwrap();
    assert!(either.is_empty());

    let both = people.filter(&[young & old], &Criteria::new()).unwrap();
    assert_eq!(both, either);
}

#[test]
fn positional_queries_are_combined_with_criteria() {
    let people = people();
    let males = Query::from(Predicate::new("gender", None, "male"));
    let result = people.filter(&[males], &criteria! { "age__lt" => 35 }).unwrap();
    assert_eq!(names(&result), ["Charlie", "Dave"]);
}

#[test]
fn order_by_attribute_and_function() {
    let people = people();
    assert_eq!(names(&people.order_by("age", false).unwrap()), ["Alice", "Charlie", "Dave", "Bob"]);

    let by_name = OrderKey::function(|person: &Value| {
        person.get_attribute("name").map(|name| name.into_owned()).unwrap_or_default()
    });
    assert_eq!(names(&people.order_by(by_name, false).unwrap()), ["Alice", "Bob", "Charlie", "Dave"]);

    assert_eq!(
        OrderKey::<Value>::try_from(Value::Int(123)).unwrap_err(),
        RecordError::InvalidKeyType("int")
    );
}

#[test]
fn order_by_natural_order() {
    let numbers: RecordCollection = vec![4, 2, 1, 3].into_iter().map(Value::from).collect();
    assert_eq!(numbers.order_by(OrderKey::Natural, false).unwrap().into_vec(), vec![
        Value::Int(1),
        Value::Int(2),
        Value::Int(3),
        Value::Int(4)
    ]);

    let mixed: RecordCollection = vec![Value::Int(4), Value::Int(2), Value::from("3")].into();
    assert_eq!(mixed.order_by("", false).unwrap_err(), RecordError::InvalidOrdering("str"));

    let words: RecordCollection = ["apple", "banana", "orange", "f", "pear", "c'est encore moi"]
        .into_iter()
        .map(Value::from)
        .collect();
    let by_len = OrderKey::function(|word: &Value| word.as_str().map_or(0, str::len));
    assert_eq!(words.order_by(by_len, false).unwrap().into_vec(), vec![
        Value::from("f"),
        Value::from("pear"),
        Value::from("apple"),
        Value::from("banana"),
        Value::from("orange"),
        Value::from("c'est encore moi"),
    ]);
}

#[test]
fn group_by_key_function() {
    let numbers: RecordCollection = vec![1, 2, 3, 4].into_iter().map(Value::from).collect();
    let parity = numbers.group_by(|n| n.as_i64().unwrap_or_default() % 2 == 0);
    assert_eq!(parity[&true].as_slice(), &[Value::Int(2), Value::Int(4)]);
    assert_eq!(parity[&false].as_slice(), &[Value::Int(1), Value::Int(3)]);

    let fruits: RecordCollection = ["apple", "banana", "orange", "pear", "bouger"]
        .into_iter()
        .map(Value::from)
        .collect();
    let initials = fruits.group_by(|fruit| fruit.to_string().chars().next());
    assert_eq!(initials.len(), 4);
    assert_eq!(initials[&Some('b')].as_slice(), &[Value::from("banana"), Value::from("bouger")]);
}

#[test]
fn slicing_helpers() {
    let people = people();
    assert_eq!(names(&people.offset(2)), ["Charlie", "Dave"]);
    assert_eq!(names(&people.limit(2)), ["Alice", "Bob"]);
    assert_eq!(people.all().len(), 4);
    assert_eq!(names(&people.order_by("age", true).unwrap().limit(1)), ["Bob"]);
    assert_eq!(people.first().and_then(|p| p.attribute("name")).unwrap().as_ref(), &Value::from("Alice"));
}

#[test]
fn distinct_values_and_fields() {
    let numbers: RecordCollection = vec![1, 2, 3, 4].into_iter().map(Value::from).collect();
    assert_eq!(numbers.distinct(&[]).unwrap(), numbers);

    let fruits: RecordCollection = ["apple", "banana", "orange", "f", "pear", "orange"]
        .into_iter()
        .map(Value::from)
        .collect();
    assert_eq!(fruits.distinct(&[]).unwrap().len(), 5);

    let mut with_duplicate = people();
    with_duplicate.push(Value::from(json!({ "name": "Alice", "age": 25, "gender": "female" })));
    assert_eq!(with_duplicate.distinct(&["name", "age"]).unwrap(), people());
    assert_eq!(names(&with_duplicate.distinct(&["gender"]).unwrap()), ["Alice", "Bob"]);
}

#[test]
fn records_select_and_round_trip() {
    let raw = json!({ "a": 1, "b": { "c": 2, "d": [3, 4] } });
    let record = DynamicRecord::from_json(raw.clone()).unwrap();

    let selected = record.select(["b"]).unwrap();
    assert_eq!(selected.to_json(), json!({ "b": { "c": 2, "d": [3, 4] } }));
    assert!(matches!(record.select_value(&Value::from("b")), Err(RecordError::TypeMismatch { .. })));
    assert_eq!(record.select(["zzz"]).unwrap_err(), RecordError::UnknownAttribute("zzz".into()));

    assert_eq!(record.to_json(), raw);
    assert_eq!(DynamicRecord::from_bson(record.to_bson()), record);
}

#[test]
fn match_config_from_json() {
    let config = MatchConfig::from_json_str(r#"{ "regex_fallback": false }"#).unwrap();
    let result = people()
        .filter_with(&[], &criteria! { "name" => "^A.*" }, &config)
        .unwrap();
    assert!(result.is_empty());
}

#[test]
fn collections_serialize_as_plain_arrays() {
    let people = people().limit(1);
    assert_eq!(people.to_json(), json!([{ "name": "Alice", "age": 25, "gender": "female" }]));

    let decoded: RecordCollection = serde_json::from_value(people.to_json()).unwrap();
    assert_eq!(decoded, people);
}
