//! Queries over plain structs made readable with `#[derive(Attributes)]`.

use recordset::prelude::*;

#[derive(Debug, Clone, PartialEq, Attributes)]
struct Person {
    name: String,
    age: u32,
    #[attribute(rename = "town")]
    city: Option<String>,
    #[attribute(skip)]
    password: String,
}

impl Person {
    fn new(name: &str, age: u32, city: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            age,
            city: city.map(str::to_string),
            password: "hunter2".to_string(),
        }
    }

    fn greeting(&self) -> String {
        format!("Hello, {}", self.name)
    }
}

impl Invocable for Person {
    fn invoke(&self, method: &str, args: &[Value]) -> RecordResult<Value> {
        match (method, args) {
            ("greeting", []) => Ok(Value::from(self.greeting())),
            ("older_than", [Value::Int(years)]) => Ok(Value::Bool(i64::from(self.age) > *years)),
            _ => Err(RecordError::UnknownMethod { method: method.to_string(), kind: self.kind() }),
        }
    }
}

fn persons() -> RecordCollection<Person> {
    vec![
        Person::new("John", 25, Some("Lyon")),
        Person::new("Jane", 31, Some("Paris")),
        Person::new("John", 25, None),
        Person::new("Marc", 47, Some("Paris")),
        Person::new("Lea", 19, None),
    ]
    .into()
}

#[test]
fn derive_lists_exposed_attributes() {
    assert_eq!(Person::ATTRIBUTES, &["name", "age", "town"]);

    let john = Person::new("John", 25, Some("Lyon"));
    assert_eq!(john.kind(), "Person");
    assert_eq!(john.attribute("age").unwrap().as_ref(), &Value::Int(25));
    assert_eq!(john.attribute("town").unwrap().as_ref(), &Value::from("Lyon"));
    assert!(john.attribute("city").is_none());
    assert!(john.attribute("password").is_none());
    assert_eq!(john.password, "hunter2");
}

#[test]
fn distinct_over_struct_fields() {
    let persons = persons();
    assert_eq!(persons.distinct(&["name"]).unwrap().len(), 4);
    assert_eq!(persons.distinct(&["name", "age"]).unwrap().len(), 4);
    assert_eq!(
        persons.distinct(&["password"]).unwrap_err(),
        RecordError::UnknownField { field: "password".into(), kind: "Person" }
    );
    assert_eq!(persons.distinct(&[]).unwrap_err(), RecordError::MissingField("Person"));
}

#[test]
fn filter_and_find_over_structs() {
    let persons = persons();

    let in_paris = persons.filter_by(&criteria! { "town__in" => vec!["Paris"] }).unwrap();
    assert_eq!(in_paris.len(), 2);

    let adults = persons.filter_by(&criteria! { "age__gte" => 21, "name__startswith" => "J" }).unwrap();
    assert_eq!(adults.len(), 3);

    let marc = persons.find_by(&criteria! { "age__gt" => 40 }).unwrap();
    assert_eq!(marc.name, "Marc");

    // A missing town is null, which no text pattern can match.
    assert!(matches!(
        persons.filter_by(&criteria! { "town" => "Lyon" }),
        Err(RecordError::TypeMismatch { .. })
    ));
}

#[test]
fn order_and_group_structs() {
    let persons = persons();

    let by_age = persons.order_by("age", false).unwrap();
    let ages: Vec<u32> = by_age.iter().map(|p| p.age).collect();
    assert_eq!(ages, [19, 25, 25, 31, 47]);
    assert_eq!(by_age[1].city.as_deref(), Some("Lyon"));

    let by_name_desc = persons.order_by(OrderKey::function(|p: &Person| p.name.clone()), true).unwrap();
    assert_eq!(by_name_desc[0].name, "Marc");

    assert!(matches!(persons.order_by(OrderKey::Natural, false), Err(RecordError::InvalidOrdering("Person"))));

    let by_city = persons.group_by(|p| p.city.clone());
    assert_eq!(by_city[&None].len(), 2);
    assert_eq!(by_city[&Some("Paris".to_string())][1].name, "Marc");
}

#[test]
fn map_structs_by_attribute_method_and_function() {
    let persons = persons();

    let names = persons.map("name").unwrap();
    assert_eq!(names.distinct(&[]).unwrap().len(), 4);

    let greetings = persons.map(":greeting").unwrap();
    assert_eq!(greetings[0], Value::from("Hello, John"));

    let older: Vec<Value> = SequenceMapper::new(&persons, Selector::method("older_than"))
        .args(vec![Value::Int(30)])
        .filter(|p| p.city.is_some())
        .collect_into()
        .unwrap();
    assert_eq!(older, [Value::Bool(false), Value::Bool(true), Value::Bool(true)]);

    let by_name = SequenceMapper::new(&persons, Selector::function(|p: &Person| p.age))
        .reversed()
        .cap(5)
        .sort_by(|a, b| a.name.cmp(&b.name))
        .apply()
        .unwrap();
    assert_eq!(by_name.len(), 5);
    assert_eq!(by_name[0], Value::Int(31));

    assert!(matches!(persons.map(":shout"), Err(RecordError::UnknownMethod { .. })));
    assert!(matches!(persons.map(":"), Err(RecordError::InvalidSelector(_))));
}
