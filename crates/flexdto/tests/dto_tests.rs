//! Construction, name resolution and read-surface tests

use flexdto::{DataTransferObject, Dto, DtoError, DtoInput, DtoSchema, Value};
use std::sync::Arc;

// ============================================================================
// Sample DTOs
// ============================================================================

fn default_dto() -> Arc<DtoSchema> {
    DtoSchema::new("DefaultDTO")
        .properties(["first_name", "last_name", "fullName", "age"])
        .shared()
}

fn blank_dto() -> Arc<DtoSchema> {
    DtoSchema::new("BlankDTO").properties(["*"]).shared()
}

fn case_insensitive_dto() -> Arc<DtoSchema> {
    DtoSchema::new("CaseInsensitiveDTO")
        .properties(["first_name", "lastName", "full name", "age"])
        .case_sensitive(false)
        .shared()
}

fn ignore_non_permitted_dto() -> Arc<DtoSchema> {
    DtoSchema::new("IgnoreNonPermittedPropertiesDTO")
        .properties(["first_name", "last_name", "fullName", "age"])
        .ignore_non_permitted_properties(true)
        .shared()
}

fn pairs(items: &[(&str, Value)]) -> Vec<(String, Value)> {
    items.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn luca_brasi() -> Vec<(String, Value)> {
    pairs(&[
        ("first_name", Value::from("Luca")),
        ("last_name", Value::from("Brasi")),
        ("fullName", Value::from("Luca Brasi")),
        ("age", Value::Int(35)),
    ])
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_construct_from_mapping() {
    let dto = Dto::new(default_dto(), vec![("first_name", "Luca"), ("last_name", "Brasi")]);
    assert!(dto.is_ok());
}

#[test]
fn test_construct_with_make() {
    struct DefaultDto(Dto);

    impl DataTransferObject for DefaultDto {
        fn schema() -> Arc<DtoSchema> {
            default_dto()
        }

        fn from_dto(dto: Dto) -> Self {
            DefaultDto(dto)
        }
    }

    let dto = DefaultDto::make(vec![("first_name", "Luca"), ("last_name", "Brasi")]).unwrap();
    assert_eq!(dto.0.get("last_name", Value::Null).unwrap(), Value::from("Brasi"));
}

#[test]
fn test_construct_from_positional_arguments() {
    let dto = Dto::new(
        default_dto(),
        DtoInput::args([
            Value::from("Luca"),
            Value::from("Brasi"),
            Value::from("Luca Brasi"),
            Value::Int(44),
        ]),
    )
    .unwrap();

    assert_eq!(
        dto.get_all().unwrap(),
        pairs(&[
            ("first_name", Value::from("Luca")),
            ("last_name", Value::from("Brasi")),
            ("fullName", Value::from("Luca Brasi")),
            ("age", Value::Int(44)),
        ])
    );
}

#[test]
fn test_positional_arguments_truncate_to_whitelist() {
    let short = Dto::from_args(default_dto(), ["Luca"]).unwrap();
    assert_eq!(short.get_populated().unwrap().len(), 1);
    assert_eq!(short.property("age").unwrap(), Value::Null);

    let long = Dto::from_args(default_dto(), ["a", "b", "c", "d", "e", "f"]).unwrap();
    assert_eq!(long.get_original().len(), 4);
    assert!(!long.has("4"));
}

#[test]
fn test_positional_arguments_against_wildcard_are_indexed() {
    let dto = Dto::from_args(blank_dto(), ["Luca", "Brasi"]).unwrap();
    assert_eq!(dto.get("1", Value::Null).unwrap(), Value::from("Brasi"));
}

#[test]
fn test_construct_from_collection() {
    let data = flexdto::Collection::from_pairs(pairs(&[
        ("first_name", Value::from("Luca")),
        ("last_name", Value::from("Brasi")),
    ]));
    let dto = Dto::new(default_dto(), Value::from(data)).unwrap();
    assert!(dto.has("first_name"));
}

#[test]
fn test_construct_from_json() {
    let dto = Dto::new(
        default_dto(),
        serde_json::json!({"first_name": "Luca", "age": 35}),
    )
    .unwrap();
    assert_eq!(dto.property("age").unwrap(), Value::Int(35));
}

// ============================================================================
// Full Reads
// ============================================================================

#[test]
fn test_get_all_round_trips_mapping() {
    let dto = Dto::new(default_dto(), luca_brasi()).unwrap();
    assert_eq!(dto.get_all().unwrap(), luca_brasi());
}

#[test]
fn test_get_all_fills_unset_properties_with_null() {
    let dto = Dto::new(default_dto(), vec![("first_name", "Luca"), ("last_name", "Brasi")]).unwrap();
    assert_eq!(
        dto.get_all().unwrap(),
        pairs(&[
            ("first_name", Value::from("Luca")),
            ("last_name", Value::from("Brasi")),
            ("fullName", Value::Null),
            ("age", Value::Null),
        ])
    );
}

#[test]
fn test_blank_dto_returns_only_set_values() {
    let dto = Dto::new(blank_dto(), luca_brasi()).unwrap();
    assert_eq!(dto.get_all().unwrap(), luca_brasi());

    let partial = Dto::new(blank_dto(), vec![("first_name", "Luca"), ("last_name", "Brasi")]).unwrap();
    assert_eq!(partial.get_all().unwrap().len(), 2);
}

// ============================================================================
// Whitelist Handling
// ============================================================================

#[test]
fn test_rejects_non_permitted_property() {
    let err = Dto::new(default_dto(), vec![("middle_name", "Bruiser")]).unwrap_err();
    assert!(matches!(err, DtoError::PropertyNotAllowed(ref name) if name == "middle_name"));
    assert_eq!(err.to_string(), "middle_name is not an allowed property.");
}

#[test]
fn test_case_sensitive_by_default() {
    let err = Dto::new(default_dto(), vec![("firstName", "Luca")]).unwrap_err();
    assert_eq!(err.property(), Some("firstName"));
}

#[test]
fn test_ignores_non_permitted_properties() {
    let mut data = luca_brasi();
    data.push(("middle_name".to_string(), Value::from("Carlo")));

    let dto = Dto::new(ignore_non_permitted_dto(), data).unwrap();
    assert_eq!(dto.get_all().unwrap(), luca_brasi());
    assert!(!dto.has("middle_name"));
}

#[test]
fn test_accepts_case_insensitive_properties() {
    let dto = Dto::new(
        case_insensitive_dto(),
        pairs(&[
            ("firstName", Value::from("Luca")),
            ("last_name", Value::from("Brasi")),
            ("full_name", Value::from("Luca Brasi")),
            ("age", Value::Int(35)),
        ]),
    )
    .unwrap();

    assert_eq!(
        dto.get_all().unwrap(),
        pairs(&[
            ("first_name", Value::from("Luca")),
            ("lastName", Value::from("Brasi")),
            ("full name", Value::from("Luca Brasi")),
            ("age", Value::Int(35)),
        ])
    );
}

#[test]
fn test_case_insensitive_reads_agree() {
    let dto = Dto::new(case_insensitive_dto(), vec![("firstName", "Luca")]).unwrap();
    for name in ["first_name", "firstName", "FirstName"] {
        assert_eq!(dto.property(name).unwrap(), Value::from("Luca"), "{}", name);
    }
    assert_eq!(dto.call("getFirstName").unwrap(), Value::from("Luca"));
}

// ============================================================================
// Accessors
// ============================================================================

#[test]
fn test_unset_but_allowed_properties_read_null() {
    let dto = Dto::new(default_dto(), vec![("first_name", "Luca")]).unwrap();
    assert_eq!(dto.property("age").unwrap(), Value::Null);
    assert_eq!(dto.call("age").unwrap(), Value::Null);
    assert_eq!(dto.call("getAge").unwrap(), Value::Null);
}

#[test]
fn test_has() {
    let dto = Dto::new(default_dto(), vec![("first_name", "Luca"), ("last_name", "Brasi")]).unwrap();
    assert!(dto.has("first_name"));
    assert!(!dto.has("middle_name"));
}

#[test]
fn test_get_with_default() {
    for schema in [default_dto(), blank_dto()] {
        let dto = Dto::new(schema, vec![("first_name", "Luca")]).unwrap();
        assert_eq!(dto.get("first_name", Value::Null).unwrap(), Value::from("Luca"));
        assert_eq!(dto.get("last_name", Value::Null).unwrap(), Value::Null);
        assert_eq!(dto.get("last_name", "Brasi").unwrap(), Value::from("Brasi"));
    }
}

#[test]
fn test_property_by_any_spelling() {
    let dto = Dto::new(default_dto(), vec![("first_name", "Luca"), ("fullName", "Luca Brasi")]).unwrap();
    assert_eq!(dto.property("first_name").unwrap(), Value::from("Luca"));
    assert_eq!(dto.property("firstName").unwrap(), Value::from("Luca"));
    assert_eq!(dto.property("full_name").unwrap(), Value::from("Luca Brasi"));
}

#[test]
fn test_method_and_getter_reads() {
    let dto = Dto::new(default_dto(), vec![("first_name", "Luca")]).unwrap();
    assert_eq!(dto.call("firstName").unwrap(), Value::from("Luca"));
    assert_eq!(dto.call("getFirstName").unwrap(), Value::from("Luca"));
}

#[test]
fn test_unknown_property_read_fails() {
    let dto = Dto::new(default_dto(), vec![("first_name", "Luca")]).unwrap();
    assert!(matches!(
        dto.property("middle_name"),
        Err(DtoError::PropertyNotAllowed(_))
    ));
    assert!(matches!(
        dto.call("getMiddleName"),
        Err(DtoError::PropertyNotAllowed(ref name)) if name == "getMiddleName"
    ));
}

#[test]
fn test_instances_share_schema_across_threads() {
    let dto = Arc::new(Dto::new(default_dto(), luca_brasi()).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dto = Arc::clone(&dto);
            std::thread::spawn(move || dto.get("age", Value::Null).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Value::Int(35));
    }
}

// ============================================================================
// JSON Ordering
// ============================================================================

fn keys(fields: &[(String, Value)]) -> Vec<&str> {
    fields.iter().map(|(k, _)| k.as_str()).collect()
}

#[test]
fn test_wildcard_json_keeps_insertion_order() {
    let dto = Dto::new(blank_dto(), serde_json::json!({"zeta": 1, "alpha": 2})).unwrap();
    assert_eq!(keys(&dto.get_all().unwrap()), ["zeta", "alpha"]);
    assert_eq!(keys(dto.get_original()), ["zeta", "alpha"]);
}

#[test]
fn test_repeated_spelling_last_write_wins() {
    let dto = Dto::new(
        case_insensitive_dto(),
        serde_json::json!({"first_name": "old", "firstName": "new"}),
    )
    .unwrap();
    assert_eq!(dto.get("first_name", Value::Null).unwrap(), Value::from("new"));
}

#[test]
fn test_to_json_keeps_whitelist_order() {
    let schema = DtoSchema::new("Ordered").properties(["zeta", "alpha"]).shared();
    let dto = Dto::new(schema, vec![("alpha", 2), ("zeta", 1)]).unwrap();
    assert_eq!(dto.to_json().unwrap().to_string(), r#"{"zeta":1,"alpha":2}"#);
}

// ============================================================================
// Empty Input
// ============================================================================

#[test]
fn test_no_positional_arguments_skips_validation() {
    let schema = DtoSchema::new("Movie")
        .properties(["title"])
        .validation(flexdto::Validation::new().rule("title", "required"))
        .shared();

    let dto = Dto::from_args(schema.clone(), Vec::<Value>::new()).unwrap();
    assert!(dto.get_original().is_empty());
    assert!(Dto::from_args(schema, [Value::from("")]).is_err());
}
