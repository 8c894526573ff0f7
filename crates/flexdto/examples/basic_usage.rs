//! Basic Usage Example
//!
//! Declares a few DTO schemas, populates them from mappings, positional
//! arguments and JSON, and reads the cast values back.
//!
//! Run with:
//! ```bash
//! cargo run -p flexdto --example basic_usage
//! ```

use flexdto::{CastKind, Dto, DtoInput, DtoSchema, FnCast, Validation, ValidationErrors, Value};

// ============================================================================
// Mapping Input
// ============================================================================

fn from_mapping() -> anyhow::Result<()> {
    println!("1. Mapping Input");
    println!("----------------");

    let schema = DtoSchema::new("Person")
        .properties(["first_name", "last_name", "age"])
        .cast("age", CastKind::Integer)
        .case_sensitive(false)
        .shared();

    let person = Dto::new(
        schema,
        serde_json::json!({"firstName": "Luca", "LAST_NAME": "Brasi", "age": "35"}),
    )?;

    println!("  first_name: {}", person.property("firstName")?);
    println!("  getAge():   {:?}", person.call("getAge")?);
    println!("  all:        {}", person.to_json()?);
    println!();
    Ok(())
}

// ============================================================================
// Positional Input
// ============================================================================

fn from_arguments() -> anyhow::Result<()> {
    println!("2. Positional Input");
    println!("-------------------");

    let schema = DtoSchema::new("Movie")
        .properties(["title", "released_on", "oscars"])
        .cast("released_on", CastKind::Date)
        .cast(
            "title",
            CastKind::with(FnCast::new("uppercase", |value: &Value| {
                Ok(Value::from(value.to_string().to_uppercase()))
            })),
        )
        .shared();

    let movie = Dto::new(schema, DtoInput::args(["The Godfather", "1972-03-24"]))?;
    for (name, value) in movie.get_all()? {
        println!("  {:<12} {}", name, value);
    }
    println!();
    Ok(())
}

// ============================================================================
// Validation
// ============================================================================

fn with_validation() {
    println!("3. Validation");
    println!("-------------");

    let schema = DtoSchema::new("Review")
        .properties(["title", "score"])
        .validation(
            Validation::new()
                .rule("title", "required")
                .rule("score", "integer|between:1,10")
                .after(|dto: &Dto, errors: &mut ValidationErrors| {
                    if dto.property("title").ok() == Some(Value::from("Fight Club")) {
                        errors.add(
                            "title",
                            "The first rule of Fight Club is: You do not talk about Fight Club.",
                        );
                    }
                }),
        )
        .shared();

    for input in [
        vec![("title", Value::from("Heat")), ("score", Value::Int(9))],
        vec![("title", Value::from("")), ("score", Value::Int(12))],
        vec![("title", Value::from("Fight Club"))],
    ] {
        match Dto::new(schema.clone(), input) {
            Ok(dto) => println!("  valid:   {}", dto.to_json().unwrap_or_default()),
            Err(err) => println!("  invalid: {}", err),
        }
    }
    println!();
}

// ============================================================================
// Main
// ============================================================================

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("FlexDTO Basic Usage");
    println!("===================\n");

    from_mapping()?;
    from_arguments()?;
    with_validation();

    Ok(())
}
