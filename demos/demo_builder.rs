use schemarg::{Annotation, Definition, Field, TypedParser};

fn main() {
    let definition = Definition::new("summer")
        .description("Sum (or multiply) the items.")
        .underscores_to_dashes(true)
        .field(
            Field::new("verbose", Annotation::Bool)
                .default(false)
                .short('v')
                .help("Print the intermediate totals."),
        )
        .field(
            Field::new("items", Annotation::list(Annotation::Int))
                .positional()
                .help("The items to combine."),
        )
        .field(
            Field::new("mode", Annotation::Str)
                .default("add")
                .choices(["add", "mul"]),
        )
        .field(
            Field::new("max_total", Annotation::optional(Annotation::Int))
                .default(schemarg::Value::None)
                .help("Stop once the total exceeds this."),
        );

    let instance = TypedParser::new(definition).parse();
    println!("{instance}");

    let items: Vec<i64> = instance.value("items").unwrap_or_default();
    let multiply = instance.value::<String>("mode").is_ok_and(|mode| mode == "mul");
    let total: i64 = if multiply {
        items.iter().product()
    } else {
        items.iter().sum()
    };
    println!("Total: {total}");
}
