use schemarg::{tapify, Annotation, Definition, Field};

fn main() {
    let definition = Definition::new("greet")
        .field(Field::new("name", Annotation::Str).positional_only())
        .field(Field::new("greeting", Annotation::Str).default("Hello"))
        .field(Field::new("times", Annotation::Int).default(1))
        .extra_keywords();

    tapify(definition, |mut arguments| {
        let name: String = arguments.take_positional().unwrap_or_default();
        let greeting: String = arguments.take("greeting").unwrap_or_default();
        let times: u8 = arguments.take("times").unwrap_or(1);

        for _ in 0..times {
            println!("{greeting}, {name}!");
        }

        for (key, value) in &arguments.extra {
            println!("(ignored {key}={value})");
        }
    });
}
