use schemarg::{Annotation, Definition, Field, TypedParser};

fn main() {
    let definition = Definition::new("service")
        .field(Field::new("verbose", Annotation::Bool).default(false))
        .subcommand(
            "start",
            Definition::default()
                .description("Start the service.")
                .field(Field::new("port", Annotation::Int).default(8080))
                .field(Field::new("host", Annotation::Str).default("localhost")),
        )
        .subcommand(
            "stop",
            Definition::default()
                .description("Stop the service.")
                .field(Field::new("force", Annotation::Bool).default(false)),
        );

    let instance = TypedParser::new(definition).parse();

    match instance.subcommand() {
        Some(("start", start)) => {
            println!("Starting on {:?}:{:?}.", start.get("host"), start.get("port"));
        }
        Some(("stop", stop)) => {
            println!("Stopping (force: {:?}).", stop.get("force"));
        }
        Some((other, _)) => println!("Unexpected sub-command '{other}'."),
        None => println!("No sub-command."),
    }
}
