use std::path::PathBuf;

use schemarg::{Annotation, Definition, Field, Trust, TypedParser};

fn main() {
    // Values from `defaults.args` and then `overrides.json` apply before the command line.
    let definition = Definition::new("trainer")
        .config_file("defaults.args")
        .config_file("overrides.json")
        .field(Field::new("learning_rate", Annotation::Float).default(0.1))
        .field(Field::new("layers", Annotation::list(Annotation::Int)).default(vec![64i64, 64]))
        .field(Field::new("output", Annotation::Str).default("run.json"));

    let instance = TypedParser::new(definition.clone()).parse();
    println!("{instance}");

    let output: PathBuf = match instance.value("output") {
        Ok(output) => output,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };

    if let Err(error) = instance.save(&output, true) {
        eprintln!("{error}");
        std::process::exit(1);
    }

    let mut restored = instance.clone();
    match restored.load(&output, Trust::Untrusted, false) {
        Ok(()) => println!("Restored: {restored}"),
        Err(error) => eprintln!("{error}"),
    }
}
