use schemarg::derive::*;
use schemarg::TypedArgs;

#[derive(Debug, TypedArgs)]
struct Common {
    /// Print the intermediate totals.
    #[schemarg(default = false, short = 'v')]
    verbose: bool,
}

/// Sum (or multiply) the items.
#[derive(Debug, TypedArgs)]
#[schemarg(program = "summer", underscores_to_dashes)]
struct Parameters {
    #[schemarg(flatten)]
    common: Common,
    /// The items to combine.
    #[schemarg(positional)]
    items: Vec<u32>,
    #[schemarg(default = "add", choices = ["add", "mul"])]
    mode: String,
    /// Stop once the total exceeds this.
    max_total: Option<u32>,
}

fn main() {
    let parameters = Parameters::parse();
    let mut total: u64 = if parameters.mode == "add" { 0 } else { 1 };

    for item in &parameters.items {
        total = match parameters.mode.as_str() {
            "add" => total + u64::from(*item),
            _ => total * u64::from(*item),
        };

        if parameters.common.verbose {
            println!("Running total: {total}");
        }

        if parameters.max_total.is_some_and(|max| total > u64::from(max)) {
            break;
        }
    }

    println!("Total: {total}");
}
