use terminal_size::{terminal_size, Width};

use crate::constant::*;
use crate::model::Nargs;
use crate::parser::interface::{ColumnRenderer, UserInterface};

pub(crate) struct OptionParameter {
    name: String,
    short: Option<char>,
    nargs: Nargs,
    required: bool,
    help: Option<String>,
    choices: Vec<String>,
}

impl OptionParameter {
    pub(crate) fn new(
        name: impl Into<String>,
        short: Option<char>,
        nargs: Nargs,
        required: bool,
        help: Option<String>,
        choices: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            short,
            nargs,
            required,
            help,
            choices,
        }
    }
}

pub(crate) struct ArgumentParameter {
    name: String,
    nargs: Nargs,
    help: Option<String>,
    choices: Vec<String>,
}

impl ArgumentParameter {
    pub(crate) fn new(
        name: impl Into<String>,
        nargs: Nargs,
        help: Option<String>,
        choices: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            nargs,
            help,
            choices,
        }
    }
}

pub(crate) struct Printer {
    description: Option<String>,
    options: Vec<OptionParameter>,
    arguments: Vec<ArgumentParameter>,
    subcommands: Vec<(String, Option<String>)>,
    subcommand_required: bool,
    terminal_width: Option<usize>,
}

// Without a terminal, wrap the help text at this width.
const DEFAULT_MIDDLE_WIDTH: usize = 56;
const PADDING_WIDTH: usize = 3;
const MAIN_INDENT: usize = 1;

impl Printer {
    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self::new(None, Vec::default(), Vec::default(), None)
    }

    pub(crate) fn terminal(
        description: Option<String>,
        options: Vec<OptionParameter>,
        arguments: Vec<ArgumentParameter>,
    ) -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self::new(description, options, arguments, terminal_width)
    }

    pub(crate) fn new(
        description: Option<String>,
        options: Vec<OptionParameter>,
        arguments: Vec<ArgumentParameter>,
        terminal_width: Option<usize>,
    ) -> Self {
        Self {
            description,
            options,
            arguments,
            subcommands: Vec::default(),
            subcommand_required: false,
            terminal_width,
        }
    }

    pub(crate) fn with_subcommands(
        mut self,
        subcommands: Vec<(String, Option<String>)>,
        required: bool,
    ) -> Self {
        self.subcommands = subcommands;
        self.subcommand_required = required;
        self
    }

    pub(crate) fn print_help(&self, program: &str, user_interface: &dyn UserInterface) {
        let help_flags = format!("-{HELP_SHORT}, --{HELP_NAME}");
        let mut summary = vec![format!("[-{HELP_SHORT}]")];
        let mut option_rows = vec![(help_flags, HELP_MESSAGE.to_string())];
        let mut argument_rows = Vec::default();
        let mut subcommand_rows = Vec::default();

        for OptionParameter {
            name,
            short,
            nargs,
            required,
            help,
            choices,
        } in &self.options
        {
            let grammar = match nargs {
                Nargs::Precisely(0) => "".to_string(),
                _ => format!(" {}", grammar(name, nargs)),
            };
            let (usage, flags) = match short {
                Some(s) => (format!("-{s}{grammar}"), format!("-{s}, --{name}{grammar}")),
                None => (format!("--{name}{grammar}"), format!("--{name}{grammar}")),
            };

            if *required {
                summary.push(usage);
            } else {
                summary.push(format!("[{usage}]"));
            }

            option_rows.push((flags, describe(help, choices)));
        }

        for ArgumentParameter {
            name,
            nargs,
            help,
            choices,
        } in &self.arguments
        {
            let grammar = grammar(name, nargs);
            summary.push(grammar.clone());
            argument_rows.push((grammar, describe(help, choices)));
        }

        if !self.subcommands.is_empty() {
            let names = self
                .subcommands
                .iter()
                .map(|(name, _)| name.clone())
                .collect::<Vec<String>>()
                .join(",");

            if self.subcommand_required {
                summary.push(format!("{{{names}}} ..."));
            } else {
                summary.push(format!("[{{{names}}} ...]"));
            }

            for (name, help) in &self.subcommands {
                subcommand_rows.push((name.clone(), help.clone().unwrap_or_default()));
            }
        }

        let rows = option_rows
            .iter()
            .chain(argument_rows.iter())
            .chain(subcommand_rows.iter());
        let mut left_column_width = 0;
        let mut middle_column_width = 0;

        for (left, middle) in rows {
            left_column_width = std::cmp::max(left_column_width, left.chars().count());
            middle_column_width =
                std::cmp::max(middle_column_width, middle.chars().count() + MAIN_INDENT);
        }

        let column_renderer = match self.terminal_width {
            Some(tw) => {
                ColumnRenderer::guided(PADDING_WIDTH, left_column_width, middle_column_width, tw)
            }
            None => ColumnRenderer::new(
                PADDING_WIDTH,
                left_column_width,
                std::cmp::min(middle_column_width, DEFAULT_MIDDLE_WIDTH),
            ),
        };

        user_interface.print(format!("usage: {program} {}", summary.join(" ")));

        if let Some(description) = &self.description {
            user_interface.print("".to_string());
            user_interface.print(description.clone());
        }

        for (section, rows) in [
            ("positional arguments:", &argument_rows),
            ("options:", &option_rows),
            ("subcommands:", &subcommand_rows),
        ] {
            if rows.is_empty() {
                continue;
            }

            user_interface.print("".to_string());
            user_interface.print(section.to_string());

            for (left, middle) in rows {
                for line in column_renderer.render(MAIN_INDENT, left, middle) {
                    user_interface.print(line);
                }
            }
        }
    }
}

fn grammar(name: &str, nargs: &Nargs) -> String {
    let name_example = name.to_ascii_uppercase().replace('-', "_");

    match nargs {
        Nargs::Precisely(n) => (0..*n)
            .map(|_| name_example.clone())
            .collect::<Vec<String>>()
            .join(" "),
        Nargs::Any => format!("[{name_example} ...]"),
        Nargs::AtLeastOne => format!("{name_example} [...]"),
    }
}

fn describe(help: &Option<String>, choices: &[String]) -> String {
    let mut description = String::default();

    if !choices.is_empty() {
        description.push_str(&format!("{{{}}} ", choices.join(", ")));
    }

    if let Some(help) = help {
        description.push_str(help);
    }

    description.trim_end().to_string()
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ErrorContext {
    offset: usize,
    tokens: Vec<String>,
}

impl ErrorContext {
    pub(crate) fn new(offset: usize, tokens: &[&str]) -> Self {
        Self {
            offset,
            tokens: tokens.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tokens_length = 0;
        let mut projection = String::default();
        let mut projection_offset = 0;

        for (i, token) in self.tokens.iter().enumerate() {
            tokens_length += token.len();
            projection.push_str(token);

            if i + 1 < self.tokens.len() {
                projection.push(' ');

                if tokens_length <= self.offset {
                    projection_offset += 1;
                }
            }
        }

        write!(
            f,
            "{projection}\n{:width$}^",
            "",
            width = std::cmp::min(self.offset, tokens_length.saturating_sub(1)) + projection_offset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::interface::InMemoryInterface;

    #[test]
    fn print_help_empty() {
        // Setup
        let printer = Printer::empty();
        let interface = InMemoryInterface::default();

        // Execute
        printer.print_help("program", &interface);

        // Verify
        let message = interface.consume_message();
        assert_eq!(
            message,
            r#"usage: program [-h]

options:
 -h, --help   Show this help message and exit."#
        );
    }

    #[test]
    fn print_help_parameters() {
        // Setup
        let printer = Printer::new(
            Some("Counts things.".to_string()),
            vec![
                OptionParameter::new(
                    "count",
                    Some('c'),
                    Nargs::Precisely(1),
                    false,
                    Some("(int, default=1) How many.".to_string()),
                    vec![],
                ),
                OptionParameter::new(
                    "mode",
                    None,
                    Nargs::Precisely(1),
                    true,
                    Some("(Literal{a, b}, required)".to_string()),
                    vec!["a".to_string(), "b".to_string()],
                ),
            ],
            vec![ArgumentParameter::new(
                "path",
                Nargs::AtLeastOne,
                Some("(List<str>, required)".to_string()),
                vec![],
            )],
            None,
        );
        let interface = InMemoryInterface::default();

        // Execute
        printer.print_help("program", &interface);

        // Verify
        let message = interface.consume_message();
        assert_eq!(
            message,
            r#"usage: program [-h] [-c COUNT] --mode MODE PATH [...]

Counts things.

positional arguments:
 PATH [...]          (List<str>, required)

options:
 -h, --help          Show this help message and exit.
 -c, --count COUNT   (int, default=1) How many.
 --mode MODE         {a, b} (Literal{a, b}, required)"#
        );
    }

    #[test]
    fn print_help_subcommands() {
        // Setup
        let printer = Printer::new(
            None,
            vec![OptionParameter::new(
                "verbose",
                None,
                Nargs::Precisely(0),
                false,
                None,
                vec![],
            )],
            vec![],
            None,
        )
        .with_subcommands(
            vec![
                ("run".to_string(), Some("Run it.".to_string())),
                ("stop".to_string(), None),
            ],
            true,
        );
        let interface = InMemoryInterface::default();

        // Execute
        printer.print_help("program", &interface);

        // Verify
        let message = interface.consume_message();
        assert_eq!(
            message,
            r#"usage: program [-h] [--verbose] {run,stop} ...

options:
 -h, --help   Show this help message and exit.
 --verbose

subcommands:
 run          Run it.
 stop"#
        );
    }

    #[test]
    fn error_context_tokens0() {
        for offset in 0..4 {
            assert_eq!(ErrorContext::new(offset, &[]).to_string(), "\n^");
        }
    }

    #[test]
    fn error_context_tokens1() {
        assert_eq!(ErrorContext::new(0, &["abc"]).to_string(), "abc\n^");
        assert_eq!(ErrorContext::new(1, &["abc"]).to_string(), "abc\n ^");
        assert_eq!(ErrorContext::new(2, &["abc"]).to_string(), "abc\n  ^");
        assert_eq!(ErrorContext::new(3, &["abc"]).to_string(), "abc\n  ^");
    }

    #[test]
    fn error_context_tokens2() {
        assert_eq!(
            ErrorContext::new(0, &["abc", "123"]).to_string(),
            "abc 123\n^"
        );
        assert_eq!(
            ErrorContext::new(2, &["abc", "123"]).to_string(),
            "abc 123\n  ^"
        );
        assert_eq!(
            ErrorContext::new(3, &["abc", "123"]).to_string(),
            "abc 123\n    ^"
        );
        assert_eq!(
            ErrorContext::new(5, &["abc", "123"]).to_string(),
            "abc 123\n      ^"
        );
        assert_eq!(
            ErrorContext::new(6, &["abc", "123"]).to_string(),
            "abc 123\n      ^"
        );
    }
}
