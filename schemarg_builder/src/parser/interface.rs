use std::cell::RefCell;

use crate::parser::ErrorContext;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

// We'll target 95% of the total width, to ensure the renderer doesn't literally use the full space.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// Let's assume the average word length is 5.
// Then 17 is a good minimum, because it allows precisely 3 words with a space between them.
pub(crate) const MINIMUM_MIDDLE_WIDTH: usize = 17;

/// Lays out a left column (flags) and a wrapped middle column (help text).
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    padding: usize,
    left: usize,
    middle: usize,
}

impl ColumnRenderer {
    /// Produce a renderer based off the provided widths.
    /// This renderer will use a heuristic to chose the middle width.
    pub(crate) fn guided(padding: usize, left: usize, middle: usize, total_width: usize) -> Self {
        let non_middle = left + padding;
        let target_total_width = (total_width as f64 * TARGET_TOTAL_FACTOR) as usize;
        let guided_middle = std::cmp::max(middle, MINIMUM_MIDDLE_WIDTH);

        if guided_middle + non_middle <= target_total_width {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} and middle fit within the target total {target_total_width}.  Selecting middle: {guided_middle}.");
            }

            Self::new(padding, left, guided_middle)
        } else if non_middle < target_total_width {
            let calculated_middle =
                std::cmp::max(target_total_width - non_middle, MINIMUM_MIDDLE_WIDTH);
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} fit within the target total {target_total_width}.  Selecting middle: {calculated_middle}.");
            }

            Self::new(padding, left, calculated_middle)
        } else {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} do not fit within the total {total_width}.  Selecting middle: {MINIMUM_MIDDLE_WIDTH}.");
            }

            Self::new(padding, left, MINIMUM_MIDDLE_WIDTH)
        }
    }

    /// Produce a renderer based off the provided widths.
    pub(crate) fn new(padding: usize, left: usize, middle: usize) -> Self {
        Self {
            padding: std::cmp::max(padding, 1),
            left: std::cmp::max(left, 1),
            // Middle must be at least 2 (so we can hyphenate).
            middle: std::cmp::max(middle, 2),
        }
    }

    pub(crate) fn render(&self, indent: usize, left: &str, middle: &str) -> Vec<String> {
        let padding = format!("{:width$}", "", width = self.padding);
        let left_column_width = self.left;
        let middle_column_width = std::cmp::max(self.middle.saturating_sub(indent), 2);
        let middle_parts = chunk(middle, middle_column_width);
        let mut out = Vec::default();

        for (i, part) in middle_parts.iter().enumerate() {
            if i == 0 {
                out.push(format!(
                    "{:indent$}{:left_column_width$}{padding}{}",
                    "", left, part
                ));
            } else {
                out.push(format!(
                    "{:indent$}{:left_column_width$}{padding}{}",
                    "", "", part
                ));
            }
        }

        if out.is_empty() {
            out.push(format!("{:indent$}{}", "", left));
        }

        out
    }
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ') {
        if !word.is_empty() {
            let word_length = word.chars().count();

            if current.is_empty() {
                hyphenate(width, &mut lines, &mut current, word);
            } else if current.chars().count() + word_length + 1 <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = String::default();
                hyphenate(width, &mut lines, &mut current, word);
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let characters: Vec<char> = word.chars().collect();
    let increment = width - 1;
    let mut left = 0;
    let mut right = increment;

    while right + 1 < characters.len() {
        lines.push(format!(
            "{}-",
            characters[left..right].iter().collect::<String>()
        ));
        left += increment;
        right += increment;
    }

    current.push_str(&characters[left..].iter().collect::<String>());
}

pub(crate) trait UserInterface {
    fn print(&self, message: String);
    fn print_error(&self, message: String);
    fn print_error_context(&self, error_context: ErrorContext);
}

#[derive(Default)]
pub(crate) struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, message: String) {
        eprintln!("{message}");
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        eprintln!("{error_context}");
    }
}

/// Collects everything printed, so that help may be returned rather than written out.
#[derive(Default)]
pub(crate) struct InMemoryInterface {
    message: RefCell<Vec<String>>,
    error: RefCell<Vec<String>>,
    error_context: RefCell<Option<ErrorContext>>,
}

impl UserInterface for InMemoryInterface {
    fn print(&self, message: String) {
        // Allows for print() to be called many times, concatenating the messages.
        self.message.borrow_mut().push(message);
    }

    fn print_error(&self, message: String) {
        self.error.borrow_mut().push(message);
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        // Assumes print_error_context() is only ever called once.
        self.error_context.borrow_mut().replace(error_context);
    }
}

impl InMemoryInterface {
    #[cfg(test)]
    pub(crate) fn consume(self) -> (Option<String>, Option<String>, Option<ErrorContext>) {
        let InMemoryInterface {
            message,
            error,
            error_context,
        } = self;
        let join = |lines: Vec<String>| {
            if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            }
        };

        (
            join(message.into_inner()),
            join(error.into_inner()),
            error_context.into_inner(),
        )
    }

    pub(crate) fn consume_message(self) -> String {
        let InMemoryInterface { message, .. } = self;
        message.into_inner().join("\n")
    }
}
