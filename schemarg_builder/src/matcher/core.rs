use std::collections::{HashMap, VecDeque};
use thiserror::Error;

use crate::constant::END_OF_OPTIONS;
use crate::matcher::api::*;
use crate::matcher::model::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TokenMatcherError {
    #[error("Cannot duplicate the option '{0}'.")]
    DuplicateOption(String),

    #[error("Cannot duplicate the short option '{0}'.")]
    DuplicateShortOption(char),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum MatchError {
    #[error("Not enough tokens provided to parameter '{0}'.")]
    Undercomplete(String),

    #[error("Too many tokens provided to parameter '{0}'.")]
    Overcomplete(String),

    #[error("Unrecognized argument '{0}'.")]
    ArgumentsExhausted(String),

    #[error("Option '{0}' does not exist.")]
    InvalidOption(String),

    #[error("Short option '{0}' does not exist.")]
    InvalidShortOption(char),
}

impl From<CloseError> for MatchError {
    fn from(error: CloseError) -> Self {
        match error {
            CloseError::TooFewValues { name, .. } => MatchError::Undercomplete(name),
            CloseError::TooManyValues { name, .. } => MatchError::Overcomplete(name),
        }
    }
}

/// Groups raw tokens into per-parameter matches.
///
/// Options may repeat, in which case the latest occurrence replaces the earlier one.
/// In known-only mode, unknown options are set aside as extras, as are surplus positional tokens.
/// An unknown option keeps at most the one value after it, and only when no argument is still waiting for tokens.
#[derive(Debug)]
pub(crate) struct TokenMatcher {
    option_bounds: HashMap<String, Bound>,
    short_options: HashMap<char, String>,
    arguments: VecDeque<ArgumentConfig>,
    known_only: bool,
    fed: usize,
    matches: Vec<MatchTokens>,
    extras: Vec<String>,
    buffer: Option<MatchBuffer>,
    collecting_extras: bool,
    options_ended: bool,
}

impl TokenMatcher {
    pub(crate) fn new(
        options: Vec<OptionConfig>,
        arguments: VecDeque<ArgumentConfig>,
        known_only: bool,
    ) -> Result<Self, TokenMatcherError> {
        let mut option_bounds = HashMap::default();
        let mut short_options = HashMap::default();

        for option_config in options.into_iter() {
            if option_bounds
                .insert(option_config.name().to_string(), option_config.bound())
                .is_some()
            {
                return Err(TokenMatcherError::DuplicateOption(
                    option_config.name().to_string(),
                ));
            }

            if let Some(short) = option_config.short() {
                if short_options
                    .insert(short, option_config.name().to_string())
                    .is_some()
                {
                    return Err(TokenMatcherError::DuplicateShortOption(short));
                }
            }
        }

        Ok(Self {
            option_bounds,
            short_options,
            arguments,
            known_only,
            fed: 0,
            matches: Vec::default(),
            extras: Vec::default(),
            buffer: None,
            collecting_extras: false,
            options_ended: false,
        })
    }

    pub(crate) fn feed(&mut self, token: &str) -> Result<(), MatchError> {
        let token_length = token.len();
        // 1. After '--', everything is a value.
        // 2. Find a 'long' flag, such as:
        //  --initial
        //  --initial ..
        //  --initial=..
        // 3. Find 'short' flag(s), such as (both -i and -v are example short flags):
        //  -i
        //  -i ..
        //  -i=..
        //  -iv
        //  -iv ..
        //  -iv=..
        // 4. Match against a value (including negative numbers, such as -1 or -2.5).
        let result = if self.options_ended {
            self.match_argument(token)
        } else if token == END_OF_OPTIONS {
            self.options_ended = true;
            self.collecting_extras = false;
            self.update_buffer(None)
        } else if let Some(option) = token.strip_prefix("--") {
            self.match_option(token, split_equals_delimiter(option))
        } else if token.len() > 1 && token.starts_with('-') && !self.is_negative_number(token) {
            self.match_option_short(token, split_equals_delimiter(&token[1..]))
        } else {
            self.match_argument(token)
        };

        self.fed += token_length;
        result
    }

    fn is_negative_number(&self, token: &str) -> bool {
        match token[1..].chars().next() {
            Some(c) if c.is_ascii_digit() || c == '.' => {
                !self.short_options.contains_key(&c) && token.parse::<f64>().is_ok()
            }
            _ => false,
        }
    }

    fn match_argument(&mut self, token: &str) -> Result<(), MatchError> {
        if std::mem::take(&mut self.collecting_extras) && self.arguments.is_empty() {
            self.extras.push(token.to_string());
            return Ok(());
        }

        let mut match_buffer = match self.buffer.take() {
            Some(match_buffer) => {
                if match_buffer.is_open() {
                    match_buffer
                } else {
                    // Flip to the next argument
                    let match_tokens = match_buffer.close().expect(
                        "internal error - by definition, a non-open buffer must be able to close",
                    );
                    self.push_match(match_tokens);

                    match self.next_argument() {
                        Some(match_buffer) => match_buffer,
                        None => return self.surplus(token),
                    }
                }
            }
            None => match self.next_argument() {
                Some(match_buffer) => match_buffer,
                None => return self.surplus(token),
            },
        };

        match_buffer.push(self.fed, token.to_string());

        if self.buffer.replace(match_buffer).is_some() {
            unreachable!("internal error - the buffer is expected to be None");
        }

        Ok(())
    }

    fn next_argument(&mut self) -> Option<MatchBuffer> {
        self.arguments
            .pop_front()
            .map(|argument_config| MatchBuffer::new(argument_config.name(), argument_config.bound()))
    }

    fn surplus(&mut self, token: &str) -> Result<(), MatchError> {
        if self.known_only {
            self.extras.push(token.to_string());
            Ok(())
        } else {
            Err(MatchError::ArgumentsExhausted(token.to_string()))
        }
    }

    fn unknown_option(&mut self, token: &str, error: MatchError) -> Result<(), MatchError> {
        if self.known_only {
            self.update_buffer(None)?;
            self.extras.push(token.to_string());
            self.collecting_extras = true;
            Ok(())
        } else {
            Err(error)
        }
    }

    fn match_option(
        &mut self,
        token: &str,
        (option_name, single_argument): (&str, Option<&str>),
    ) -> Result<(), MatchError> {
        let bound = match self.option_bounds.get(option_name) {
            Some(bound) => *bound,
            None => {
                return self.unknown_option(token, MatchError::InvalidOption(option_name.to_string()))
            }
        };
        self.collecting_extras = false;
        self.update_buffer(None)?;
        let mut match_buffer = MatchBuffer::new(option_name, bound);

        match single_argument {
            Some(value) => {
                // The 3 comes from the option specifier '--' and argument specifier '='.
                match_buffer.push(self.fed + option_name.len() + 3, value.to_string());

                // Options using k=v syntax cannot follow up with more values afterwards.
                let match_tokens = match_buffer.close()?;
                self.push_match(match_tokens);
            }
            None => {
                self.buffer.replace(match_buffer);
            }
        };

        Ok(())
    }

    fn match_option_short(
        &mut self,
        token: &str,
        (short_option_name, single_argument): (&str, Option<&str>),
    ) -> Result<(), MatchError> {
        let singles: Vec<char> = short_option_name.chars().collect();

        if let Some(unknown) = singles
            .iter()
            .find(|single| !self.short_options.contains_key(single))
        {
            return self.unknown_option(token, MatchError::InvalidShortOption(*unknown));
        }

        self.collecting_extras = false;
        self.update_buffer(None)?;

        for (index, single) in singles.iter().enumerate() {
            let name = self
                .short_options
                .get(single)
                .cloned()
                .expect("internal error - short option must exist");
            let bound = *self
                .option_bounds
                .get(&name)
                .expect("internal error - mis-aligned short option");
            let mut match_buffer = MatchBuffer::new(name, bound);

            // Only the final option may accept values.
            if index + 1 == singles.len() {
                match single_argument {
                    Some(value) => {
                        // The 2 comes from the short option specifier '-' and argument specifier '='.
                        match_buffer.push(
                            self.fed + short_option_name.len() + 2,
                            value.to_string(),
                        );
                        let match_tokens = match_buffer.close()?;
                        self.push_match(match_tokens);
                    }
                    None => {
                        self.buffer.replace(match_buffer);
                    }
                };
            } else {
                let match_tokens = match_buffer.close()?;
                self.push_match(match_tokens);
            }
        }

        Ok(())
    }

    fn update_buffer(&mut self, next_buffer: Option<MatchBuffer>) -> Result<(), MatchError> {
        let previous_buffer = std::mem::replace(&mut self.buffer, next_buffer);

        if let Some(match_buffer) = previous_buffer {
            let match_tokens = match_buffer.close()?;
            self.push_match(match_tokens);
        }

        Ok(())
    }

    fn push_match(&mut self, match_tokens: MatchTokens) {
        self.matches.retain(|mt| mt.name != match_tokens.name);
        self.matches.push(match_tokens);
    }

    /// Whether `name` has matched so far (including the parameter currently being fed).
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.matches.iter().any(|mt| mt.name == name)
            || matches!(&self.buffer, Some(match_buffer) if match_buffer.name() == name)
    }

    /// Whether the parameter `name` is currently being fed and has taken all the values it can.
    pub(crate) fn is_saturated(&self, name: &str) -> bool {
        matches!(&self.buffer, Some(match_buffer) if match_buffer.name() == name && !match_buffer.is_open())
    }

    #[cfg(test)]
    pub(crate) fn can_close(&self) -> bool {
        if let Some(match_buffer) = &self.buffer {
            if !match_buffer.can_close() {
                return false;
            }
        }

        self.arguments
            .iter()
            .all(|ac| MatchBuffer::new(ac.name(), ac.bound()).can_close())
    }

    pub(crate) fn close(mut self) -> Result<Matches, (usize, MatchError, Matches)> {
        let mut close_error: Option<CloseError> = None;

        if let Some(match_buffer) = self.buffer.take() {
            match match_buffer.close() {
                Ok(match_tokens) => {
                    self.push_match(match_tokens);
                }
                Err(error) => {
                    close_error.replace(error);
                }
            };
        }

        // Arguments that received no tokens at all stay unmatched; the caller reports them as missing.
        for argument_config in std::mem::take(&mut self.arguments) {
            let match_buffer = MatchBuffer::new(argument_config.name(), argument_config.bound());
            match match_buffer.close() {
                Ok(match_tokens) => {
                    self.push_match(match_tokens);
                }
                Err(CloseError::TooFewValues { provided: 0, .. }) => {}
                Err(error) => {
                    // Only track the first error.
                    if close_error.is_none() {
                        close_error.replace(error);
                    }
                }
            };
        }

        let matches = Matches {
            values: self.matches,
            extras: self.extras,
        };

        if let Some(error) = close_error {
            Err((self.fed, MatchError::from(error), matches))
        } else {
            Ok(matches)
        }
    }
}

fn split_equals_delimiter(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((n, v)) => (n, Some(v)),
        None => (token, None),
    }
}
