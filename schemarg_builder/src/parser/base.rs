use std::collections::{HashSet, VecDeque};

use crate::constant::*;
use crate::error::{SchemaError, UsageError};
use crate::matcher::*;

impl From<TokenMatcherError> for SchemaError {
    fn from(error: TokenMatcherError) -> Self {
        match error {
            TokenMatcherError::DuplicateOption(name) => {
                SchemaError::DuplicateArgumentName(format!("--{name}"))
            }
            TokenMatcherError::DuplicateShortOption(short) => {
                SchemaError::DuplicateArgumentName(format!("-{short}"))
            }
        }
    }
}

impl From<MatchError> for UsageError {
    fn from(error: MatchError) -> Self {
        UsageError::Parse(error.to_string())
    }
}

/// Drives the token matcher over one grammar level.
///
/// When a discriminator is configured, consumption stops as soon as it has taken its token.
/// Whatever follows is handed back untouched for the selected subcommand.
#[derive(Debug)]
pub(crate) struct Parser {
    token_matcher: TokenMatcher,
    discriminator: Option<String>,
}

impl Parser {
    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self::new(Vec::default(), Vec::default(), None, false).unwrap()
    }

    pub(crate) fn new(
        options: Vec<OptionConfig>,
        arguments: Vec<ArgumentConfig>,
        discriminator: Option<ArgumentConfig>,
        known_only: bool,
    ) -> Result<Self, SchemaError> {
        let help_config = OptionConfig::new(HELP_NAME, Some(HELP_SHORT), Bound::Range(0, 0));
        let mut names = HashSet::from([HELP_NAME.to_string()]);
        let mut option_configs = vec![help_config];
        let mut argument_configs = VecDeque::default();

        for oc in options.into_iter() {
            if !names.insert(oc.name().to_string()) {
                return Err(SchemaError::DuplicateArgumentName(format!("--{}", oc.name())));
            }

            option_configs.push(oc);
        }

        for ac in arguments.into_iter() {
            if !names.insert(ac.name().to_string()) {
                return Err(SchemaError::DuplicateArgumentName(ac.name().to_string()));
            }

            argument_configs.push_back(ac);
        }

        let discriminator = match discriminator {
            Some(ac) => {
                let name = ac.name().to_string();
                argument_configs.push_back(ac);
                Some(name)
            }
            None => None,
        };

        let token_matcher = TokenMatcher::new(option_configs, argument_configs, known_only)?;

        Ok(Self {
            token_matcher,
            discriminator,
        })
    }

    pub(crate) fn consume(self, tokens: &[&str]) -> Result<Action, (usize, UsageError)> {
        let Parser {
            mut token_matcher,
            discriminator,
        } = self;

        let mut token_iter = tokens.iter();
        let mut fed = 0;

        for token in token_iter.by_ref() {
            if let Err(error) = token_matcher.feed(token) {
                // Help wins over anything malformed that follows it.
                if token_matcher.contains(HELP_NAME) {
                    return Ok(Action::PrintHelp);
                }

                return Err((fed, UsageError::from(error)));
            }

            fed += token.len();

            if let Some(target) = &discriminator {
                if token_matcher.is_saturated(target) {
                    break;
                }
            }
        }

        let matches = match token_matcher.close() {
            Ok(matches) | Err((_, _, matches)) if matches.contains(HELP_NAME) => {
                return Ok(Action::PrintHelp);
            }
            Ok(matches) => matches,
            Err((offset, error, _)) => return Err((offset, UsageError::from(error))),
        };

        let discriminee = match &discriminator {
            Some(target) => matches
                .get(target)
                .and_then(|match_tokens| match_tokens.values.first().cloned()),
            None => None,
        };

        Ok(Action::Continue {
            matches,
            discriminee,
            remaining: token_iter.map(|s| s.to_string()).collect(),
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Continue {
        matches: Matches,
        discriminee: Option<OffsetValue>,
        remaining: Vec<String>,
    },
    PrintHelp,
}
