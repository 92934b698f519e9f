use thiserror::Error;

use crate::matcher::api::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MatchTokens {
    pub name: String,
    pub values: Vec<OffsetValue>,
}

impl MatchTokens {
    pub(crate) fn tokens(&self) -> Vec<String> {
        self.values.iter().map(|(_, value)| value.clone()).collect()
    }

    pub(crate) fn offset(&self) -> Option<usize> {
        self.values.first().map(|(offset, _)| *offset)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(super) enum CloseError {
    #[error("too few values provided for '{name}' (provided={provided}, expected={expected}).")]
    TooFewValues {
        name: String,
        provided: usize,
        expected: u8,
    },

    #[error("too many values provided for '{name}' (provided={provided}, expected={expected}).")]
    TooManyValues {
        name: String,
        provided: usize,
        expected: u8,
    },
}

#[derive(Debug)]
pub(super) struct MatchBuffer {
    name: String,
    bound: Bound,
    values: Vec<OffsetValue>,
}

impl MatchBuffer {
    pub(super) fn new(name: impl Into<String>, bound: Bound) -> Self {
        Self {
            name: name.into(),
            bound,
            values: Vec::default(),
        }
    }

    pub(super) fn name(&self) -> &str {
        &self.name
    }

    pub(super) fn push(&mut self, offset: usize, value: String) {
        self.values.push((offset, value));
    }

    pub(super) fn is_open(&self) -> bool {
        match self.bound.upper() {
            Some(n) => self.values.len() < n as usize,
            None => true,
        }
    }

    pub(super) fn can_close(&self) -> bool {
        self.values.len() >= self.bound.lower() as usize
    }

    pub(super) fn close(self) -> Result<MatchTokens, CloseError> {
        let lower = self.bound.lower();

        if self.values.len() < lower as usize {
            return Err(CloseError::TooFewValues {
                name: self.name,
                provided: self.values.len(),
                expected: lower,
            });
        }

        if let Some(upper) = self.bound.upper() {
            if self.values.len() > upper as usize {
                return Err(CloseError::TooManyValues {
                    name: self.name,
                    provided: self.values.len(),
                    expected: upper,
                });
            }
        }

        Ok(MatchTokens {
            name: self.name,
            values: self.values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};
    use rstest::rstest;

    #[test]
    fn argument_config() {
        let name = "name";

        for _ in 0..100 {
            let bound: Bound = thread_rng().gen();
            let config = ArgumentConfig::new(name, bound);
            assert_eq!(config.name(), name);
            assert_eq!(config.bound(), bound);
        }
    }

    #[rstest]
    #[case(None)]
    #[case(Some('n'))]
    fn option_config(#[case] short: Option<char>) {
        let name = "name";

        for _ in 0..100 {
            let bound: Bound = thread_rng().gen();
            let config = OptionConfig::new(name, short, bound);
            assert_eq!(config.name(), name);
            assert_eq!(config.short(), short);
            assert_eq!(config.bound(), bound);
        }
    }

    #[test]
    fn match_tokens() {
        let match_tokens = MatchTokens {
            name: "xs".to_string(),
            values: vec![(4, "1".to_string()), (5, "2".to_string())],
        };
        assert_eq!(match_tokens.tokens(), vec!["1", "2"]);
        assert_eq!(match_tokens.offset(), Some(4));

        let empty = MatchTokens {
            name: "flag".to_string(),
            values: vec![],
        };
        assert_eq!(empty.offset(), None);
    }

    #[rstest]
    #[case(Bound::Lower(0), 0, true)]
    #[case(Bound::Lower(0), 1, true)]
    #[case(Bound::Lower(1), 0, false)]
    #[case(Bound::Lower(1), 1, true)]
    #[case(Bound::Lower(1), 2, true)]
    #[case(Bound::Lower(10), 2, false)]
    #[case(Bound::Range(0, 2), 0, true)]
    #[case(Bound::Range(0, 2), 1, true)]
    #[case(Bound::Range(1, 2), 0, false)]
    #[case(Bound::Range(1, 2), 1, true)]
    #[case(Bound::Range(1, 2), 2, true)]
    #[case(Bound::Range(10, 20), 2, false)]
    fn match_buffer_lower(#[case] bound: Bound, #[case] feed: u8, #[case] expected_ok: bool) {
        let name = "name";
        let remains_open = match bound.upper() {
            Some(upper) => upper > feed,
            None => true,
        };
        let mut pb = MatchBuffer::new(name, bound);
        assert!(pb.is_open());
        assert_eq!(pb.name(), name);
        let tokens: Vec<(usize, String)> = (0..feed)
            .map(|i| (thread_rng().gen(), i.to_string()))
            .collect();

        for (offset, token) in &tokens {
            pb.push(*offset, token.clone());
        }

        assert_eq!(pb.is_open(), remains_open);

        if expected_ok {
            assert!(pb.can_close());
            assert_eq!(
                pb.close().unwrap(),
                MatchTokens {
                    name: name.to_string(),
                    values: tokens,
                }
            );
        } else {
            assert!(!pb.can_close());
            assert_eq!(
                pb.close().unwrap_err(),
                CloseError::TooFewValues {
                    name: name.to_string(),
                    provided: feed as usize,
                    expected: bound.lower(),
                }
            );
        }
    }

    #[rstest]
    #[case(Bound::Range(0, 0), 0, true)]
    #[case(Bound::Range(0, 0), 1, false)]
    #[case(Bound::Range(0, 1), 0, true)]
    #[case(Bound::Range(0, 1), 1, true)]
    #[case(Bound::Range(0, 1), 2, false)]
    #[case(Bound::Range(0, 10), 20, false)]
    fn match_buffer_upper(#[case] bound: Bound, #[case] feed: u8, #[case] expected_ok: bool) {
        let name = "name";
        let upper = bound.upper().expect("un-planned test case");
        let mut pb = MatchBuffer::new(name, bound);
        assert_eq!(pb.is_open(), upper > 0);

        for i in 0..feed {
            pb.push(i as usize, i.to_string());
        }

        assert!(pb.can_close());

        if expected_ok {
            assert_eq!(pb.is_open(), upper > feed);
            assert_matches!(pb.close(), Ok(MatchTokens { values, .. }) if values.len() == feed as usize);
        } else {
            assert_eq!(
                pb.close().unwrap_err(),
                CloseError::TooManyValues {
                    name: name.to_string(),
                    provided: feed as usize,
                    expected: upper,
                }
            );
        }
    }
}
