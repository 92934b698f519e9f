pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';
pub(crate) const HELP_MESSAGE: &str = "Show this help message and exit.";

// Reserved argument name for the sub-command discriminator; cannot collide with a field flag.
pub(crate) const SUBCOMMAND_NAME: &str = "{subcommand}";

pub(crate) const END_OF_OPTIONS: &str = "--";
