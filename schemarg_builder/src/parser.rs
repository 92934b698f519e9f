mod base;
mod interface;
mod printer;

pub(crate) use self::base::*;
pub(crate) use self::interface::*;
pub(crate) use self::printer::*;
