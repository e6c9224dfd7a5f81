pub(crate) mod directive;
pub(crate) mod interpreter;
pub(crate) mod page;
