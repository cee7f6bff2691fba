pub(crate) mod datetime;
pub(crate) mod string;
