pub(crate) mod clips;
pub(crate) mod clock;
pub(crate) mod cursor;
pub(crate) mod reader;
pub(crate) mod seek;
