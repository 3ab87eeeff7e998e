pub(crate) mod memory;
pub(crate) mod packet;
pub(crate) mod source;
