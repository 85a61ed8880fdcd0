mod codec;
mod formatter;

pub use codec::*;
pub use formatter::*;
