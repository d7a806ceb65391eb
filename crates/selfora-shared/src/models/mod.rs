mod page;
mod workspace;

pub use page::*;
pub use workspace::*;
