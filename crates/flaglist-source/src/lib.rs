pub mod dataset;
pub mod record;
pub mod source;

pub use dataset::*;
pub use record::*;
pub use source::*;
