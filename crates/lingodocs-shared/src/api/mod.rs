mod dashboard;
mod documents;
mod envelope;

pub use dashboard::*;
pub use documents::*;
pub use envelope::*;
