pub mod error;
pub mod month;

pub use error::{ReopenError, ReopenResult};
pub use month::Month;
