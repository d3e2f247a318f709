pub mod error;
pub mod gemini;
pub mod keys;
pub mod util;

pub use error::{GeminiError, Result};
pub use gemini::{Gemini, ModelTier};
pub use keys::KeyPool;
