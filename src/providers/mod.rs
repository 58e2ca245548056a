mod anthropic;
mod error;

pub use anthropic::AnthropicProvider;
pub use error::{ProviderError, ProviderErrorKind};
