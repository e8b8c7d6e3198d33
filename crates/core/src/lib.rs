pub mod model;
pub mod prompts;

pub use model::{AnthropicModelClient, ModelClient, ModelError, ReplyStream};
pub use prompts::{consultation_prompt, PREAMBLE};
