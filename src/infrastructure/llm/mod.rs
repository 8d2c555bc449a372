mod openai_vision_client;
mod scripted_vision_client;
mod sse_decoder;

pub use openai_vision_client::{OpenAiVisionClient, create_vision_client};
pub use scripted_vision_client::ScriptedVisionClient;
pub use sse_decoder::{SseDecoder, SseFrame};
