//! teller-llm: generative-completion client used as the extraction
//! fallback.

pub mod gemini;

pub use gemini::GeminiClient;
