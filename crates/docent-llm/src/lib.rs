//! docent-llm - the provider gateway for docent.
//!
//! One [`Completion`](docent_core::traits::Completion) implementation,
//! [`CompletionGateway`], fronts every supported backend. Each backend is a
//! small adapter that shapes the HTTP request and extracts text and token
//! usage from the response. HTTP itself sits behind the [`Transport`] trait
//! so the gateway can be exercised without a network.
//!
//! # Supported Providers
//!
//! - **OpenAI**, **Mistral**, **LM Studio** - chat-completions dialect
//! - **Anthropic** - messages API
//! - **Gemini** - `generateContent`, key in the query string
//! - **Cohere** - chat API
//! - **Ollama** - local `/api/generate`
//!
//! # Example
//!
//! ```ignore
//! use docent_llm::CompletionGateway;
//! use docent_core::traits::{Completion, CompletionRequest};
//!
//! let gateway = CompletionGateway::new();
//! let response = gateway
//!     .generate_completion(&resolved, CompletionRequest::new("Summarize the report"))
//!     .await?;
//! ```

mod gateway;
mod providers;
mod transport;

pub use gateway::CompletionGateway;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

// Re-export core types for convenience
pub use docent_core::traits::{
    Completion, CompletionRequest, CompletionResponse, ResolvedProvider, TokenUsage,
};
