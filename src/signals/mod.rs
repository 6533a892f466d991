//! Rendering of auxiliary model signals into prompt-ready text.
//!
//! Two independent signal sources can be injected into a prompt: top-K
//! classification predictions from a vision model ([`predictions`]) and
//! knowledge-graph retrieval payloads ([`retrieval`]).

pub mod predictions;
pub mod retrieval;

pub use predictions::{render_predictions, PredictionPayload, RenderedPredictions};
pub use retrieval::{
    render_retrieval, RetrievalPayload, RetrievalRecord, RetrievalValue, NO_RETRIEVAL_PLACEHOLDER,
    RETRIEVAL_HEADER,
};
