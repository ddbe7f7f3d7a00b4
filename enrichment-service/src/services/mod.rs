//! Services module for enrichment-service.

pub mod enricher;
pub mod metrics;
pub mod ocr;
pub mod parser;
pub mod providers;

pub use enricher::UnitEnricher;
pub use metrics::init_metrics;
pub use ocr::{MockOcr, OcrEngine, OcrError, TesseractOcr};
pub use parser::{parse_reply, ReplyField};
pub use providers::{
    GenerationParams, MockTextProvider, OpenAiChatProvider, OpenAiConfig, ProviderError,
    TextProvider,
};
