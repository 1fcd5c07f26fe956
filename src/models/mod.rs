pub mod chunk;
pub mod loaders;
pub mod question;

pub use chunk::{GenerationRequest, ModelResponse, TextChunk};
pub use loaders::{list_text_files, load_text_file};
pub use question::{Question, QuestionRecord, QuestionSet, QuestionType, TokenUsage};
