pub mod chunker;
pub mod prompt_builder;
pub mod question_writer;
pub mod response_parser;

pub use chunker::Chunker;
pub use question_writer::QuestionWriter;
