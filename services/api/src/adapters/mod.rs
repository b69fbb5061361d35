pub mod auth;
pub mod export;
pub mod study_llm;
pub mod transcript;

pub use auth::NoopAuthAdapter;
pub use export::TextExportAdapter;
pub use study_llm::OpenAiStudyAdapter;
pub use transcript::YoutubeVideoAdapter;
