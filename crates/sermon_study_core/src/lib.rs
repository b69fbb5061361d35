pub mod domain;
pub mod extract;
pub mod plan;
pub mod ports;
pub mod prompt;
pub mod validate;

pub use domain::{
    ContentAnalysis, DailyStudy, GenerationOptions, RawStudyEntry, StudyPlan, Transcript,
    TranscriptItem, UsageMode, VideoMetadata,
};
pub use ports::{
    AuthService, ExportArtifact, ExportFormat, GenerationParams, OutputSchema, PortError,
    PortResult, StudyExportService, TextGenerationService, VideoMetadataService,
};
