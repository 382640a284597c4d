pub mod consultancy;
pub mod error;
pub mod events;
pub mod media;
pub mod models;
pub mod reports;
pub mod schema;

pub use consultancy::{parse_report, ConsultancyKind, ConsultancyRequest};
pub use error::StudioError;
pub use events::EventLog;
pub use media::MediaPart;
pub use models::ModelRegistry;
pub use reports::ConsultancyReport;
pub use schema::SchemaNode;
