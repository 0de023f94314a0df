pub mod blocks;
pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod store;
pub mod styles;
pub mod sync;
pub mod validation;

pub use blocks::BlockField;
pub use config::FolioConfig;
pub use error::{FolioError, Result, SessionError};
pub use model::{
    Block, BlockKind, Document, DocumentUpdate, ImageAlignment, ImageBlock, NewDocument,
    NewProject, Project, TextBlock,
};
pub use session::{EditorSession, OpenDocument, Phase, Resolution};
pub use store::{DocumentStore, MemoryStore};
pub use styles::{StyleChoice, StyleEntry};
pub use sync::SyncController;
pub use validation::ValidationError;
