pub mod error;
pub mod fonts;
pub mod matting;
pub mod templates;

pub use error::{FontFetchError, InferenceError, PersistenceError, UploadError};
pub use fonts::{FONT_CATALOG, FontProvider, FontRegistry};
pub use matting::{BackgroundRemover, MattingEvent, MattingModel};
pub use templates::{
    BlobStore, LayoutDescriptor, PageRole, RecordPatch, RecordStore, SaveTemplate,
    TemplateGateway, TemplateRecord, TemplateUpdate,
};
