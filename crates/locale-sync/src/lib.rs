pub mod catalog;
pub mod diagnostics;
pub mod error;
pub mod feedback;
pub mod locale;
pub mod pattern;
pub mod pull;
pub mod push;
pub mod resolver;
pub mod source;
pub mod target;
pub mod transfer;

pub use catalog::{CatalogError, LocaleCatalog};
pub use diagnostics::Diagnostics;
pub use error::SyncError;
pub use feedback::{Feedback, Reporter};
pub use locale::{LocaleId, LocaleRecord};
pub use pattern::{
    CapturedValues, FilePattern, PathMatcher, PatternError, PatternMode, Placeholder,
    PlaceholderValues,
};
pub use pull::{PullReport, Puller};
pub use push::{LocalFile, PushReport, Pusher, UploadedFile, local_files, local_files_in};
pub use resolver::{ResolvedFile, check_preconditions, resolve};
pub use source::{SourceSpec, UploadOptions};
pub use target::{DownloadOptions, OptionValue, TargetSpec};
pub use transfer::{Transfer, TransferError, UploadRequest, UploadSummary};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
