pub mod client;
pub mod locale;

pub use client::{DEFAULT_HOST, PER_PAGE, PhraseClient, PhraseClientConfig};
