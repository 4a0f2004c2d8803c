mod documents;
mod transcript;

pub use documents::DocumentStore;
pub use transcript::Transcript;
