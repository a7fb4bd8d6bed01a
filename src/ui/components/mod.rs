pub mod controls;
pub mod disclosure;
pub mod transcript_view;

pub use controls::Controls;
pub use disclosure::Disclosure;
pub use transcript_view::TranscriptView;
