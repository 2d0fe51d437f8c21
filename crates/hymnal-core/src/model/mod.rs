pub mod category;
pub mod hymn;
pub mod ids;
pub mod verse;

pub use category::Category;
pub use hymn::{Hymn, HymnDraft, HymnFilter};
pub use ids::{HymnId, Origin};
pub use verse::{Verse, VerseKind};
