//! Canon catalog, verse references, and the translation enumeration.

mod books;
mod reference;
mod translation;

pub use books::{Book, OriginalLanguage, Testament};
pub use reference::{ReferenceError, VerseRef};
pub use translation::Translation;
