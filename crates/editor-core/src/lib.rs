pub mod reducer;
pub mod segment;
pub mod speakers;
pub mod types;
pub mod view;

pub use reducer::{EditAction, EditError};
pub use segment::sentences;
pub use speakers::{canonicalize_label, default_roster, resolve};
pub use types::{Cell, CompactView, SessionState, Speaker};
pub use view::compact;
