pub mod actor;
pub mod events;
pub mod model;

pub use actor::{spawn, StateHandle};
pub use events::StateEvent;
pub use model::{MetadataEntry, MetadataKey, ServerState, StateSnapshot};
