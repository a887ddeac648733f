mod search;
mod slots;

pub use search::cmd_search;
pub use slots::{cmd_slots, cmd_today};
