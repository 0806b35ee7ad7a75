mod event;
mod flow;
mod isl;
mod switch;

pub use event::Event;
pub use flow::Flow;
pub use isl::Isl;
pub use switch::Switch;
