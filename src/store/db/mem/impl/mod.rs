mod event;
mod flow;
mod isl;
mod switch;
