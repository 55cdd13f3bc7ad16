// Posts: generation requests, history, and the one-time option selection.

pub mod handlers;
pub mod store;
