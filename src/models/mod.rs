pub mod comment;
pub mod tag;
pub mod thread;
