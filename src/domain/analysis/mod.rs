pub mod indicator_frame;
pub mod recommendation;
