pub mod json_seq;

pub use json_seq::JsonSeqWriter;
