pub mod reader;
pub mod writer;

pub use reader::JsonMomentReader;
pub use writer::JsonMomentWriter;
