pub mod chunked;

pub use chunked::ChunkedVisited;
