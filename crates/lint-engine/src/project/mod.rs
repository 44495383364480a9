pub mod file;
pub mod io;
pub mod source;
pub mod tree;

pub use file::FileRef;
pub use source::{FsResourceProvider, ResourceProvider};
pub use tree::{DeltaResource, ResourceDelta, ResourceNode};
