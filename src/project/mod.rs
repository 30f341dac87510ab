//! Unreal project parsing: Build.cs descriptors, C++ headers, and the
//! directory scanner that ties them into a dependency graph.

pub mod build_file;
pub mod header;
pub mod scanner;

pub use build_file::BuildFile;
pub use header::HeaderInfo;
pub use scanner::{ProjectScan, Scanner};
