pub mod base64url;
pub mod interval;
pub mod status;
pub mod version;

pub use status::StatusLayout;
pub use version::{Protocol, VersionTag};
