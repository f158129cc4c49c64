pub mod error;
pub mod file_store;
pub mod session_store;

pub use error::{Result, StoreError};
pub use file_store::FileStore;
pub use session_store::SessionStore;
