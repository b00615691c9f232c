pub mod handle;
pub mod requests;

#[cfg(any(test, feature = "mocks"))]
pub mod mock;
