//! Thread-safety bounds that relax on single-threaded targets.
//!
//! Resolvers run inside `async_trait` futures. Native futures must be `Send`,
//! while `wasm32` futures cannot be, so the bounds are picked per target and
//! re-exported under one name.

#[cfg(not(target_arch = "wasm32"))]
mod target {
    /// Values that may move to another thread. Same as [`Send`].
    pub trait MaybeSend: Send {}

    impl<T: Send + ?Sized> MaybeSend for T {}

    /// Values that may be shared between threads. Same as `Send + Sync`.
    pub trait MaybeSync: Send + Sync {}

    impl<T: Send + Sync + ?Sized> MaybeSync for T {}
}

#[cfg(target_arch = "wasm32")]
mod target {
    /// Any value. `wasm32` has a single thread.
    pub trait MaybeSend {}

    impl<T: ?Sized> MaybeSend for T {}

    /// Any value. `wasm32` has a single thread.
    pub trait MaybeSync {}

    impl<T: ?Sized> MaybeSync for T {}
}

pub use target::{MaybeSend, MaybeSync};
