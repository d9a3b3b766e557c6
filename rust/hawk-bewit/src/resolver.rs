//! Credential lookup.
//!
//! Verification asks a [`CredentialResolver`] for the record belonging to a
//! bewit's id exactly once. The resolver may be backed by anything: a map, a
//! database, a remote service. Its answer is one of:
//!
//! - `Ok(Some(record))`: a record to validate and verify against.
//! - `Ok(None)`: no such id, reported as unknown credentials.
//! - `Err(failure)`: the lookup itself failed. The failure's error is handed
//!   back to the caller unchanged, along with any partial record.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use hawk_mac::CredentialRecord;

use crate::sync::{MaybeSend, MaybeSync};

/// A failed credential lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupFailure<E, M = ()> {
    /// What went wrong.
    pub error: E,
    /// Whatever record the resolver had when it failed.
    pub credentials: Option<CredentialRecord<M>>,
}

impl<E, M> LookupFailure<E, M> {
    /// A failure with no partial record.
    pub fn new(error: E) -> Self {
        Self {
            error,
            credentials: None,
        }
    }

    /// Attach the record the resolver had when it failed.
    pub fn with_credentials(mut self, credentials: CredentialRecord<M>) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

impl<E, M> From<E> for LookupFailure<E, M> {
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

/// Looks up credentials by id.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait CredentialResolver: MaybeSync {
    /// Caller-defined data attached to each record.
    type Metadata: MaybeSend;
    /// Error reported when a lookup fails.
    type Error: MaybeSend;

    /// Find the record for `id`.
    async fn resolve(
        &self,
        id: &str,
    ) -> Result<Option<CredentialRecord<Self::Metadata>>, LookupFailure<Self::Error, Self::Metadata>>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<R> CredentialResolver for Arc<R>
where
    R: CredentialResolver + ?Sized,
{
    type Metadata = R::Metadata;
    type Error = R::Error;

    async fn resolve(
        &self,
        id: &str,
    ) -> Result<Option<CredentialRecord<Self::Metadata>>, LookupFailure<Self::Error, Self::Metadata>>
    {
        self.as_ref().resolve(id).await
    }
}

/// A resolver backed by an async function of the id.
///
/// Built with [`resolver_fn`].
pub struct FnResolver<F, M, E> {
    lookup: F,
    marker: PhantomData<fn() -> (M, E)>,
}

impl<F, M, E> std::fmt::Debug for FnResolver<F, M, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnResolver").finish_non_exhaustive()
    }
}

/// Wrap an async function as a [`CredentialResolver`].
///
/// ```
/// use hawk_bewit::{Algorithm, CredentialRecord, LookupFailure, resolver_fn};
///
/// let resolver = resolver_fn(|id: String| async move {
///     Ok::<_, LookupFailure<String>>(Some(CredentialRecord::new(
///         id,
///         "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn",
///         Algorithm::Sha256,
///     )))
/// });
/// # let _ = resolver;
/// ```
pub fn resolver_fn<F, Fut, M, E>(lookup: F) -> FnResolver<F, M, E>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Option<CredentialRecord<M>>, LookupFailure<E, M>>>,
{
    FnResolver {
        lookup,
        marker: PhantomData,
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<F, Fut, M, E> CredentialResolver for FnResolver<F, M, E>
where
    F: Fn(String) -> Fut + MaybeSync,
    Fut: Future<Output = Result<Option<CredentialRecord<M>>, LookupFailure<E, M>>>
        + MaybeSend
        + 'static,
    M: MaybeSend + 'static,
    E: MaybeSend + 'static,
{
    type Metadata = M;
    type Error = E;

    async fn resolve(
        &self,
        id: &str,
    ) -> Result<Option<CredentialRecord<M>>, LookupFailure<E, M>> {
        (self.lookup)(id.to_string()).await
    }
}

/// A fixed set of records held in memory.
#[derive(Debug, Clone)]
pub struct MemoryResolver<M = ()> {
    records: HashMap<String, CredentialRecord<M>>,
}

impl<M> Default for MemoryResolver<M> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
        }
    }
}

impl<M> MemoryResolver<M> {
    /// An empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` under `id`, replacing any previous record.
    pub fn insert(&mut self, id: impl Into<String>, record: CredentialRecord<M>) -> &mut Self {
        self.records.insert(id.into(), record);
        self
    }

    /// Builder form of [`MemoryResolver::insert`].
    pub fn with(mut self, id: impl Into<String>, record: CredentialRecord<M>) -> Self {
        self.insert(id, record);
        self
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<M> CredentialResolver for MemoryResolver<M>
where
    M: Clone + MaybeSync,
{
    type Metadata = M;
    type Error = Infallible;

    async fn resolve(
        &self,
        id: &str,
    ) -> Result<Option<CredentialRecord<M>>, LookupFailure<Infallible, M>> {
        Ok(self.records.get(id).cloned())
    }
}
