//! Side-table of documentation metadata keyed by handler identity.
//!
//! The store exclusively owns every metadata record. It also owns the
//! kind-scoped sequence counters that order collection entries: each
//! application of a collection annotation draws the next value for its kind,
//! whichever handler it targets.
//!
//! A process-wide instance is reachable through [`global`]. Independent
//! instances created with [`MetadataStore::new`] behave identically and are
//! what tests should reach for when they assert on exact sequence values.

use crate::metadata::{
    BodyMetadata, Handler, HandlerId, HandlerMetadata, OperationMetadata, ParameterMetadata,
    ResponseMetadata, RouteMetadata, SecurityMetadata, SequenceKind, TagMetadata,
};
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

/// Accumulated documentation fragments for every registered handler
#[derive(Debug, Default)]
pub struct MetadataStore {
    next_handler: u64,
    entries: HashMap<HandlerId, HandlerMetadata>,
    counters: HashMap<SequenceKind, u64>,
}

static GLOBAL: OnceLock<Mutex<MetadataStore>> = OnceLock::new();

/// Lock the process-wide store.
///
/// A poisoned lock is recovered: every store operation leaves the table
/// consistent, so a panic elsewhere cannot corrupt it.
pub fn global() -> MutexGuard<'static, MetadataStore> {
    GLOBAL
        .get_or_init(|| Mutex::new(MetadataStore::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

impl MetadataStore {
    /// Create an empty store with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its declared name and hand out its token.
    ///
    /// Registering the same name twice yields two distinct handlers.
    pub fn register(&mut self, name: impl Into<String>) -> Handler {
        let id = HandlerId(self.next_handler);
        self.next_handler += 1;
        let handler = Handler::new(id, name.into());
        debug!("Registered {} as {}", handler.name(), id);
        handler
    }

    /// Draw the next sequence index for `kind`
    pub fn next_sequence(&mut self, kind: SequenceKind) -> u64 {
        let counter = self.counters.entry(kind).or_insert(0);
        let sequence = *counter;
        *counter += 1;
        sequence
    }

    /// Reset one kind's counter without touching stored metadata
    pub fn reset_sequence(&mut self, kind: SequenceKind) {
        self.counters.remove(&kind);
    }

    /// Reset every counter without touching stored metadata
    pub fn reset_sequences(&mut self) {
        self.counters.clear();
    }

    fn entry(&mut self, handler: HandlerId) -> &mut HandlerMetadata {
        self.entries.entry(handler).or_default()
    }

    pub fn set_operation(&mut self, handler: HandlerId, metadata: OperationMetadata) {
        self.entry(handler).operation = Some(metadata);
    }

    pub fn operation(&self, handler: HandlerId) -> Option<&OperationMetadata> {
        self.entries.get(&handler)?.operation.as_ref()
    }

    pub fn set_body(&mut self, handler: HandlerId, metadata: BodyMetadata) {
        self.entry(handler).body = Some(metadata);
    }

    pub fn body(&self, handler: HandlerId) -> Option<&BodyMetadata> {
        self.entries.get(&handler)?.body.as_ref()
    }

    pub fn set_route(&mut self, handler: HandlerId, metadata: RouteMetadata) {
        self.entry(handler).route = Some(metadata);
    }

    pub fn route(&self, handler: HandlerId) -> Option<&RouteMetadata> {
        self.entries.get(&handler)?.route.as_ref()
    }

    pub fn add_response(&mut self, handler: HandlerId, metadata: ResponseMetadata) {
        let responses = &mut self.entry(handler).responses;
        responses.push(metadata);
        responses.sort_by_key(|r| r.sequence);
    }

    pub fn add_param(&mut self, handler: HandlerId, metadata: ParameterMetadata) {
        let params = &mut self.entry(handler).params;
        params.push(metadata);
        params.sort_by_key(|p| p.sequence);
    }

    pub fn add_query(&mut self, handler: HandlerId, metadata: ParameterMetadata) {
        let queries = &mut self.entry(handler).queries;
        queries.push(metadata);
        queries.sort_by_key(|q| q.sequence);
    }

    pub fn add_security(&mut self, handler: HandlerId, metadata: SecurityMetadata) {
        let security = &mut self.entry(handler).security;
        security.push(metadata);
        security.sort_by_key(|s| s.sequence);
    }

    pub fn add_tag(&mut self, handler: HandlerId, metadata: TagMetadata) {
        let tags = &mut self.entry(handler).tags;
        tags.push(metadata);
        tags.sort_by_key(|t| t.sequence);
    }

    pub fn responses(&self, handler: HandlerId) -> &[ResponseMetadata] {
        self.entries
            .get(&handler)
            .map_or(&[], |e| e.responses.as_slice())
    }

    /// First response created for `status`
    pub fn response(&self, handler: HandlerId, status: u16) -> Option<&ResponseMetadata> {
        self.responses(handler).iter().find(|r| r.status == status)
    }

    pub fn params(&self, handler: HandlerId) -> &[ParameterMetadata] {
        self.entries
            .get(&handler)
            .map_or(&[], |e| e.params.as_slice())
    }

    pub fn queries(&self, handler: HandlerId) -> &[ParameterMetadata] {
        self.entries
            .get(&handler)
            .map_or(&[], |e| e.queries.as_slice())
    }

    pub fn security(&self, handler: HandlerId) -> &[SecurityMetadata] {
        self.entries
            .get(&handler)
            .map_or(&[], |e| e.security.as_slice())
    }

    pub fn tags(&self, handler: HandlerId) -> &[TagMetadata] {
        self.entries
            .get(&handler)
            .map_or(&[], |e| e.tags.as_slice())
    }

    /// Everything recorded for `handler`; missing kinds come back empty
    pub fn aggregate(&self, handler: HandlerId) -> HandlerMetadata {
        self.entries.get(&handler).cloned().unwrap_or_default()
    }

    pub fn has_any_metadata(&self, handler: HandlerId) -> bool {
        self.entries
            .get(&handler)
            .is_some_and(|e| *e != HandlerMetadata::default())
    }

    /// Drop every kind of metadata recorded for one handler
    pub fn clear(&mut self, handler: HandlerId) {
        debug!("Clearing metadata for {}", handler);
        self.entries.remove(&handler);
    }

    /// Drop all metadata for all handlers; counters are left alone
    pub fn clear_all(&mut self) {
        self.entries.clear();
    }
}
