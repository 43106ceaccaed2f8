// src/sinks.rs
pub mod http;
pub mod redis_store;

use crate::error::SinkError;
use crate::pipeline::payload::{CompanyPayload, UserPayload};

pub use http::HttpSinks;
pub use redis_store::RedisStore;

/// The three downstream targets of the import. Every call blocks until the
/// target has answered.
pub trait Dispatcher {
    /// `SET key client_id` in the key-value store
    fn set_system(&mut self, key: &str, client_id: &str) -> Result<(), SinkError>;

    /// Create or update a company; returns the HTTP status on success
    fn post_company(&mut self, payload: &CompanyPayload) -> Result<u16, SinkError>;

    /// Create or update a customer user; returns the HTTP status on success
    fn post_user(&mut self, payload: &UserPayload) -> Result<u16, SinkError>;
}

impl<D: Dispatcher + ?Sized> Dispatcher for &mut D {
    fn set_system(&mut self, key: &str, client_id: &str) -> Result<(), SinkError> {
        (**self).set_system(key, client_id)
    }

    fn post_company(&mut self, payload: &CompanyPayload) -> Result<u16, SinkError> {
        (**self).post_company(payload)
    }

    fn post_user(&mut self, payload: &UserPayload) -> Result<u16, SinkError> {
        (**self).post_user(payload)
    }
}

/// Production dispatcher: Redis for system keys, HTTP for companies and users
pub struct LiveDispatcher {
    pub store: RedisStore,
    pub http: HttpSinks,
}

impl LiveDispatcher {
    pub fn new(store: RedisStore, http: HttpSinks) -> Self {
        LiveDispatcher { store, http }
    }
}

impl Dispatcher for LiveDispatcher {
    fn set_system(&mut self, key: &str, client_id: &str) -> Result<(), SinkError> {
        self.store.set(key, client_id)
    }

    fn post_company(&mut self, payload: &CompanyPayload) -> Result<u16, SinkError> {
        self.http.post_company(payload)
    }

    fn post_user(&mut self, payload: &UserPayload) -> Result<u16, SinkError> {
        self.http.post_user(payload)
    }
}
