//! Path and query parameter DTOs shared by several handlers.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::PageRequest;

/// `?page=&limit=` pagination parameters.
#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// One-based page number (default 1).
    pub page: Option<u32>,
    /// Items per page (default 20, max 100).
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn request(self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Single `{id}` path segment, parsed by the handler.
#[derive(Debug, Deserialize)]
pub struct IdPath {
    pub id: String,
}
