pub mod axum_http;
pub mod document_store;
