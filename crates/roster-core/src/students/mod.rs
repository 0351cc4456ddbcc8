//! Student records: model, persistence seam and service.

pub mod model;
pub mod repository;
pub mod service;
