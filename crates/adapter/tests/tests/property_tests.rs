#[path = "property/deterministic_ordering.rs"]
mod deterministic_ordering;

#[path = "property/translator_resolution.rs"]
mod translator_resolution;
