// Domain layer - Timeline types and the rules that build them

pub mod model;
pub mod timeline;
