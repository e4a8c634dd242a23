pub mod destroy;
pub mod plan;
