// Domain layer: core models and ports (interfaces) towards the two platforms.

pub mod model;
pub mod ports;
