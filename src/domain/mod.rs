// Domain layer: plain models and the process-runner port.

pub mod model;
pub mod ports;
