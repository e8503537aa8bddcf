// Domain layer: result models and the ports the scraping core talks through.

pub mod model;
pub mod ports;
