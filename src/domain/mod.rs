// Domain layer: forecast data model and the ports the store and UI talk through.

pub mod model;
pub mod ports;
