pub mod geomath;
pub mod mission;
pub mod models;
pub mod route;
pub mod waypoints;
