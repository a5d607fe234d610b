pub mod api;
pub mod model;
pub mod normalize;
pub mod store;
pub mod ui;
