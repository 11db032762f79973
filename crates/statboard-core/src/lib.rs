// Core view-model types, the HTML rendering boundary, and the host page
// capability shared by the controller and its tests.

pub mod error;
pub mod page;
pub mod payload;
pub mod render;
