pub mod descriptor;
pub mod store;

pub use descriptor::WindowDescriptor;
pub use store::WindowRegistry;
