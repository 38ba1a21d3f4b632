mod chemical;
pub use chemical::*;

mod collate;
pub use collate::*;

mod gda;
pub use gda::*;

mod in_memory;
pub use in_memory::*;

mod loader;
pub use loader::*;

mod split;
pub use split::*;

mod traits;
pub use traits::*;
