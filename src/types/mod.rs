pub mod bar;
pub mod market;
pub mod news;
pub mod signals;

pub use bar::*;
pub use market::*;
pub use news::*;
pub use signals::*;
