pub mod analyse;
pub mod animate;
pub mod inspect;
pub mod setup;
