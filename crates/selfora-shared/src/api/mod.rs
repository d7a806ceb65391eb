mod pages;

pub use pages::*;
