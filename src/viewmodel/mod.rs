//! Presentation state shared by every front end: the gallery grid pipeline and
//! the viewer slideshow.

pub mod gallery;
pub mod slideshow;

pub use gallery::GalleryViewModel;
pub use slideshow::Slideshow;
