mod course;
mod principal;
mod purchase;

pub use course::{Course, CourseChanges, CourseImage, NewCourse};
pub use principal::{NewPrincipal, Principal, PrincipalKind};
pub use purchase::Purchase;
