mod handler;
mod model;

pub use handler::{buy_course, course_details, create_course, delete_course, list_courses, update_course};
pub use model::{CourseDetails, CourseForm, course_schema};
