mod entities;

pub use entities::{Comment, DesignCourse, Post, Studio, User};
