pub mod gradient_descent;
pub mod schedule;

pub use gradient_descent::GradientDescent;
