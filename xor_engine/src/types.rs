mod boolean;
mod literal;

pub use boolean::Boolean;
pub use literal::Literal;
