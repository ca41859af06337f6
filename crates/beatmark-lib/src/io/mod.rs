pub mod dose;
pub mod features;
pub mod text;
pub mod traces;
