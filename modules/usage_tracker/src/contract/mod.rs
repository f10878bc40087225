pub mod model;

pub use model::{ActivityEvent, NewActivity, NewRegistration, Registration, Stats, User};
