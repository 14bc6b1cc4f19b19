pub mod appointment;
pub mod consultation;
pub mod enums;
pub mod message;
pub mod profile;

pub use appointment::Appointment;
pub use consultation::Consultation;
pub use enums::*;
pub use message::Message;
pub use profile::PatientProfile;
