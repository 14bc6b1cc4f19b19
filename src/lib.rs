pub mod api; // HTTP surface: router, endpoints, middleware
pub mod config;
pub mod identity; // Identity gateway seam (session + user directory)
pub mod ids;
pub mod models;
pub mod notify; // Notification fan-out: appointment events -> messages/consultations
pub mod profiles; // Patient profile service
pub mod scheduling; // Appointment service: booking, conflicts, status transitions
pub mod store; // Record store over named JSON collections
