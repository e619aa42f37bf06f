//! chiptile-export: Pure format serializers for summary output (sans-IO).

pub mod csv;

pub use csv::to_csv;
