pub mod csv_io;
pub mod mask;
pub mod ser;
