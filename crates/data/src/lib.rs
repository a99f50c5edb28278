pub mod csv_loader;

pub use csv_loader::{
    load_bars_from_csv, load_bars_from_reader, load_reference_from_reader, load_reference_series,
    ReferenceRow,
};
