mod dates;
mod fields;
mod run;
mod segment;
#[cfg(test)]
mod tests;
mod text_layer;

pub use dates::to_iso_date;
pub use run::run;
