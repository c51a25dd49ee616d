use crate::domain::advisor::NewAdvisor;
use crate::error::{BuddyError, Result};
use std::io::Read;

/// Reads advisor rows (`name, email, phone, scheduling_link, active`) from a
/// CSV source.
///
/// Whitespace is trimmed and trailing columns may be omitted; a missing
/// `active` column means the advisor starts active.
pub struct AdvisorReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AdvisorReader<R> {
    /// Creates a new `AdvisorReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes rows. A malformed row yields an error without
    /// stopping the stream.
    pub fn advisors(self) -> impl Iterator<Item = Result<NewAdvisor>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BuddyError::from))
    }
}
