use crate::domain::advisor::Advisor;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct AdvisorRow<'a> {
    id: String,
    name: &'a str,
    email: &'a str,
    phone: Option<&'a str>,
    scheduling_link: &'a str,
    active: bool,
}

/// Writes advisors as CSV with a header row.
pub struct AdvisorWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AdvisorWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_advisors<'a, I>(&mut self, advisors: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Advisor>,
    {
        for advisor in advisors {
            self.writer.serialize(AdvisorRow {
                id: advisor.id.to_string(),
                name: &advisor.name,
                email: &advisor.email,
                phone: advisor.phone.as_deref(),
                scheduling_link: &advisor.scheduling_link,
                active: advisor.active,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::advisor::NewAdvisor;

    #[test]
    fn test_writes_header_and_rows() {
        let advisor = Advisor::new(NewAdvisor {
            name: "Eve".to_string(),
            email: "eve@example.com".to_string(),
            phone: None,
            scheduling_link: "https://cal.example.com/eve".to_string(),
            active: true,
        })
        .unwrap();

        let mut out = Vec::new();
        AdvisorWriter::new(&mut out)
            .write_advisors([&advisor])
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,name,email,phone,scheduling_link,active")
        );
        assert_eq!(
            lines.next().map(String::from),
            Some(format!(
                "{},Eve,eve@example.com,,https://cal.example.com/eve,true",
                advisor.id
            ))
        );
    }
}
