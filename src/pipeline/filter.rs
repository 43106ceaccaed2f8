// src/pipeline/filter.rs
use crate::document::Record;
use crate::ledger::ResumeSet;

/// Keep the records a run should process, in document order.
pub fn select_records<'a, I>(clients: I, resume: Option<&ResumeSet>) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    clients
        .into_iter()
        .filter(|record| match resume {
            Some(set) => set.contains(&record.sequence_id),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CLIENTS_KIND;

    fn records(ids: &[&str]) -> Vec<Record> {
        ids.iter().map(|id| Record::new(CLIENTS_KIND, *id)).collect()
    }

    #[test]
    fn test_full_mode_keeps_everything() {
        let all = records(&["1", "2", "3"]);
        let selected = select_records(&all, None);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_resume_keeps_document_order() {
        let all = records(&["1", "2", "3", "4"]);
        let resume = ResumeSet::parse("4\n2\n99\n");

        let selected: Vec<&str> = select_records(&all, Some(&resume))
            .iter()
            .map(|r| r.sequence_id.as_str())
            .collect();
        assert_eq!(selected, vec!["2", "4"]);
    }
}
