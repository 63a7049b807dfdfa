use serde::Serialize;

/// What a single import operation produced. "Nothing extracted" and
/// "extracted but everything filtered out" are deliberately distinct so
/// the caller can word them differently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImportOutcome {
    Imported { added: usize, extracted: usize },
    NothingExtracted,
    AllFiltered { extracted: usize },
}

impl ImportOutcome {
    pub fn message(&self) -> String {
        match self {
            ImportOutcome::Imported { added, extracted } => {
                format!("Imported {added} of {extracted} extracted records")
            }
            ImportOutcome::NothingExtracted => {
                "No records could be extracted".to_string()
            }
            ImportOutcome::AllFiltered { extracted } => format!(
                "Extracted {extracted} records, but all fell outside the \
                 selected month or were payments/credits"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    TransactionsCsv,
    TransactionsJson,
    PaychecksJson,
}

/// One already-read file submitted to a batch import. Reading bytes and
/// deciding the kind belong to the upload layer; the name is kept for
/// reporting and for the OCR directory convention.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub kind: SourceKind,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub message: String,
}

/// Result of a multi-file import: per-file outcomes for the files that
/// went through, named failures for the ones that did not.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub succeeded: Vec<(String, ImportOutcome)>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn total_added(&self) -> usize {
        self.succeeded
            .iter()
            .map(|(_, outcome)| match outcome {
                ImportOutcome::Imported { added, .. } => *added,
                _ => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_messages_are_distinct() {
        let nothing = ImportOutcome::NothingExtracted.message();
        let filtered = ImportOutcome::AllFiltered { extracted: 3 }.message();
        assert_ne!(nothing, filtered);
        assert!(filtered.contains('3'));
    }

    #[test]
    fn total_added_counts_only_imported() {
        let report = BatchReport {
            succeeded: vec![
                ("a.csv".to_string(), ImportOutcome::Imported { added: 2, extracted: 3 }),
                ("b.json".to_string(), ImportOutcome::AllFiltered { extracted: 1 }),
            ],
            failures: vec![],
        };
        assert_eq!(report.total_added(), 2);
    }
}
