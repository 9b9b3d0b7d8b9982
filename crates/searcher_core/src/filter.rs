use std::collections::BTreeSet;

use crate::document::DocType;

/// Type filter applied to the ranked list. An empty selection is `All`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(BTreeSet<DocType>),
}

impl TypeFilter {
    pub fn only<I: IntoIterator<Item = DocType>>(types: I) -> Self {
        let set: BTreeSet<DocType> = types.into_iter().collect();
        if set.is_empty() {
            TypeFilter::All
        } else {
            TypeFilter::Only(set)
        }
    }

    pub fn admits(&self, doc_type: DocType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(set) => set.contains(&doc_type),
        }
    }
}

/// One checkbox of the type picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeChoice {
    All,
    Type(DocType),
}

/// Checkbox state of the type picker, including the "all" pseudo-type.
///
/// Invariant: whenever `all` is checked every concrete type is checked too.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeSelection {
    all: bool,
    checked: BTreeSet<DocType>,
}

impl TypeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_all_checked(&self) -> bool {
        self.all
    }

    pub fn is_checked(&self, doc_type: DocType) -> bool {
        self.checked.contains(&doc_type)
    }

    pub fn checked(&self) -> &BTreeSet<DocType> {
        &self.checked
    }

    pub fn toggle(&mut self, choice: TypeChoice) {
        match choice {
            TypeChoice::All => {
                if self.all {
                    self.all = false;
                } else {
                    self.all = true;
                    self.checked = DocType::all();
                }
            }
            TypeChoice::Type(doc_type) => {
                if !self.checked.remove(&doc_type) {
                    self.checked.insert(doc_type);
                }
                self.all = false;
            }
        }

        if self.checked.len() == DocType::ALL.len() {
            self.all = true;
        }
        if self.checked.is_empty() {
            self.all = false;
        }
    }

    pub fn effective(&self) -> TypeFilter {
        if self.all {
            TypeFilter::All
        } else {
            TypeFilter::only(self.checked.iter().copied())
        }
    }
}
