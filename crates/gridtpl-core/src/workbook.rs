//! Workbook type - an ordered collection of worksheets

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;

/// A workbook (grid document)
#[derive(Debug, Clone)]
pub struct Workbook {
    /// Worksheets in the workbook
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create a new workbook with one worksheet named "Sheet1"
    pub fn new() -> Self {
        Self {
            worksheets: vec![Worksheet::new("Sheet1")],
        }
    }

    /// Create an empty workbook with no worksheets
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
        }
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Get a worksheet by name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Iterate over all worksheets
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Add a new empty worksheet with the given name
    pub fn add_worksheet<S: Into<String>>(&mut self, name: S) -> Result<&mut Worksheet> {
        self.add_existing_worksheet(Worksheet::new(name))
    }

    /// Add an existing worksheet
    pub fn add_existing_worksheet(&mut self, sheet: Worksheet) -> Result<&mut Worksheet> {
        if self.worksheet_by_name(sheet.name()).is_some() {
            return Err(Error::DuplicateSheetName(sheet.name().to_string()));
        }
        self.worksheets.push(sheet);
        Ok(self
            .worksheets
            .last_mut()
            .expect("worksheet was just pushed"))
    }

    /// Replace the worksheet at `index`
    pub fn replace_worksheet(&mut self, index: usize, sheet: Worksheet) -> Result<Worksheet> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        Ok(std::mem::replace(&mut self.worksheets[index], sheet))
    }

    /// Remove the worksheet at `index`
    pub fn remove_worksheet(&mut self, index: usize) -> Result<Worksheet> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        Ok(self.worksheets.remove(index))
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
