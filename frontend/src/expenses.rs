//! Expense list helpers: the shared edit/delete modals and the date default
//! on the new-expense form.

pub const EDIT_BUTTON_SELECTOR: &str = ".edit-btn";
pub const DELETE_BUTTON_SELECTOR: &str = ".delete-btn";
pub const EDIT_FORM_ID: &str = "editExpenseForm";
pub const DELETE_FORM_ID: &str = "deleteExpenseForm";
pub const DATE_INPUT_SELECTOR: &str = "input[name=\"date\"]";

/// An expense as the list renders it into an edit button's attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseRecord {
    pub id: String,
    pub amount: String,
    pub category: String,
    pub date: String,
    pub description: String,
}

impl ExpenseRecord {
    /// Reads `data-id`, `data-amount`, `data-category`, `data-date` and
    /// `data-description`. Only the id is required.
    pub fn from_attributes<F>(attr: F) -> Option<ExpenseRecord>
    where
        F: Fn(&str) -> Option<String>,
    {
        let field = |name: &str| attr(name).unwrap_or_default();
        Some(ExpenseRecord {
            id: expense_id(attr("data-id"))?,
            amount: field("data-amount"),
            category: field("data-category"),
            date: field("data-date"),
            description: field("data-description"),
        })
    }

    /// `(input id, value)` pairs for the edit modal.
    pub fn edit_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("edit_amount", self.amount.as_str()),
            ("edit_category", self.category.as_str()),
            ("edit_date", self.date.as_str()),
            ("edit_description", self.description.as_str()),
        ]
    }

    pub fn edit_action(&self) -> String {
        edit_action(&self.id)
    }
}

/// Expense ids are integers on the server; anything else is rejected.
pub fn expense_id(raw: Option<String>) -> Option<String> {
    let id = raw?.trim().to_string();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(id)
}

pub fn edit_action(id: &str) -> String {
    format!("/edit_expense/{id}")
}

pub fn delete_action(id: &str) -> String {
    format!("/delete_expense/{id}")
}

/// `YYYY-MM-DD`, the value format of `<input type="date">`. `month` is
/// 1-based.
pub fn iso_date(year: u32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}
