use std::path::Path;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use lingodocs_shared::{
    api::{DashboardMetrics, DocumentFields, DocumentListParams, FieldErrors, Page},
    Document, DocumentStatus,
};

use crate::api::{ApiClient, ApiError};

/// Languages offered by the form selectors. The server only requires the
/// fields to be non-empty; the enumeration lives in the UI.
pub const LANGUAGES: [&str; 3] = ["English", "Spanish", "French"];

pub const PER_PAGE_OPTIONS: [u32; 3] = [5, 10, 25];

pub fn next_per_page(current: u32) -> u32 {
    let idx = PER_PAGE_OPTIONS.iter().position(|&p| p == current);
    match idx {
        Some(idx) => PER_PAGE_OPTIONS[(idx + 1) % PER_PAGE_OPTIONS.len()],
        None => PER_PAGE_OPTIONS[0],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Search,
    Form,
    ConfirmDelete,
}

/// Sort targets, mirroring the server's order-by allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    CreatedAt,
    UpdatedAt,
    Status,
}

impl SortColumn {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::CreatedAt => "created_at",
            SortColumn::UpdatedAt => "updated_at",
            SortColumn::Status => "status",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::CreatedAt => "created",
            SortColumn::UpdatedAt => "updated",
            SortColumn::Status => "status",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortColumn::Id => SortColumn::CreatedAt,
            SortColumn::CreatedAt => SortColumn::UpdatedAt,
            SortColumn::UpdatedAt => SortColumn::Status,
            SortColumn::Status => SortColumn::Id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "^",
            SortDirection::Desc => "v",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    File,
    CurrentLanguage,
    ProcessLanguage,
    Status,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Name => FormField::File,
            FormField::File => FormField::CurrentLanguage,
            FormField::CurrentLanguage => FormField::ProcessLanguage,
            FormField::ProcessLanguage => FormField::Status,
            FormField::Status => FormField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Name => FormField::Status,
            FormField::File => FormField::Name,
            FormField::CurrentLanguage => FormField::File,
            FormField::ProcessLanguage => FormField::CurrentLanguage,
            FormField::Status => FormField::ProcessLanguage,
        }
    }
}

/// Create/edit dialog state. A file path is typed rather than picked; on
/// edit it starts empty, meaning "keep the stored file".
pub struct FormState {
    pub editing_id: Option<i64>,
    pub name: String,
    pub file_path: String,
    pub current_language_idx: usize,
    pub process_language_idx: usize,
    pub status_idx: usize,
    pub field: FormField,
    pub errors: FieldErrors,
}

fn language_idx(language: &str) -> usize {
    LANGUAGES.iter().position(|&l| l == language).unwrap_or(0)
}

impl FormState {
    pub fn new_document() -> Self {
        Self {
            editing_id: None,
            name: String::new(),
            file_path: String::new(),
            current_language_idx: 0,
            process_language_idx: 0,
            status_idx: 0,
            field: FormField::Name,
            errors: FieldErrors::new(),
        }
    }

    pub fn edit(document: &Document) -> Self {
        Self {
            editing_id: Some(document.id),
            name: document.name.clone(),
            file_path: String::new(),
            current_language_idx: language_idx(&document.current_language),
            process_language_idx: language_idx(&document.process_language),
            status_idx: DocumentStatus::ALL
                .iter()
                .position(|&s| s == document.status)
                .unwrap_or(0),
            field: FormField::Name,
            errors: FieldErrors::new(),
        }
    }

    pub fn fields(&self) -> DocumentFields {
        DocumentFields {
            name: self.name.clone(),
            current_language: LANGUAGES[self.current_language_idx].to_string(),
            process_language: LANGUAGES[self.process_language_idx].to_string(),
            status: DocumentStatus::ALL[self.status_idx],
        }
    }

    /// Same rules the server applies, checked before the round-trip.
    pub fn validate_local(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors
                .entry("name".to_string())
                .or_default()
                .push("The name field is required.".to_string());
        }
        if self.editing_id.is_none() && self.file_path.trim().is_empty() {
            errors
                .entry("document".to_string())
                .or_default()
                .push("The document field is required.".to_string());
        }
        errors
    }

    fn cycle_selector(&mut self, step: isize) {
        match self.field {
            FormField::CurrentLanguage => {
                self.current_language_idx = cycle(self.current_language_idx, LANGUAGES.len(), step)
            }
            FormField::ProcessLanguage => {
                self.process_language_idx = cycle(self.process_language_idx, LANGUAGES.len(), step)
            }
            FormField::Status => {
                self.status_idx = cycle(self.status_idx, DocumentStatus::ALL.len(), step)
            }
            FormField::Name | FormField::File => {}
        }
    }
}

fn cycle(idx: usize, len: usize, step: isize) -> usize {
    (idx as isize + step).rem_euclid(len as isize) as usize
}

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Init,
}

pub struct App {
    pub api: ApiClient,
    pub mode: Mode,

    // Loading state
    pub loading: bool,
    pub loading_message: String,
    pub error_message: Option<String>,

    // Header metrics
    pub metrics: Option<DashboardMetrics>,

    // Table state
    pub page_data: Option<Page<Document>>,
    pub selected_row: usize,
    pub page: u32,
    pub per_page: u32,
    pub sort_column: SortColumn,
    pub sort_direction: SortDirection,

    // Search
    pub search: String,
    pub search_input: String,

    // Popups
    pub form: Option<FormState>,
    pub delete_target: Option<Document>,
}

impl App {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            mode: Mode::Normal,
            loading: false,
            loading_message: String::new(),
            error_message: None,
            metrics: None,
            page_data: None,
            selected_row: 0,
            page: 1,
            per_page: 10,
            sort_column: SortColumn::Id,
            sort_direction: SortDirection::Desc,
            search: String::new(),
            search_input: String::new(),
            form: None,
            delete_target: None,
        }
    }

    pub fn set_loading(&mut self, loading: bool, message: &str) {
        self.loading = loading;
        self.loading_message = message.to_string();
    }

    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    pub fn selected_document(&self) -> Option<&Document> {
        self.page_data.as_ref()?.data.get(self.selected_row)
    }

    pub fn last_page(&self) -> u32 {
        self.page_data.as_ref().map(|p| p.last_page).unwrap_or(1)
    }

    fn list_params(&self) -> DocumentListParams {
        DocumentListParams {
            page: Some(self.page),
            per_page: Some(self.per_page),
            order_by: Some(self.sort_column.as_param().to_string()),
            order_direction: Some(self.sort_direction.as_param().to_string()),
            search: if self.search.is_empty() {
                None
            } else {
                Some(self.search.clone())
            },
        }
    }

    /// Initial load: metrics are cosmetic, the document list is the point.
    pub async fn initialize(&mut self) {
        if let Ok(metrics) = self.api.dashboard_metrics().await {
            self.metrics = Some(metrics);
        }
        self.load_documents().await;
    }

    pub async fn load_documents(&mut self) {
        self.set_loading(true, "Loading documents...");

        match self.api.list_documents(&self.list_params()).await {
            Ok(page) => {
                self.selected_row = self
                    .selected_row
                    .min(page.data.len().saturating_sub(1));
                self.page_data = Some(page);
            }
            Err(e) => self.handle_api_error("Failed to load documents", e),
        }

        self.set_loading(false, "");
    }

    /// Handle key events, returns true if app should quit
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        // Clear error on any key press
        if self.error_message.is_some() && key.code != KeyCode::Esc {
            self.clear_error();
        }

        // Global quit with Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(true);
        }

        if self.loading {
            return Ok(false);
        }

        match self.mode {
            Mode::Normal => self.handle_normal_key(key).await,
            Mode::Search => self.handle_search_key(key).await,
            Mode::Form => self.handle_form_key(key).await,
            Mode::ConfirmDelete => self.handle_confirm_key(key).await,
        }
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('r') => self.load_documents().await,
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('h') | KeyCode::Left => self.prev_page().await,
            KeyCode::Char('l') | KeyCode::Right => self.next_page().await,
            KeyCode::Char('o') => {
                self.sort_column = self.sort_column.next();
                self.selected_row = 0;
                self.load_documents().await;
            }
            KeyCode::Char('O') => {
                self.sort_direction = self.sort_direction.toggle();
                self.selected_row = 0;
                self.load_documents().await;
            }
            KeyCode::Char('p') => {
                self.per_page = next_per_page(self.per_page);
                self.page = 1;
                self.selected_row = 0;
                self.load_documents().await;
            }
            KeyCode::Char('/') => {
                self.search_input = self.search.clone();
                self.mode = Mode::Search;
            }
            KeyCode::Char('n') => {
                self.form = Some(FormState::new_document());
                self.mode = Mode::Form;
            }
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit_form().await,
            KeyCode::Char('d') => {
                if let Some(doc) = self.selected_document().cloned() {
                    self.delete_target = Some(doc);
                    self.mode = Mode::ConfirmDelete;
                }
            }
            _ => {}
        }

        Ok(false)
    }

    async fn handle_search_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Esc => {
                self.search_input.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                self.search = self.search_input.clone();
                // New filter, new first page
                self.page = 1;
                self.selected_row = 0;
                self.mode = Mode::Normal;
                self.load_documents().await;
            }
            KeyCode::Char(c) => self.search_input.push(c),
            KeyCode::Backspace => {
                self.search_input.pop();
            }
            _ => {}
        }

        Ok(false)
    }

    async fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let Some(form) = self.form.as_mut() else {
            self.mode = Mode::Normal;
            return Ok(false);
        };

        match key.code {
            KeyCode::Esc => {
                self.form = None;
                self.mode = Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.field = form.field.next(),
            KeyCode::BackTab | KeyCode::Up => form.field = form.field.prev(),
            KeyCode::Left => form.cycle_selector(-1),
            KeyCode::Right => form.cycle_selector(1),
            KeyCode::Enter => self.submit_form().await,
            KeyCode::Char(c) => match form.field {
                FormField::Name => form.name.push(c),
                FormField::File => form.file_path.push(c),
                _ => {}
            },
            KeyCode::Backspace => match form.field {
                FormField::Name => {
                    form.name.pop();
                }
                FormField::File => {
                    form.file_path.pop();
                }
                _ => {}
            },
            _ => {}
        }

        Ok(false)
    }

    async fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => self.confirm_delete().await,
            KeyCode::Char('n') | KeyCode::Esc => {
                self.delete_target = None;
                self.mode = Mode::Normal;
            }
            _ => {}
        }

        Ok(false)
    }

    async fn open_edit_form(&mut self) {
        let Some(id) = self.selected_document().map(|d| d.id) else {
            return;
        };

        self.set_loading(true, "Loading document...");

        // Fetch by id so the form reflects the stored record, not the row
        // the table happens to be showing.
        match self.api.get_document(id).await {
            Ok(document) => {
                self.form = Some(FormState::edit(&document));
                self.mode = Mode::Form;
            }
            Err(e) => self.handle_api_error("Failed to load document", e),
        }

        self.set_loading(false, "");
    }

    async fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };

        let local_errors = form.validate_local();
        if !local_errors.is_empty() {
            form.errors = local_errors;
            return;
        }

        let fields = form.fields();
        let editing_id = form.editing_id;
        let file_path = form.file_path.trim().to_string();

        self.set_loading(true, "Saving document...");

        let result = match editing_id {
            Some(id) => {
                let path = if file_path.is_empty() {
                    None
                } else {
                    Some(Path::new(&file_path).to_path_buf())
                };
                self.api
                    .update_document(id, &fields, path.as_deref())
                    .await
            }
            None => {
                self.api
                    .create_document(&fields, Path::new(&file_path))
                    .await
            }
        };

        self.set_loading(false, "");

        match result {
            Ok(_) => {
                self.form = None;
                self.mode = Mode::Normal;
                self.load_documents().await;
            }
            Err(ApiError::Validation(errors)) => {
                if let Some(form) = self.form.as_mut() {
                    form.errors = errors;
                }
            }
            Err(e) => self.handle_api_error("Failed to save document", e),
        }
    }

    async fn confirm_delete(&mut self) {
        let Some(target) = self.delete_target.take() else {
            self.mode = Mode::Normal;
            return;
        };

        self.mode = Mode::Normal;
        self.set_loading(true, "Deleting document...");

        match self.api.delete_document(target.id).await {
            Ok(()) => {
                self.set_loading(false, "");
                self.load_documents().await;
            }
            Err(e) => {
                self.set_loading(false, "");
                self.handle_api_error("Failed to delete document", e);
            }
        }
    }

    fn move_down(&mut self) {
        let row_count = self
            .page_data
            .as_ref()
            .map(|p| p.data.len())
            .unwrap_or(0);
        if self.selected_row + 1 < row_count {
            self.selected_row += 1;
        }
    }

    fn move_up(&mut self) {
        if self.selected_row > 0 {
            self.selected_row -= 1;
        }
    }

    async fn next_page(&mut self) {
        if self.page < self.last_page() {
            self.page += 1;
            self.selected_row = 0;
            self.load_documents().await;
        }
    }

    async fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
            self.selected_row = 0;
            self.load_documents().await;
        }
    }

    fn handle_api_error(&mut self, context: &str, err: ApiError) {
        match err {
            ApiError::Unauthorized => {
                // Same contract as a browser client: drop the session and
                // force a fresh login with whatever fronts the API.
                let _ = self.api.clear_session();
                self.set_error(
                    "Session expired. Stored credentials were cleared; log in again.".to_string(),
                );
            }
            ApiError::Validation(errors) => {
                let detail: Vec<String> = errors.into_values().flatten().collect();
                self.set_error(format!("{}: {}", context, detail.join(" ")));
            }
            other => self.set_error(format!("{}: {}", context, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample_document() -> Document {
        Document {
            id: 7,
            name: "Contract".to_string(),
            document: "uploads/abc.pdf".to_string(),
            current_language: "French".to_string(),
            process_language: "Spanish".to_string(),
            status: DocumentStatus::Completed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn sort_column_cycles_through_allow_list() {
        let mut column = SortColumn::Id;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(column.as_param());
            column = column.next();
        }
        assert_eq!(seen, vec!["id", "created_at", "updated_at", "status"]);
        assert_eq!(column, SortColumn::Id);
    }

    #[test]
    fn sort_direction_toggles() {
        assert_eq!(SortDirection::Desc.toggle(), SortDirection::Asc);
        assert_eq!(SortDirection::Asc.toggle(), SortDirection::Desc);
    }

    #[test]
    fn per_page_cycles_through_options() {
        assert_eq!(next_per_page(5), 10);
        assert_eq!(next_per_page(10), 25);
        assert_eq!(next_per_page(25), 5);
        assert_eq!(next_per_page(999), 5);
    }

    #[test]
    fn edit_form_mirrors_the_document() {
        let form = FormState::edit(&sample_document());
        assert_eq!(form.editing_id, Some(7));
        assert_eq!(form.name, "Contract");
        assert_eq!(LANGUAGES[form.current_language_idx], "French");
        assert_eq!(LANGUAGES[form.process_language_idx], "Spanish");
        assert_eq!(
            DocumentStatus::ALL[form.status_idx],
            DocumentStatus::Completed
        );
        // File input starts empty: keep the stored file unless replaced.
        assert!(form.file_path.is_empty());
    }

    #[test]
    fn unknown_language_falls_back_to_first_option() {
        let mut doc = sample_document();
        doc.current_language = "Klingon".to_string();
        let form = FormState::edit(&doc);
        assert_eq!(form.current_language_idx, 0);
    }

    #[test]
    fn create_form_requires_name_and_file() {
        let form = FormState::new_document();
        let errors = form.validate_local();
        assert_eq!(errors["name"], vec!["The name field is required."]);
        assert_eq!(errors["document"], vec!["The document field is required."]);
    }

    #[test]
    fn edit_form_does_not_require_a_file() {
        let mut form = FormState::edit(&sample_document());
        assert!(form.validate_local().is_empty());

        form.name.clear();
        let errors = form.validate_local();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn selector_cycling_wraps_both_ways() {
        let mut form = FormState::new_document();
        form.field = FormField::Status;
        form.cycle_selector(-1);
        assert_eq!(
            DocumentStatus::ALL[form.status_idx],
            DocumentStatus::Rejected
        );
        form.cycle_selector(1);
        assert_eq!(
            DocumentStatus::ALL[form.status_idx],
            DocumentStatus::Pending
        );
    }
}
