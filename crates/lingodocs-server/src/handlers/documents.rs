use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Response,
};
use chrono::{DateTime, Utc};
use lingodocs_shared::{
    api::{DocumentListParams, FieldErrors, Page},
    Document, DocumentStatus,
};

use super::{reply, reply_empty};
use crate::error::AppError;
use crate::routes::AppState;

type DocumentRow = (
    i64,                   // id
    String,                // name
    String,                // document
    String,                // current_language
    String,                // process_language
    DocumentStatus,        // status
    DateTime<Utc>,         // created_at
    DateTime<Utc>,         // updated_at
    Option<DateTime<Utc>>, // deleted_at
);

const DOCUMENT_COLUMNS: &str =
    "id, name, document, current_language, process_language, status, created_at, updated_at, deleted_at";

fn row_to_document(row: DocumentRow) -> Document {
    Document {
        id: row.0,
        name: row.1,
        document: row.2,
        current_language: row.3,
        process_language: row.4,
        status: row.5,
        created_at: row.6,
        updated_at: row.7,
        deleted_at: row.8,
    }
}

/// Sort columns the listing accepts; anything else falls back to `id`.
fn sanitize_order_by(requested: Option<&str>) -> &'static str {
    match requested {
        Some("id") => "id",
        Some("created_at") => "created_at",
        Some("updated_at") => "updated_at",
        Some("status") => "status",
        _ => "id",
    }
}

/// Case-insensitive asc/desc; anything else falls back to `DESC`.
fn sanitize_direction(requested: Option<&str>) -> &'static str {
    match requested.map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("asc") => "ASC",
        Some("desc") => "DESC",
        _ => "DESC",
    }
}

/// GET /documents
pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<DocumentListParams>,
) -> Result<Response, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(10).max(1);
    // Widen before multiplying: both values come straight off the query
    // string and u32 arithmetic can overflow.
    let offset = (i64::from(page) - 1) * i64::from(per_page);

    let order_by = sanitize_order_by(params.order_by.as_deref());
    let direction = sanitize_direction(params.order_direction.as_deref());

    let search = params
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s));

    // Build dynamic query
    let mut conditions = vec!["deleted_at IS NULL".to_string()];
    let mut param_idx = 1;

    if search.is_some() {
        conditions.push(format!("name LIKE ${}", param_idx));
        param_idx += 1;
    }

    let where_clause = conditions.join(" AND ");

    // Count total
    let count_query = format!("SELECT COUNT(*) FROM documents WHERE {}", where_clause);
    let mut count_builder = sqlx::query_as::<_, (i64,)>(&count_query);
    if let Some(ref pattern) = search {
        count_builder = count_builder.bind(pattern);
    }
    let (total,): (i64,) = count_builder.fetch_one(&state.db).await?;

    // Fetch the page slice. There is no secondary sort key: rows with equal
    // values in the requested column come back in unspecified order.
    let select_query = format!(
        "SELECT {} FROM documents WHERE {} ORDER BY {} {} LIMIT ${} OFFSET ${}",
        DOCUMENT_COLUMNS,
        where_clause,
        order_by,
        direction,
        param_idx,
        param_idx + 1
    );

    let mut select_builder = sqlx::query_as::<_, DocumentRow>(&select_query);
    if let Some(ref pattern) = search {
        select_builder = select_builder.bind(pattern);
    }
    select_builder = select_builder.bind(i64::from(per_page)).bind(offset);

    let rows = select_builder.fetch_all(&state.db).await?;
    let documents: Vec<Document> = rows.into_iter().map(row_to_document).collect();

    let data = Page::new(documents, page, per_page, total);

    Ok(reply(
        StatusCode::OK,
        "Documents retrieved successfully",
        data,
    ))
}

/// POST /documents (multipart form)
pub async fn create_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_form(multipart).await?;
    let validated = validate(form, true).map_err(AppError::Validation)?;

    let file = match validated.file {
        Some(file) => file,
        // validate() guarantees the file when it is required; keep a hard
        // error rather than a panic if that invariant ever breaks.
        None => return Err(AppError::Internal(anyhow::anyhow!("validated form lost its file"))),
    };

    let stored_path = state.storage.store(&file.file_name, file.bytes).await?;
    let now = Utc::now();

    let insert_query = format!(
        "INSERT INTO documents (name, document, current_language, process_language, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {}",
        DOCUMENT_COLUMNS
    );

    let row: DocumentRow = sqlx::query_as(&insert_query)
        .bind(&validated.name)
        .bind(&stored_path)
        .bind(&validated.current_language)
        .bind(&validated.process_language)
        .bind(validated.status)
        .bind(now)
        .fetch_one(&state.db)
        .await?;

    Ok(reply(
        StatusCode::CREATED,
        "Document created successfully",
        row_to_document(row),
    ))
}

/// GET /documents/:id
pub async fn show_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let select_query = format!(
        "SELECT {} FROM documents WHERE id = $1 AND deleted_at IS NULL",
        DOCUMENT_COLUMNS
    );

    let row: DocumentRow = sqlx::query_as(&select_query)
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(reply(
        StatusCode::OK,
        "Document retrieved successfully",
        row_to_document(row),
    ))
}

/// PUT/PATCH/POST /documents/:id (multipart form; POST kept for clients
/// that cannot send multipart bodies with PUT)
pub async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    // Lookup happens before validation, same order the API always had.
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT document FROM documents WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&state.db)
            .await?;

    let Some((current_path,)) = existing else {
        return Err(AppError::NotFound);
    };

    let form = read_form(multipart).await?;
    let validated = validate(form, false).map_err(AppError::Validation)?;

    // A new upload replaces the stored reference; the old file stays on disk.
    let document_path = match validated.file {
        Some(file) => state.storage.store(&file.file_name, file.bytes).await?,
        None => current_path,
    };

    let now = Utc::now();

    let update_query = format!(
        "UPDATE documents \
         SET name = $1, document = $2, current_language = $3, process_language = $4, status = $5, updated_at = $6 \
         WHERE id = $7 RETURNING {}",
        DOCUMENT_COLUMNS
    );

    let row: DocumentRow = sqlx::query_as(&update_query)
        .bind(&validated.name)
        .bind(&document_path)
        .bind(&validated.current_language)
        .bind(&validated.process_language)
        .bind(validated.status)
        .bind(now)
        .bind(id)
        .fetch_one(&state.db)
        .await?;

    Ok(reply(
        StatusCode::OK,
        "Document updated successfully",
        row_to_document(row),
    ))
}

/// DELETE /documents/:id (soft delete)
pub async fn destroy_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let now = Utc::now();

    let result = sqlx::query(
        "UPDATE documents SET deleted_at = $1, updated_at = $1 WHERE id = $2 AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(reply_empty(StatusCode::OK, "Document deleted successfully"))
}

// ============ Multipart form parsing & validation ============

#[derive(Debug)]
struct UploadedFile {
    file_name: String,
    bytes: Bytes,
}

#[derive(Debug, Default)]
struct DocumentForm {
    name: Option<String>,
    current_language: Option<String>,
    process_language: Option<String>,
    status: Option<String>,
    file: Option<UploadedFile>,
}

async fn read_form(mut multipart: Multipart) -> Result<DocumentForm, AppError> {
    let mut form = DocumentForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = Some(field.text().await?.trim().to_string()),
            "current_language" => {
                form.current_language = Some(field.text().await?.trim().to_string())
            }
            "process_language" => {
                form.process_language = Some(field.text().await?.trim().to_string())
            }
            "status" => form.status = Some(field.text().await?.trim().to_string()),
            "document" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await?;
                // An empty part is how browsers submit an untouched file
                // input; treat it as "no file".
                if !bytes.is_empty() {
                    form.file = Some(UploadedFile { file_name, bytes });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

#[derive(Debug)]
struct ValidatedDocument {
    name: String,
    current_language: String,
    process_language: String,
    status: DocumentStatus,
    file: Option<UploadedFile>,
}

fn push_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// Checks every field and reports all failures together. `file_required`
/// distinguishes create (file mandatory) from update (keep existing file
/// when none is sent).
fn validate(form: DocumentForm, file_required: bool) -> Result<ValidatedDocument, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = form.name.unwrap_or_default();
    if name.is_empty() {
        push_error(&mut errors, "name", "The name field is required.");
    } else if name.chars().count() > 255 {
        push_error(
            &mut errors,
            "name",
            "The name field must not be greater than 255 characters.",
        );
    }

    let current_language = form.current_language.unwrap_or_default();
    if current_language.is_empty() {
        push_error(
            &mut errors,
            "current_language",
            "The current language field is required.",
        );
    }

    let process_language = form.process_language.unwrap_or_default();
    if process_language.is_empty() {
        push_error(
            &mut errors,
            "process_language",
            "The process language field is required.",
        );
    }

    // The placeholder never leaves this function: any parse problem adds an
    // error and the Err branch wins below.
    let status = match form.status.as_deref() {
        None | Some("") => {
            push_error(&mut errors, "status", "The status field is required.");
            DocumentStatus::Pending
        }
        Some(raw) => match raw.parse::<DocumentStatus>() {
            Ok(status) => status,
            Err(_) => {
                push_error(&mut errors, "status", "The selected status is invalid.");
                DocumentStatus::Pending
            }
        },
    };

    if file_required && form.file.is_none() {
        push_error(&mut errors, "document", "The document field is required.");
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedDocument {
        name,
        current_language,
        process_language,
        status,
        file: form.file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> DocumentForm {
        DocumentForm {
            name: Some("Doc1".to_string()),
            current_language: Some("English".to_string()),
            process_language: Some("Spanish".to_string()),
            status: Some("Pending".to_string()),
            file: Some(UploadedFile {
                file_name: "doc1.pdf".to_string(),
                bytes: Bytes::from_static(b"%PDF"),
            }),
        }
    }

    #[test]
    fn order_by_falls_back_to_id() {
        assert_eq!(sanitize_order_by(Some("created_at")), "created_at");
        assert_eq!(sanitize_order_by(Some("status")), "status");
        assert_eq!(sanitize_order_by(Some("name")), "id");
        assert_eq!(sanitize_order_by(Some("id; DROP TABLE documents")), "id");
        assert_eq!(sanitize_order_by(None), "id");
    }

    #[test]
    fn direction_falls_back_to_desc() {
        assert_eq!(sanitize_direction(Some("asc")), "ASC");
        assert_eq!(sanitize_direction(Some("ASC")), "ASC");
        assert_eq!(sanitize_direction(Some("desc")), "DESC");
        assert_eq!(sanitize_direction(Some("sideways")), "DESC");
        assert_eq!(sanitize_direction(None), "DESC");
    }

    #[test]
    fn valid_form_passes() {
        let validated = validate(filled_form(), true).unwrap();
        assert_eq!(validated.name, "Doc1");
        assert_eq!(validated.status, DocumentStatus::Pending);
        assert!(validated.file.is_some());
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = validate(DocumentForm::default(), true).unwrap_err();
        let fields: Vec<&str> = errors.keys().map(String::as_str).collect();
        assert_eq!(
            fields,
            vec![
                "current_language",
                "document",
                "name",
                "process_language",
                "status"
            ]
        );
        assert_eq!(errors["status"], vec!["The status field is required."]);
    }

    #[test]
    fn missing_status_is_a_field_error() {
        let mut form = filled_form();
        form.status = None;
        let errors = validate(form, true).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["status"], vec!["The status field is required."]);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut form = filled_form();
        form.status = Some("Archived".to_string());
        let errors = validate(form, true).unwrap_err();
        assert_eq!(errors["status"], vec!["The selected status is invalid."]);
    }

    #[test]
    fn overlong_name_is_rejected_at_256_chars() {
        let mut form = filled_form();
        form.name = Some("x".repeat(255));
        assert!(validate(form, true).is_ok());

        let mut form = filled_form();
        form.name = Some("x".repeat(256));
        let errors = validate(form, true).unwrap_err();
        assert_eq!(
            errors["name"],
            vec!["The name field must not be greater than 255 characters."]
        );
    }

    #[test]
    fn file_is_optional_on_update() {
        let mut form = filled_form();
        form.file = None;
        assert!(validate(form, false).is_ok());

        let mut form = filled_form();
        form.file = None;
        let errors = validate(form, true).unwrap_err();
        assert_eq!(errors["document"], vec!["The document field is required."]);
    }
}
